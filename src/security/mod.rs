//! Security Module
//!
//! Session cookie policy and response security headers for the admin API.

pub mod cookie;
pub mod middleware;

pub use cookie::SessionCookiePolicy;
pub use middleware::security_headers_middleware;
