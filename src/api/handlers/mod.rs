//! Handlers 模块
//!
//! HTTP 请求处理程序。

pub mod settings_handler;

pub use settings_handler::*;
