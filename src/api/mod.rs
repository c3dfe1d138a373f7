//! API 模块
//!
//! 提供只读的配置查询 REST API。

#[cfg(test)]
mod api_tests;
pub mod app_state;
pub mod dto;
pub mod handlers;
pub mod routes;

use crate::api::app_state::AppState;
use crate::security::middleware::security_headers_middleware;
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn create_router(app_state: AppState) -> Router {
    let api = Router::new().merge(routes::settings_routes::create_settings_router());

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        // Add security headers middleware to all routes
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .with_state(app_state)
}
