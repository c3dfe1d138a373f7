//! Settings Routes
//!
//! 定义配置查询相关的 API 路由。

use crate::api::handlers::settings_handler::*;
use axum::{Router, routing::get};

use crate::api::app_state::AppState;

/// 创建配置路由器
pub fn create_settings_router() -> Router<AppState> {
    Router::new()
        .route("/settings", get(list_settings))
        .route("/settings/:name", get(get_setting))
        .route("/session/cookie", get(get_cookie_policy))
}
