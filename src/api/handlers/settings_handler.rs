use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::debug;

use crate::{
    api::{
        app_state::AppState,
        dto::settings_dto::{CookiePolicyResponse, SettingResponse},
    },
    error::AppError,
};

/// 返回脱敏后的全部配置
pub async fn list_settings(State(state): State<AppState>) -> impl IntoResponse {
    debug!("Listing settings");
    Json(state.settings.redacted())
}

/// 返回单个脱敏后的配置项
pub async fn get_setting(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let name = name.to_uppercase();
    debug!("Getting setting: {}", name);

    let redacted = state.settings.redacted();
    let value = redacted
        .get(&name)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("配置项 {}", name)))?;

    Ok(Json(SettingResponse { name, value }))
}

/// 返回会话 Cookie 策略
pub async fn get_cookie_policy(State(state): State<AppState>) -> impl IntoResponse {
    let policy = state.cookie_policy;
    Json(CookiePolicyResponse {
        secure: policy.secure,
        http_only: policy.http_only,
        same_site: policy.same_site.to_string(),
        attributes: policy.attributes(),
    })
}
