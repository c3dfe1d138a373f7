use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 单个配置项响应
#[derive(Debug, Serialize, Deserialize)]
pub struct SettingResponse {
    pub name: String,
    pub value: Value,
}

/// 会话 Cookie 策略响应
#[derive(Debug, Serialize, Deserialize)]
pub struct CookiePolicyResponse {
    pub secure: bool,
    pub http_only: bool,
    pub same_site: String,
    /// `Set-Cookie` 属性后缀
    pub attributes: String,
}
