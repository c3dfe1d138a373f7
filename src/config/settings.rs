//! 扁平运行时配置
//!
//! 以大写名称为键保存最终生效的配置值，启动时由 [`AppConfig`] 生成，
//! 随后由 `init_app` 合并数据库覆盖文件。

use crate::config::config::AppConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 脱敏后的占位值
pub const REDACTED: &str = "***";

/// 名称中包含这些片段的配置值需要脱敏
const SENSITIVE_MARKERS: [&str; 6] = [
    "PASSWORD",
    "PWD",
    "SECRET",
    "API_KEY",
    "TOKEN",
    "CREDENTIAL",
];

/// 密码未做百分号编码，可能包含 `@`，因此匹配到最后一个 `@`
static URI_CREDENTIALS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*://)(?P<user>[^:@/]*):.*@")
        .expect("credential pattern is valid")
});

/// 运行时配置表
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Settings {
    values: BTreeMap<String, Value>,
}

fn opt(value: &Option<String>) -> Value {
    value.as_deref().map_or(Value::Null, |s| Value::String(s.to_string()))
}

fn path_value(path: &Path) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由类型化配置生成配置表
    pub fn from_config(config: &AppConfig) -> Self {
        let mut settings = Self::new();
        settings.insert("SQLALCHEMY_DATABASE_URI", config.storage.admin_database_uri());

        settings.insert("MYSQL_HOST", opt(&config.mysql.host));
        settings.insert("MYSQL_PORT", config.mysql.port);
        settings.insert("MYSQL_ADMIN_USER", opt(&config.mysql.admin_user));
        settings.insert("MYSQL_ADMIN_PASSWORD", opt(&config.mysql.admin_password));
        settings.insert("MYSQL_CLIENT_URI", config.mysql.client_uri());
        settings.insert(
            "SQLALCHEMY_BINDS",
            config
                .binds()
                .into_iter()
                .map(|(name, uri)| (name.to_string(), Value::String(uri)))
                .collect::<Map<_, _>>(),
        );

        settings.insert("REPORT_FOLDER", path_value(&config.storage.report_folder));
        settings.insert("UPLOAD_FOLDER", path_value(&config.storage.upload_folder));
        settings.insert(
            "ENTERPRISE_FOLDER",
            path_value(&config.storage.enterprise_folder),
        );
        settings.insert(
            "ALLOWED_EXTENSIONS",
            config
                .storage
                .allowed_extensions
                .iter()
                .cloned()
                .collect::<Vec<_>>(),
        );

        settings.insert("SECRET_KEY", opt(&config.security.secret_key));
        settings.insert(
            "SESSION_COOKIE_SECURE",
            config.security.session_cookie_secure,
        );
        settings.insert(
            "SESSION_COOKIE_HTTPONLY",
            config.security.session_cookie_httponly,
        );
        settings.insert(
            "SESSION_COOKIE_SAMESITE",
            config.security.session_cookie_samesite.to_string(),
        );

        settings.insert("POSTGRES_HOST", opt(&config.postgres.host));
        settings.insert("POSTGRES_PORT", config.postgres.port.as_str());
        settings.insert("POSTGRES_ADMIN_USER", opt(&config.postgres.admin_user));
        settings.insert(
            "POSTGRES_ADMIN_PASSWORD",
            opt(&config.postgres.admin_password),
        );
        settings.insert("POSTGRES_URI", config.postgres.uri());

        settings.insert("SQLSERVER_HOST", opt(&config.sqlserver.host));
        settings.insert(
            "SQLSERVER_INSTANCE",
            config.sqlserver.instance.clone().unwrap_or_default(),
        );
        settings.insert("SQLSERVER_PORT", config.sqlserver.port.as_str());
        settings.insert("SQLSERVER_ADMIN_USER", opt(&config.sqlserver.admin_user));
        settings.insert(
            "SQLSERVER_ADMIN_PASSWORD",
            opt(&config.sqlserver.admin_password),
        );
        settings.insert("SQLSERVER_URI", config.sqlserver.uri());

        settings.insert("AZURE_OPENAI_ENDPOINT", opt(&config.azure.openai_endpoint));
        settings.insert("AZURE_OPENAI_API_KEY", opt(&config.azure.openai_api_key));
        settings.insert(
            "AZURE_API_VERSION_GPT_4",
            opt(&config.azure.api_version_gpt_4),
        );
        settings.insert(
            "AZURE_OPENAI_GPT_4_TURBO_MODEL",
            opt(&config.azure.openai_gpt_4_turbo_model),
        );
        settings.insert(
            "AZURE_OPENAI_EMBEDDING_MODEL",
            opt(&config.azure.openai_embedding_model),
        );

        settings
    }

    /// 写入或覆盖配置值，返回旧值
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// 以路径形式读取字符串配置
    pub fn path(&self, name: &str) -> Option<PathBuf> {
        self.get_str(name).map(PathBuf::from)
    }

    /// 返回可对外展示的副本：密码、密钥和连接串中的凭据被替换
    pub fn redacted(&self) -> Self {
        let values = self
            .values
            .iter()
            .map(|(name, value)| (name.clone(), redact_value(name, value)))
            .collect();
        Self { values }
    }
}

fn is_sensitive(name: &str) -> bool {
    let upper = name.to_uppercase();
    SENSITIVE_MARKERS.iter().any(|m| upper.contains(m))
}

fn redact_value(name: &str, value: &Value) -> Value {
    if is_sensitive(name) && !value.is_null() {
        return Value::String(REDACTED.to_string());
    }
    match value {
        Value::String(s) => Value::String(redact_uri(s)),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_value(k, v)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| redact_value(name, v)).collect())
        }
        other => other.clone(),
    }
}

/// 屏蔽 `scheme://user:password@` 中的密码
pub fn redact_uri(uri: &str) -> String {
    URI_CREDENTIALS
        .replace(uri, |caps: &regex::Captures<'_>| {
            format!("{}{}:{}@", &caps["scheme"], &caps["user"], REDACTED)
        })
        .into_owned()
}
