use crate::config::config::{
    AppConfig, AzureOpenAiConfig, LoggingConfig, MysqlConfig, PostgresConfig, SecurityConfig,
    ServerConfig, SqlServerConfig, StorageConfig,
};
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 应用根目录环境变量
pub const BASE_DIR_ENV: &str = "APP_BASE_DIR";

/// Cookie 策略读取的环境变量
const COOKIE_KEYS: [&str; 3] = [
    "SESSION_COOKIE_SECURE",
    "SESSION_COOKIE_HTTPONLY",
    "SESSION_COOKIE_SAMESITE",
];

const MYSQL_TEXT_KEYS: [&str; 3] = ["host", "admin_user", "admin_password"];
const POSTGRES_TEXT_KEYS: [&str; 4] = ["host", "port", "admin_user", "admin_password"];
const SQLSERVER_TEXT_KEYS: [&str; 5] = [
    "host",
    "instance",
    "port",
    "admin_user",
    "admin_password",
];
const AZURE_TEXT_KEYS: [&str; 5] = [
    "openai_endpoint",
    "openai_api_key",
    "api_version_gpt_4",
    "openai_gpt_4_turbo_model",
    "openai_embedding_model",
];

/// 原样读取 `{prefix}{KEY}` 环境变量，不经过 figment 的值解析
///
/// `Env` 会把 `007` 读成整数、去掉引号和首尾空白，凭据类字段必须保留原文。
fn raw_env(prefix: &str, keys: &[&str]) -> Serialized<BTreeMap<String, String>> {
    let values = keys
        .iter()
        .filter_map(|key| {
            let name = format!("{}{}", prefix, key.to_uppercase());
            std::env::var_os(&name)
                .map(|value| (key.to_string(), value.to_string_lossy().into_owned()))
        })
        .collect::<BTreeMap<_, _>>();
    Serialized::defaults(values)
}

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 读取 `.env` 文件到进程环境
    ///
    /// 从当前目录向上查找，文件不存在时忽略。已存在的环境变量不会被覆盖。
    pub fn load_dotenv() -> Option<PathBuf> {
        match dotenvy::dotenv() {
            Ok(path) => {
                debug!(path = %path.display(), "Loaded .env file");
                Some(path)
            }
            Err(e) => {
                debug!("No .env file loaded: {}", e);
                None
            }
        }
    }

    /// 从默认位置加载配置
    ///
    /// 1. `.env` 文件
    /// 2. 环境变量
    ///
    /// 根目录取 `APP_BASE_DIR`，未设置时为当前工作目录。
    pub fn load() -> Result<AppConfig, figment::Error> {
        Self::load_dotenv();
        Self::from_env(Self::base_dir())
    }

    /// 解析应用根目录
    pub fn base_dir() -> PathBuf {
        std::env::var_os(BASE_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// 以指定根目录从环境变量加载全部配置
    pub fn from_env(base_dir: impl AsRef<Path>) -> Result<AppConfig, figment::Error> {
        let base_dir = base_dir.as_ref().to_path_buf();

        Ok(AppConfig {
            storage: StorageConfig::from_base_dir(&base_dir),
            base_dir,
            mysql: Self::load_mysql_config()?,
            postgres: Self::load_postgres_config()?,
            sqlserver: Self::load_sqlserver_config()?,
            security: Self::load_security_config()?,
            azure: Self::load_azure_config()?,
            logging: Self::load_logging_config()?,
            server: Self::load_server_config()?,
        })
    }

    /// 加载 MySQL 配置（`MYSQL_*`）
    pub fn load_mysql_config() -> Result<MysqlConfig, figment::Error> {
        Figment::new()
            .merge(Env::prefixed("MYSQL_").ignore(&MYSQL_TEXT_KEYS))
            .merge(raw_env("MYSQL_", &MYSQL_TEXT_KEYS))
            .extract()
    }

    /// 加载 PostgreSQL 配置（`POSTGRES_*`）
    ///
    /// 所有字段按原文读取，端口不做校验。
    pub fn load_postgres_config() -> Result<PostgresConfig, figment::Error> {
        Figment::new()
            .merge(raw_env("POSTGRES_", &POSTGRES_TEXT_KEYS))
            .extract()
    }

    /// 加载 SQL Server 配置（`SQLSERVER_*`）
    pub fn load_sqlserver_config() -> Result<SqlServerConfig, figment::Error> {
        Figment::new()
            .merge(raw_env("SQLSERVER_", &SQLSERVER_TEXT_KEYS))
            .extract()
    }

    /// 加载安全配置（`SECRET_KEY`、`SESSION_COOKIE_*`）
    pub fn load_security_config() -> Result<SecurityConfig, figment::Error> {
        Figment::new()
            .merge(Env::raw().only(&COOKIE_KEYS))
            .merge(raw_env("", &["secret_key"]))
            .extract()
    }

    /// 加载 Azure OpenAI 配置（`AZURE_*`）
    pub fn load_azure_config() -> Result<AzureOpenAiConfig, figment::Error> {
        Figment::new()
            .merge(raw_env("AZURE_", &AZURE_TEXT_KEYS))
            .extract()
    }

    /// 加载日志配置（`LOG_*`）
    pub fn load_logging_config() -> Result<LoggingConfig, figment::Error> {
        Figment::new().merge(Env::prefixed("LOG_")).extract()
    }

    /// 加载服务器配置（`SERVER_*`）
    pub fn load_server_config() -> Result<ServerConfig, figment::Error> {
        Figment::new().merge(Env::prefixed("SERVER_")).extract()
    }

    /// 列出未设置或为空的凭据变量
    ///
    /// 缺失的值不会阻止启动，只用于告警。
    pub fn missing_settings(config: &AppConfig) -> Vec<&'static str> {
        let checks: [(&'static str, &Option<String>); 15] = [
            ("MYSQL_HOST", &config.mysql.host),
            ("MYSQL_ADMIN_USER", &config.mysql.admin_user),
            ("MYSQL_ADMIN_PASSWORD", &config.mysql.admin_password),
            ("POSTGRES_HOST", &config.postgres.host),
            ("POSTGRES_ADMIN_USER", &config.postgres.admin_user),
            ("POSTGRES_ADMIN_PASSWORD", &config.postgres.admin_password),
            ("SQLSERVER_HOST", &config.sqlserver.host),
            ("SQLSERVER_ADMIN_USER", &config.sqlserver.admin_user),
            ("SQLSERVER_ADMIN_PASSWORD", &config.sqlserver.admin_password),
            ("SECRET_KEY", &config.security.secret_key),
            ("AZURE_OPENAI_ENDPOINT", &config.azure.openai_endpoint),
            ("AZURE_OPENAI_API_KEY", &config.azure.openai_api_key),
            ("AZURE_API_VERSION_GPT_4", &config.azure.api_version_gpt_4),
            (
                "AZURE_OPENAI_GPT_4_TURBO_MODEL",
                &config.azure.openai_gpt_4_turbo_model,
            ),
            (
                "AZURE_OPENAI_EMBEDDING_MODEL",
                &config.azure.openai_embedding_model,
            ),
        ];

        checks
            .into_iter()
            .filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
            .map(|(name, _)| name)
            .collect()
    }
}
