//! 应用初始化
//!
//! 创建存储目录，并从上传目录中的 `{db_type}_config.json` 合并数据库配置。

use crate::config::settings::Settings;
use crate::error::{AppError, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 启动时需要存在的目录配置项
pub const STORAGE_FOLDER_KEYS: [&str; 3] = ["REPORT_FOLDER", "UPLOAD_FOLDER", "ENTERPRISE_FOLDER"];

/// 支持覆盖文件的数据库类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseKind {
    Mysql,
    Postgres,
    SqlServer,
}

impl DatabaseKind {
    /// 按合并顺序排列
    pub const ALL: [DatabaseKind; 3] = [
        DatabaseKind::Mysql,
        DatabaseKind::Postgres,
        DatabaseKind::SqlServer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseKind::Mysql => "mysql",
            DatabaseKind::Postgres => "postgres",
            DatabaseKind::SqlServer => "sqlserver",
        }
    }

    /// 覆盖文件名
    pub fn override_file_name(&self) -> String {
        format!("{}_config.json", self.as_str())
    }

    /// 覆盖项对应的配置名，例如 `mysql` + `host` -> `MYSQL_HOST`
    pub fn setting_name(&self, key: &str) -> String {
        format!("{}_{}", self.as_str(), key).to_uppercase()
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 已应用的覆盖文件
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedOverride {
    pub kind: DatabaseKind,
    pub path: PathBuf,
    /// 写入的配置名，按文件中的顺序
    pub keys: Vec<String>,
}

/// 初始化结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitReport {
    /// 本次新建的目录
    pub created_dirs: Vec<PathBuf>,
    pub applied_overrides: Vec<AppliedOverride>,
}

fn required_path(settings: &Settings, name: &str) -> Result<PathBuf> {
    settings
        .path(name)
        .ok_or_else(|| AppError::Config(format!("{} 未配置", name)))
}

/// 创建存储目录，已存在时跳过
pub fn ensure_storage_dirs(settings: &Settings) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();
    for key in STORAGE_FOLDER_KEYS {
        let folder = required_path(settings, key)?;
        if !folder.is_dir() {
            fs::create_dir_all(&folder)?;
            debug!(folder = %folder.display(), "Created storage folder");
            created.push(folder);
        }
    }
    Ok(created)
}

/// 读取单个覆盖文件，文件不存在时返回 `None`
pub fn read_override_file(path: &Path) -> Result<Option<Map<String, Value>>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| AppError::Override(format!("{}: {}", path.display(), e)))?;

    match value {
        Value::Object(map) => Ok(Some(map)),
        other => Err(AppError::Override(format!(
            "{}: 顶层必须是 JSON 对象，实际为 {}",
            path.display(),
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 依次合并 mysql、postgres、sqlserver 的覆盖文件
///
/// 覆盖后的值不会重新生成连接串。
pub fn apply_database_overrides(
    settings: &mut Settings,
    upload_folder: &Path,
) -> Result<Vec<AppliedOverride>> {
    let mut applied = Vec::new();

    for kind in DatabaseKind::ALL {
        let path = upload_folder.join(kind.override_file_name());
        let Some(entries) = read_override_file(&path)? else {
            debug!(kind = %kind, path = %path.display(), "No override file");
            continue;
        };

        let mut keys = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let name = kind.setting_name(&key);
            settings.insert(name.clone(), value);
            keys.push(name);
        }

        info!(
            kind = %kind,
            path = %path.display(),
            keys = keys.len(),
            "Applied database config override"
        );
        applied.push(AppliedOverride { kind, path, keys });
    }

    Ok(applied)
}

/// 初始化应用：确保存储目录存在，然后合并数据库覆盖文件
pub fn init_app(settings: &mut Settings) -> Result<InitReport> {
    let created_dirs = ensure_storage_dirs(settings)?;
    let upload_folder = required_path(settings, "UPLOAD_FOLDER")?;
    let applied_overrides = apply_database_overrides(settings, &upload_folder)?;

    info!(
        created = created_dirs.len(),
        overrides = applied_overrides.len(),
        "Application initialized"
    );

    Ok(InitReport {
        created_dirs,
        applied_overrides,
    })
}
