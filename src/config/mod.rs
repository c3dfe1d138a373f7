//! 配置管理模块
//!
//! 从环境变量（及 `.env` 文件）加载应用配置，生成扁平的运行时配置表，
//! 并在启动时创建存储目录、合并数据库覆盖文件。

pub mod config;
pub mod init;
pub mod loader;
pub mod settings;

pub use config::AppConfig;
pub use init::{DatabaseKind, InitReport, init_app};
pub use loader::ConfigLoader;
pub use settings::Settings;
