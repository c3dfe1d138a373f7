//! Datadesk - 管理后台的环境配置与启动初始化
//!
//! 从环境变量加载数据库连接、存储目录、安全与第三方凭据配置，
//! 启动时创建存储目录并合并上传目录中的数据库覆盖文件。

pub mod api;
pub mod config;
pub mod error;
pub mod observability;
pub mod security;
