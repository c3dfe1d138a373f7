//! DTO 模块
//!
//! API 响应数据结构。

pub mod settings_dto;

pub use settings_dto::*;
