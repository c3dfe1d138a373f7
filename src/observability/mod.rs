//! 可观测性模块
//!
//! 提供结构化日志初始化和健康检查。

use axum::{Json, Router, response::IntoResponse, routing::get};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::config::LoggingConfig;
use crate::config::init::STORAGE_FOLDER_KEYS;
use crate::config::settings::Settings;

// ===== Health Check =====

/// 健康检查状态
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: f64,
    pub checks: Vec<HealthCheck>,
}

/// 单个健康检查项
#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    pub message: Option<String>,
}

/// 健康检查结果
#[derive(Debug, Clone)]
pub struct HealthCheckResult {
    pub name: String,
    pub healthy: bool,
    pub message: String,
}

impl HealthCheckResult {
    /// 检查目录是否存在
    pub fn directory(name: &str, path: &Path) -> Self {
        let healthy = path.is_dir();
        Self {
            name: format!("storage:{}", name),
            healthy,
            message: if healthy {
                format!("{} exists", path.display())
            } else {
                format!("{} is missing", path.display())
            },
        }
    }
}

/// 应用状态（用于健康检查）
#[derive(Clone)]
pub struct ObservabilityState {
    pub health_checks: Arc<Mutex<Vec<HealthCheckResult>>>,
    pub start_time: DateTime<Utc>,
    pub version: String,
}

impl ObservabilityState {
    pub fn new(version: String) -> Self {
        Self {
            health_checks: Arc::new(Mutex::new(Vec::new())),
            start_time: Utc::now(),
            version,
        }
    }

    /// 添加健康检查结果，同名结果被替换
    pub async fn add_health_check(&self, result: HealthCheckResult) {
        let mut checks = self.health_checks.lock().await;
        checks.retain(|c| c.name != result.name);
        checks.push(result);
    }

    /// 记录各存储目录的状态
    pub async fn record_storage_checks(&self, settings: &Settings) {
        for key in STORAGE_FOLDER_KEYS {
            let result = match settings.path(key) {
                Some(path) => HealthCheckResult::directory(key, &path),
                None => HealthCheckResult {
                    name: format!("storage:{}", key),
                    healthy: false,
                    message: format!("{} is not configured", key),
                },
            };
            self.add_health_check(result).await;
        }
    }

    /// 获取应用正常运行时间
    pub fn uptime_seconds(&self) -> f64 {
        (Utc::now() - self.start_time).num_seconds() as f64
    }
}

// ===== Health Check Handlers =====

/// 获取完整健康状态
pub async fn health_check(
    state: axum::extract::State<Arc<ObservabilityState>>,
) -> impl IntoResponse {
    let checks = state.health_checks.lock().await;
    let all_healthy = checks.iter().all(|c| c.healthy);

    let health_status = HealthStatus {
        status: if all_healthy {
            "healthy".to_string()
        } else {
            "unhealthy".to_string()
        },
        timestamp: Utc::now().to_rfc3339(),
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
        checks: checks
            .iter()
            .map(|c| HealthCheck {
                name: c.name.clone(),
                status: if c.healthy {
                    "healthy".to_string()
                } else {
                    "unhealthy".to_string()
                },
                message: Some(c.message.clone()),
            })
            .collect(),
    };

    let status_code = if all_healthy {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(health_status))
}

/// 简单存活检查
pub async fn liveness() -> impl IntoResponse {
    "OK"
}

/// 就绪检查（存储目录均已创建）
pub async fn readiness(state: axum::extract::State<Arc<ObservabilityState>>) -> impl IntoResponse {
    let checks = state.health_checks.lock().await;
    let all_healthy = checks.iter().all(|c| c.healthy);

    if all_healthy {
        (axum::http::StatusCode::OK, "Ready")
    } else {
        (axum::http::StatusCode::SERVICE_UNAVAILABLE, "Not Ready")
    }
}

/// 版本信息端点
pub async fn version(state: axum::extract::State<Arc<ObservabilityState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "version": state.version,
        "uptime_seconds": state.uptime_seconds(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// 创建可观测性路由
pub fn create_observability_router(state: Arc<ObservabilityState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        .route("/version", get(version))
        .with_state(state)
}

// ===== Structured Logging =====

/// 初始化结构化日志
///
/// `RUST_LOG` 优先于 `LOG_LEVEL`。设置了 `LOG_DIR` 时同时按天滚动写入文件，
/// 返回的 guard 需要保持到进程退出。
pub fn init_tracing(
    service_name: &str,
    config: &LoggingConfig,
) -> Result<Option<WorkerGuard>, tracing_subscriber::util::TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},{}", config.level, service_name)));

    let (file_writer, guard) = match &config.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, format!("{}.log", service_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json {
        registry
            .with(fmt::layer().json().with_target(true))
            .with(file_writer.map(|w| fmt::layer().json().with_ansi(false).with_writer(w)))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .with(file_writer.map(|w| fmt::layer().with_ansi(false).with_writer(w)))
            .try_init()?;
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tempfile::TempDir;
    use tower::ServiceExt;

    #[test]
    fn test_directory_check() {
        let dir = TempDir::new().unwrap();
        let present = HealthCheckResult::directory("UPLOAD_FOLDER", dir.path());
        let missing = HealthCheckResult::directory("REPORT_FOLDER", &dir.path().join("nope"));

        assert!(present.healthy);
        assert_eq!(present.name, "storage:UPLOAD_FOLDER");
        assert!(!missing.healthy);
        assert!(missing.message.contains("missing"));
    }

    #[tokio::test]
    async fn test_add_health_check_replaces_same_name() {
        let state = ObservabilityState::new("0.1.0".to_string());
        let dir = TempDir::new().unwrap();
        state
            .add_health_check(HealthCheckResult::directory("X", &dir.path().join("a")))
            .await;
        state
            .add_health_check(HealthCheckResult::directory("X", dir.path()))
            .await;

        let checks = state.health_checks.lock().await;
        assert_eq!(checks.len(), 1);
        assert!(checks[0].healthy);
    }

    #[tokio::test]
    async fn test_readiness_reflects_storage() {
        let dir = TempDir::new().unwrap();
        let mut settings = Settings::new();
        settings.insert("REPORT_FOLDER", dir.path().to_string_lossy().into_owned());
        settings.insert("UPLOAD_FOLDER", dir.path().to_string_lossy().into_owned());
        settings.insert(
            "ENTERPRISE_FOLDER",
            dir.path().join("missing").to_string_lossy().into_owned(),
        );

        let state = Arc::new(ObservabilityState::new("0.1.0".to_string()));
        state.record_storage_checks(&settings).await;
        let app = create_observability_router(state);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app
            .oneshot(Request::builder().uri("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_health_status_structure() {
        let status = HealthStatus {
            status: "healthy".to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            version: "1.0.0".to_string(),
            uptime_seconds: 3600.0,
            checks: vec![],
        };

        assert_eq!(status.status, "healthy");
        assert_eq!(status.version, "1.0.0");
    }
}
