use datadesk::api::{self, app_state::AppState};
use datadesk::config::{ConfigLoader, Settings, init_app};
use datadesk::error::AppError;
use datadesk::observability::{self, ObservabilityState, create_observability_router};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load().map_err(AppError::from)?;
    let _log_guard = observability::init_tracing("datadesk", &config.logging)?;

    info!("Starting Datadesk...");
    info!(base_dir = %config.base_dir.display(), "Configuration loaded successfully");

    for name in ConfigLoader::missing_settings(&config) {
        warn!("{} is not set or empty", name);
    }

    let mut settings = Settings::from_config(&config);
    let report = init_app(&mut settings)?;
    for dir in &report.created_dirs {
        info!("Created folder {}", dir.display());
    }
    for applied in &report.applied_overrides {
        info!(
            "Merged {} settings from {}",
            applied.keys.len(),
            applied.path.display()
        );
    }

    let observability_state = Arc::new(ObservabilityState::new(
        env!("CARGO_PKG_VERSION").to_string(),
    ));
    observability_state.record_storage_checks(&settings).await;

    let app_state = AppState::new(settings);
    info!(
        "Session cookie policy: {}",
        app_state.cookie_policy.attributes()
    );

    let router = create_observability_router(observability_state).merge(api::create_router(app_state));
    info!("API router created with observability endpoints");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
