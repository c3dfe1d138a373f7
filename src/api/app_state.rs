use crate::config::settings::Settings;
use crate::security::cookie::SessionCookiePolicy;
use std::sync::Arc;

/// Application state shared by the API handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Effective settings after `init_app`, read-only
    pub settings: Arc<Settings>,
    /// Session cookie attributes derived from the settings
    pub cookie_policy: SessionCookiePolicy,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: Settings) -> Self {
        let cookie_policy = SessionCookiePolicy::from_settings(&settings);
        Self {
            settings: Arc::new(settings),
            cookie_policy,
        }
    }
}
