//! Session cookie policy
//!
//! Derived from the effective `SESSION_COOKIE_*` settings, so values merged
//! by `init_app` are honored.

use crate::config::config::SameSite;
use crate::config::settings::Settings;

/// Attributes applied to the session cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCookiePolicy {
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl Default for SessionCookiePolicy {
    fn default() -> Self {
        Self {
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
        }
    }
}

impl SessionCookiePolicy {
    /// Read the policy from settings, falling back to the secure defaults
    pub fn from_settings(settings: &Settings) -> Self {
        let defaults = Self::default();
        let same_site = settings
            .get_str("SESSION_COOKIE_SAMESITE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.same_site);

        Self {
            secure: settings
                .get_bool("SESSION_COOKIE_SECURE")
                .unwrap_or(defaults.secure),
            http_only: settings
                .get_bool("SESSION_COOKIE_HTTPONLY")
                .unwrap_or(defaults.http_only),
            same_site,
        }
    }

    /// Cookie attribute suffix, e.g. `Secure; HttpOnly; SameSite=Lax`
    pub fn attributes(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if self.secure {
            parts.push("Secure".to_string());
        }
        if self.http_only {
            parts.push("HttpOnly".to_string());
        }
        parts.push(format!("SameSite={}", self.same_site));
        parts.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config::AppConfig;

    #[test]
    fn test_default_policy_from_settings() {
        let settings = Settings::from_config(&AppConfig::with_base_dir("."));
        let policy = SessionCookiePolicy::from_settings(&settings);

        assert_eq!(policy, SessionCookiePolicy::default());
        assert_eq!(policy.attributes(), "Secure; HttpOnly; SameSite=Lax");
    }

    #[test]
    fn test_overridden_policy() {
        let mut settings = Settings::new();
        settings.insert("SESSION_COOKIE_SECURE", false);
        settings.insert("SESSION_COOKIE_SAMESITE", "strict");

        let policy = SessionCookiePolicy::from_settings(&settings);

        assert!(!policy.secure);
        assert!(policy.http_only);
        assert_eq!(policy.same_site, SameSite::Strict);
        assert_eq!(policy.attributes(), "HttpOnly; SameSite=Strict");
    }

    #[test]
    fn test_unknown_samesite_falls_back_to_lax() {
        let mut settings = Settings::new();
        settings.insert("SESSION_COOKIE_SAMESITE", "relaxed");

        let policy = SessionCookiePolicy::from_settings(&settings);

        assert_eq!(policy.same_site, SameSite::Lax);
    }
}
