// Authentication configuration loaded from environment variables.
// Decision: AUTH_ prefix for all auth config
// Decision: Sessions default to 30 days, matching the dashboard's
// stay-signed-in behavior

use std::time::Duration;

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session lifetime
    pub session_max_age: Duration,
    /// Whether to disable signup (registration)
    pub disable_signup: bool,
    /// Whether session cookies carry the Secure attribute
    pub cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_max_age: Duration::from_secs(30 * 24 * 60 * 60), // 30 days
            disable_signup: false,
            cookie_secure: false,
        }
    }
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let session_max_age = std::env::var("AUTH_SESSION_MAX_AGE_MINS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(|mins: u64| Duration::from_secs(mins * 60))
            .unwrap_or_else(|| Duration::from_secs(30 * 24 * 60 * 60));

        let disable_signup = std::env::var("AUTH_DISABLE_SIGNUP")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(false);

        let cookie_secure = std::env::var("AUTH_COOKIE_SECURE")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(false);

        Self {
            session_max_age,
            disable_signup,
            cookie_secure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.session_max_age, Duration::from_secs(30 * 24 * 60 * 60));
        assert!(!config.disable_signup);
        assert!(!config.cookie_secure);
    }

    #[test]
    fn test_session_max_age_env_is_minutes() {
        std::env::set_var("AUTH_SESSION_MAX_AGE_MINS", "90");
        let config = AuthConfig::from_env();
        std::env::remove_var("AUTH_SESSION_MAX_AGE_MINS");
        assert_eq!(config.session_max_age, Duration::from_secs(90 * 60));
    }
}
