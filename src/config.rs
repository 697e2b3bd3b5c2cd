//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup into a [`Config`] value that is passed
//! explicitly into each component's constructor; no other module reads
//! environment state.

use std::env;

use crate::services::reconcile::RetentionPolicy;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strava OAuth client ID (public)
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// OAuth redirect URI registered with Strava (points at /auth/callback)
    pub strava_redirect_uri: String,
    /// Supabase project URL (e.g. https://xyz.supabase.co)
    pub supabase_url: String,
    /// Supabase service-role key used for PostgREST calls
    pub supabase_service_key: String,
    /// Dashboard URL for post-OAuth redirects
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Page size for Strava activity listing
    pub sync_per_page: u32,
    /// Only sync activities starting within the last N days (None = provider default window)
    pub sync_lookback_days: Option<i64>,
    /// Activity retention policy applied by the reconciler (global, never per athlete)
    pub retention_policy: RetentionPolicy,
    /// Timeout applied to every outbound HTTP call, in seconds
    pub http_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first when present (local development).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            strava_client_id: env::var("STRAVA_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            strava_client_secret: env::var("STRAVA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
            strava_redirect_uri: env::var("STRAVA_REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:8080/auth/callback".to_string()),
            supabase_url: env::var("SUPABASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_URL"))?,
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_SERVICE_KEY"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            sync_per_page: env::var("SYNC_PER_PAGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
            sync_lookback_days: env::var("SYNC_LOOKBACK_DAYS")
                .ok()
                .and_then(|v| v.parse().ok()),
            retention_policy: match env::var("RETENTION_POLICY").as_deref() {
                Ok("prune_before_batch") => RetentionPolicy::PruneBeforeBatch,
                Ok("keep_all") | Err(_) => RetentionPolicy::KeepAll,
                Ok(other) => return Err(ConfigError::Invalid("RETENTION_POLICY", other.to_string())),
            },
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Fixed config for tests; never reads the environment.
    pub fn test_default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            strava_redirect_uri: "http://localhost:8080/auth/callback".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test_service_key".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            sync_per_page: 50,
            sync_lookback_days: None,
            retention_policy: RetentionPolicy::KeepAll,
            http_timeout_secs: 30,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("STRAVA_CLIENT_ID", "test_id");
        env::set_var("STRAVA_CLIENT_SECRET", "test_secret");
        env::set_var("SUPABASE_URL", "http://localhost:54321/");
        env::set_var("SUPABASE_SERVICE_KEY", "test_key");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.strava_client_id, "test_id");
        assert_eq!(config.strava_client_secret, "test_secret");
        // Trailing slash is trimmed so PostgREST paths join cleanly
        assert_eq!(config.supabase_url, "http://localhost:54321");
        assert_eq!(config.port, 8080);
        assert_eq!(config.sync_per_page, 50);
        assert_eq!(config.retention_policy, RetentionPolicy::KeepAll);
    }
}
