//! Athlete OAuth credential model.

use serde::{Deserialize, Serialize};

/// Stored OAuth credential for one athlete (`strava_users` row).
///
/// Uniqueness is keyed by `athlete_id`; `email` is an indexed lookup column
/// only and never used as an upsert conflict target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthleteCredential {
    /// Strava athlete ID (canonical key)
    pub athlete_id: u64,
    /// Current access token (opaque, secret)
    pub access_token: String,
    /// Current refresh token (opaque, secret)
    pub refresh_token: String,
    /// Access token expiry, epoch seconds
    pub expires_at: i64,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// First name from the OAuth athlete payload
    pub firstname: Option<String>,
    /// Last name from the OAuth athlete payload
    pub lastname: Option<String>,
    /// Last write timestamp (RFC3339)
    pub updated_at: String,
}

impl AthleteCredential {
    /// Whether the access token has expired as of `now` (epoch seconds).
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}
