// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token lifecycle management.
//!
//! Refresh is strictly lazy: a token is only exchanged once its
//! `expires_at` has passed, never ahead of it. One refresh attempt per
//! call; a failed refresh leaves the stored credential untouched.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::db::CredentialStore;
use crate::error::AppError;
use crate::models::AthleteCredential;
use crate::services::strava::StravaApi;

/// Per-athlete mutex to serialize token refresh operations.
type RefreshLocks = DashMap<u64, Arc<Mutex<()>>>;

/// Keeps a per-athlete access credential valid.
///
/// Credential state per athlete moves VALID -> EXPIRED as the clock passes
/// `expires_at`, and back to VALID through exactly one refresh attempt per
/// [`ensure_valid`](Self::ensure_valid) call. A failed attempt is terminal
/// for that call only; the next call retries against the provider.
pub struct TokenRefresher {
    api: Arc<dyn StravaApi>,
    credentials: Arc<dyn CredentialStore>,
    refresh_locks: RefreshLocks,
}

impl TokenRefresher {
    pub fn new(api: Arc<dyn StravaApi>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            api,
            credentials,
            refresh_locks: DashMap::new(),
        }
    }

    /// Return a usable access token for the credential's athlete,
    /// refreshing it first if it has expired.
    ///
    /// A still-valid token is returned without any network or store call.
    pub async fn ensure_valid(&self, credential: &AthleteCredential) -> Result<String, AppError> {
        let athlete_id = credential.athlete_id;

        if !credential.is_expired(Utc::now().timestamp()) {
            return Ok(credential.access_token.clone());
        }

        // Serialize refreshes per athlete so overlapping passes cannot race
        // the same refresh token against the provider.
        let lock = self
            .refresh_locks
            .entry(athlete_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let _guard = lock.lock().await;

        // Re-read after acquiring the lock: another task may have refreshed
        // while we waited, in which case its stored token is current.
        let current = self
            .credentials
            .get_credential(athlete_id)
            .await?
            .ok_or(AppError::CredentialNotFound(athlete_id))?;

        if !current.is_expired(Utc::now().timestamp()) {
            return Ok(current.access_token);
        }

        tracing::info!(athlete_id, "Access token expired, refreshing");

        // Exactly one attempt; retries, if any, belong to the caller.
        let new_tokens = self
            .api
            .refresh_token(&current.refresh_token)
            .await
            .map_err(|e| AppError::RefreshFailed {
                athlete_id,
                detail: e.to_string(),
            })?;

        let updated = AthleteCredential {
            access_token: new_tokens.access_token.clone(),
            refresh_token: new_tokens.refresh_token,
            expires_at: new_tokens.expires_at,
            ..current
        };

        self.credentials.upsert_credential(&updated).await?;

        tracing::info!(athlete_id, expires_at = updated.expires_at, "Token refreshed");
        Ok(new_tokens.access_token)
    }
}
