// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test fixtures: an in-memory store plus a scripted Strava mock.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use alameda_sync::config::Config;
use alameda_sync::db::MemoryDb;
use alameda_sync::error::AppError;
use alameda_sync::models::AthleteCredential;
use alameda_sync::routes::create_router;
use alameda_sync::services::reconcile::RetentionPolicy;
use alameda_sync::services::strava::{
    StravaActivity, StravaApi, StravaAthlete, TokenExchangeResponse, TokenRefreshResponse,
};
use alameda_sync::AppState;

/// Scripted Strava API double. Counts calls and serves configured
/// responses; anything not scripted fails.
#[derive(Default)]
#[allow(dead_code)]
pub struct MockStrava {
    activities: Mutex<Vec<StravaActivity>>,
    refresh_responses: Mutex<HashMap<String, TokenRefreshResponse>>,
    failing_refresh_tokens: Mutex<HashSet<String>>,
    exchange_responses: Mutex<HashMap<String, TokenExchangeResponse>>,
    fail_on_page: Mutex<Option<u32>>,
    pub refresh_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockStrava {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remote activity set served by `list_activities`, newest first.
    pub fn set_activities(&self, activities: Vec<StravaActivity>) {
        *self.activities.lock().unwrap() = activities;
    }

    /// Script a successful refresh for the given stored refresh token.
    pub fn script_refresh(&self, refresh_token: &str, response: TokenRefreshResponse) {
        self.refresh_responses
            .lock()
            .unwrap()
            .insert(refresh_token.to_string(), response);
    }

    /// Make refreshes with the given stored token fail.
    pub fn fail_refresh(&self, refresh_token: &str) {
        self.failing_refresh_tokens
            .lock()
            .unwrap()
            .insert(refresh_token.to_string());
    }

    /// Script a successful code exchange.
    pub fn script_exchange(&self, code: &str, response: TokenExchangeResponse) {
        self.exchange_responses
            .lock()
            .unwrap()
            .insert(code.to_string(), response);
    }

    /// Make the given listing page fail (1-indexed).
    pub fn fail_on_page(&self, page: u32) {
        *self.fail_on_page.lock().unwrap() = Some(page);
    }

    pub fn refresh_call_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn list_call_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StravaApi for MockStrava {
    async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, AppError> {
        self.exchange_responses
            .lock()
            .unwrap()
            .get(code)
            .cloned()
            .ok_or_else(|| AppError::StravaApi("HTTP 400 Bad Request: bad code".to_string()))
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRefreshResponse, AppError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);

        if self
            .failing_refresh_tokens
            .lock()
            .unwrap()
            .contains(refresh_token)
        {
            return Err(AppError::StravaApi(
                "HTTP 400 Bad Request: invalid_grant".to_string(),
            ));
        }

        self.refresh_responses
            .lock()
            .unwrap()
            .get(refresh_token)
            .cloned()
            .ok_or_else(|| AppError::StravaApi("refresh not scripted".to_string()))
    }

    async fn list_activities(
        &self,
        _access_token: &str,
        after: Option<i64>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<StravaActivity>, AppError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        if *self.fail_on_page.lock().unwrap() == Some(page) {
            return Err(AppError::FetchFailed {
                status: 500,
                body: "simulated provider failure".to_string(),
            });
        }

        let all: Vec<StravaActivity> = self
            .activities
            .lock()
            .unwrap()
            .iter()
            .filter(|a| {
                after.is_none_or(|after| {
                    chrono::DateTime::parse_from_rfc3339(&a.start_date)
                        .map(|dt| dt.timestamp() > after)
                        .unwrap_or(true)
                })
            })
            .cloned()
            .collect();

        let start = ((page - 1) * per_page) as usize;
        let end = (start + per_page as usize).min(all.len());
        if start >= all.len() {
            return Ok(Vec::new());
        }
        Ok(all[start..end].to_vec())
    }
}

// ─── Fixtures ────────────────────────────────────────────────

/// Credential whose token strings are derived from the athlete ID.
#[allow(dead_code)]
pub fn credential(athlete_id: u64, expires_at: i64) -> AthleteCredential {
    AthleteCredential {
        athlete_id,
        access_token: format!("access-{}", athlete_id),
        refresh_token: format!("refresh-{}", athlete_id),
        expires_at,
        email: None,
        firstname: Some("Test".to_string()),
        lastname: Some("Athlete".to_string()),
        updated_at: "2026-01-01T00:00:00Z".to_string(),
    }
}

/// A refresh response rotating all three token fields.
#[allow(dead_code)]
pub fn refreshed_tokens(athlete_id: u64) -> TokenRefreshResponse {
    TokenRefreshResponse {
        access_token: format!("new-access-{}", athlete_id),
        refresh_token: format!("new-refresh-{}", athlete_id),
        expires_at: Utc::now().timestamp() + 6 * 3600,
    }
}

/// A token-exchange response for the OAuth callback flow.
#[allow(dead_code)]
pub fn exchange_response(athlete_id: u64) -> TokenExchangeResponse {
    TokenExchangeResponse {
        access_token: format!("access-{}", athlete_id),
        refresh_token: format!("refresh-{}", athlete_id),
        expires_at: Utc::now().timestamp() + 6 * 3600,
        athlete: StravaAthlete {
            id: athlete_id,
            firstname: Some("Marta".to_string()),
            lastname: Some("Ruiz".to_string()),
            email: None,
        },
    }
}

/// Raw listing entry with plausible ride numbers.
#[allow(dead_code)]
pub fn raw_activity(id: u64, start_date: &str) -> StravaActivity {
    StravaActivity {
        id,
        name: format!("Ride {}", id),
        sport_type: "Ride".to_string(),
        start_date: start_date.to_string(),
        timezone: Some("(GMT+01:00) Europe/Madrid".to_string()),
        description: None,
        distance: 30_000.0,
        moving_time: 3_600,
        elapsed_time: 4_000,
        total_elevation_gain: 350.0,
        average_heartrate: Some(145.0),
        max_heartrate: Some(172.0),
        average_speed: Some(8.3),
        max_speed: Some(15.0),
        average_watts: None,
    }
}

/// Epoch seconds one hour from now (a still-valid expiry).
#[allow(dead_code)]
pub fn future_expiry() -> i64 {
    Utc::now().timestamp() + 3600
}

/// Epoch seconds one hour ago (an expired token).
#[allow(dead_code)]
pub fn past_expiry() -> i64 {
    Utc::now().timestamp() - 3600
}

/// Build an `AppState` over the in-memory store and the Strava mock.
#[allow(dead_code)]
pub fn build_state(policy: RetentionPolicy) -> (Arc<AppState>, Arc<MemoryDb>, Arc<MockStrava>) {
    let mut config = Config::test_default();
    config.retention_policy = policy;

    let db = Arc::new(MemoryDb::new());
    let strava = Arc::new(MockStrava::new());

    let state = Arc::new(AppState::new(
        config,
        db.clone(),
        db.clone(),
        db.clone(),
        db.clone(),
        strava.clone(),
    ));

    (state, db, strava)
}

/// Create a test app router with in-memory dependencies.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryDb>, Arc<MockStrava>) {
    let (state, db, strava) = build_state(RetentionPolicy::KeepAll);
    (create_router(state.clone()), state, db, strava)
}
