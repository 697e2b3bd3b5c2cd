// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync pass orchestration.
//!
//! One pass walks every stored credential sequentially and runs
//! refresh -> fetch -> reconcile for each athlete. A failure at any stage
//! is recorded in that athlete's report entry and the pass moves on; one
//! athlete can never abort or skip the others.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;

use crate::db::CredentialStore;
use crate::error::AppError;
use crate::models::AthleteCredential;
use crate::services::fetcher::ActivityFetcher;
use crate::services::reconcile::{ActivityReconciler, RowFailure};
use crate::services::token::TokenRefresher;

/// Stage outcome for one athlete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Ok,
    RefreshFailed,
    FetchFailed,
    ReconcileFailed,
}

/// Per-athlete entry in the sync report.
#[derive(Debug, Clone, Serialize)]
pub struct AthleteSyncOutcome {
    pub athlete_id: u64,
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unchanged: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pruned: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub row_failures: Vec<RowFailure>,
}

impl AthleteSyncOutcome {
    fn failed(athlete_id: u64, status: SyncStatus, detail: String) -> Self {
        Self {
            athlete_id,
            status,
            detail: Some(detail),
            stored: None,
            unchanged: None,
            pruned: None,
            row_failures: Vec::new(),
        }
    }
}

/// Result of one full sync pass. `ok` is true only when every athlete
/// succeeded; callers must still inspect the per-athlete list.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub ok: bool,
    pub athletes: Vec<AthleteSyncOutcome>,
}

/// Result of a refresh-only pass over all credentials.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub updated_count: usize,
    pub updated_ids: Vec<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<RefreshFailure>,
}

/// One credential that could not be refreshed.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshFailure {
    pub athlete_id: u64,
    pub detail: String,
}

/// Drives the per-athlete sync pipeline across all known athletes.
pub struct SyncOrchestrator {
    credentials: Arc<dyn CredentialStore>,
    refresher: TokenRefresher,
    fetcher: ActivityFetcher,
    reconciler: ActivityReconciler,
    /// Fetch window: only activities starting within the last N days
    lookback_days: Option<i64>,
}

impl SyncOrchestrator {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        refresher: TokenRefresher,
        fetcher: ActivityFetcher,
        reconciler: ActivityReconciler,
        lookback_days: Option<i64>,
    ) -> Self {
        Self {
            credentials,
            refresher,
            fetcher,
            reconciler,
            lookback_days,
        }
    }

    /// Run one sync pass over every stored credential.
    ///
    /// Running the pass twice back-to-back with no new remote data leaves
    /// the store identical and reports zero written rows the second time.
    pub async fn run_sync_pass(&self) -> Result<SyncReport, AppError> {
        let credentials = self.credentials.all_credentials().await?;
        let after = self
            .lookback_days
            .map(|days| (Utc::now() - Duration::days(days)).timestamp());

        tracing::info!(athletes = credentials.len(), "Starting sync pass");

        let mut athletes = Vec::with_capacity(credentials.len());
        for credential in &credentials {
            athletes.push(self.sync_athlete(credential, after).await);
        }

        let ok = athletes.iter().all(|a| a.status == SyncStatus::Ok);
        tracing::info!(ok, athletes = athletes.len(), "Sync pass complete");

        Ok(SyncReport { ok, athletes })
    }

    /// Refresh-only pass: refresh exactly the expired credentials.
    pub async fn run_refresh_pass(&self) -> Result<RefreshReport, AppError> {
        let credentials = self.credentials.all_credentials().await?;
        let now = Utc::now().timestamp();

        let mut updated_ids = Vec::new();
        let mut failures = Vec::new();

        for credential in &credentials {
            if !credential.is_expired(now) {
                continue;
            }
            match self.refresher.ensure_valid(credential).await {
                Ok(_) => updated_ids.push(credential.athlete_id),
                Err(e) => {
                    tracing::warn!(
                        athlete_id = credential.athlete_id,
                        error = %e,
                        "Refresh failed, continuing with remaining athletes"
                    );
                    failures.push(RefreshFailure {
                        athlete_id: credential.athlete_id,
                        detail: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(updated = updated_ids.len(), "Refresh pass complete");

        Ok(RefreshReport {
            updated_count: updated_ids.len(),
            updated_ids,
            failures,
        })
    }

    /// One athlete's pipeline; every failure is converted into a report
    /// entry here so the pass-level loop never sees an error.
    async fn sync_athlete(
        &self,
        credential: &AthleteCredential,
        after: Option<i64>,
    ) -> AthleteSyncOutcome {
        let athlete_id = credential.athlete_id;

        let token = match self.refresher.ensure_valid(credential).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(athlete_id, error = %e, "Token refresh failed");
                return AthleteSyncOutcome::failed(
                    athlete_id,
                    SyncStatus::RefreshFailed,
                    e.to_string(),
                );
            }
        };

        let raw = match self.fetcher.fetch_activities(&token, after).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(athlete_id, error = %e, "Activity fetch failed");
                return AthleteSyncOutcome::failed(
                    athlete_id,
                    SyncStatus::FetchFailed,
                    e.to_string(),
                );
            }
        };

        match self.reconciler.reconcile(athlete_id, &raw).await {
            Ok(report) => AthleteSyncOutcome {
                athlete_id,
                status: SyncStatus::Ok,
                detail: None,
                stored: Some(report.stored),
                unchanged: Some(report.unchanged),
                pruned: Some(report.pruned),
                row_failures: report.failures,
            },
            Err(e) => {
                tracing::warn!(athlete_id, error = %e, "Reconciliation failed");
                AthleteSyncOutcome::failed(athlete_id, SyncStatus::ReconcileFailed, e.to_string())
            }
        }
    }
}
