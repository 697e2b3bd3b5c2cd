// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Store contracts for the three writable tables plus the read-only
//! profiles table.
//!
//! All persistence goes through these traits; no component writes a table
//! directly. The production implementation is [`crate::db::SupabaseDb`];
//! tests inject [`crate::db::MemoryDb`].

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Activity, AthleteCredential, AthleteProfile, DerivedMetric};

/// Filters for activity reads. All fields combine with AND; results are
/// ordered by `start_date` descending.
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub sport_type: Option<String>,
    /// Inclusive lower bound on `start_date`
    pub from: Option<String>,
    /// Inclusive upper bound on `start_date`
    pub to: Option<String>,
    pub limit: Option<u32>,
}

/// Filters for metric reads; results are ordered by `date` descending.
#[derive(Debug, Clone, Default)]
pub struct MetricFilter {
    /// Inclusive lower bound on `date`
    pub from: Option<String>,
    /// Inclusive upper bound on `date`
    pub to: Option<String>,
    pub limit: Option<u32>,
}

/// Persistent mapping of athlete identity to OAuth credential state.
///
/// Rows are unique per `athlete_id`; this is the only conflict target.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get_credential(&self, athlete_id: u64) -> Result<Option<AthleteCredential>>;

    /// Secondary lookup by email. Never used as an upsert key.
    async fn find_credential_by_email(&self, email: &str) -> Result<Option<AthleteCredential>>;

    /// All stored credentials, ordered by `athlete_id`.
    async fn all_credentials(&self) -> Result<Vec<AthleteCredential>>;

    /// Insert or replace the row for `credential.athlete_id`, stamping
    /// `updated_at` with the current time.
    async fn upsert_credential(&self, credential: &AthleteCredential) -> Result<()>;
}

/// Persistent activity table, unique per `(athlete_id, strava_id)`.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Insert or replace one row; all fields are written together.
    async fn upsert_activity(&self, activity: &Activity) -> Result<()>;

    async fn get_activities(
        &self,
        athlete_id: u64,
        filter: &ActivityFilter,
    ) -> Result<Vec<Activity>>;

    /// Delete this athlete's activities with `start_date` strictly earlier
    /// than `cutoff`. Returns the number of deleted rows.
    async fn delete_activities_before(&self, athlete_id: u64, cutoff: &str) -> Result<u64>;
}

/// Persistent daily training-load table, unique per `(athlete_id, date)`.
#[async_trait]
pub trait MetricStore: Send + Sync {
    async fn upsert_metric(&self, metric: &DerivedMetric) -> Result<()>;

    async fn get_metrics(
        &self,
        athlete_id: u64,
        filter: &MetricFilter,
    ) -> Result<Vec<DerivedMetric>>;
}

/// Read-only access to athlete physiological profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, athlete_id: u64) -> Result<Option<AthleteProfile>>;
}
