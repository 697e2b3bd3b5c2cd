// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity reconciliation.
//!
//! Merges a fetched activity batch into the persisted table:
//! 1. Derive display fields (km, km/h, pace, duration strings)
//! 2. Upsert by `(athlete_id, strava_id)`, skipping rows whose content is
//!    unchanged so repeated passes leave the table byte-identical
//! 3. Optionally prune history older than the batch (retention policy)
//!
//! Row failures are collected and reported; they never abort the batch.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::db::{ActivityFilter, ActivityStore};
use crate::error::AppError;
use crate::models::Activity;
use crate::services::strava::StravaActivity;
use crate::time_utils::{format_minutes, format_utc_rfc3339};

/// What happens to stored activities older than the fetched batch.
///
/// Chosen once at startup and applied to every athlete; the two variants
/// are never mixed per athlete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Append-only: every activity ever seen stays stored.
    KeepAll,
    /// After upserting a batch, delete this athlete's rows with
    /// `start_date` strictly earlier than the oldest row the batch
    /// committed. Bounds the table to "last N fetched", which destroys
    /// history the fetch window no longer covers, including activities
    /// missed by a transient gap. The cutoff comes only from rows this
    /// batch actually wrote, never from concurrent passes.
    PruneBeforeBatch,
}

/// One activity row that failed to persist.
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    pub strava_id: u64,
    pub detail: String,
}

/// Outcome of one reconcile call.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    /// Rows written (new or changed)
    pub stored: usize,
    /// Rows skipped because the stored content already matched
    pub unchanged: usize,
    /// Rows deleted by the retention policy
    pub pruned: u64,
    /// Per-row persistence failures
    pub failures: Vec<RowFailure>,
}

/// Merges fetched activities into the persisted activity table.
pub struct ActivityReconciler {
    store: Arc<dyn ActivityStore>,
    policy: RetentionPolicy,
}

impl ActivityReconciler {
    pub fn new(store: Arc<dyn ActivityStore>, policy: RetentionPolicy) -> Self {
        Self { store, policy }
    }

    /// Upsert the batch for one athlete and apply the retention policy.
    pub async fn reconcile(
        &self,
        athlete_id: u64,
        raw: &[StravaActivity],
    ) -> Result<ReconcileReport, AppError> {
        let now = format_utc_rfc3339(chrono::Utc::now());

        // One read up front so unchanged rows can be skipped without a write.
        let existing: HashMap<u64, Activity> = self
            .store
            .get_activities(athlete_id, &ActivityFilter::default())
            .await?
            .into_iter()
            .map(|a| (a.strava_id, a))
            .collect();

        let mut stored = 0usize;
        let mut unchanged = 0usize;
        let mut failures = Vec::new();
        // Oldest start_date among rows this batch has committed (kept or
        // written); prune keys off this, never off the raw batch.
        let mut committed_min: Option<String> = None;

        for item in raw {
            let activity = build_activity(athlete_id, item, &now);

            if let Some(prev) = existing.get(&activity.strava_id) {
                if same_content(prev, &activity) {
                    unchanged += 1;
                    track_min(&mut committed_min, &activity.start_date);
                    continue;
                }
            }

            match self.store.upsert_activity(&activity).await {
                Ok(()) => {
                    stored += 1;
                    track_min(&mut committed_min, &activity.start_date);
                }
                Err(e) => {
                    tracing::warn!(
                        athlete_id,
                        strava_id = activity.strava_id,
                        error = %e,
                        "Failed to store activity, continuing batch"
                    );
                    failures.push(RowFailure {
                        strava_id: activity.strava_id,
                        detail: e.to_string(),
                    });
                }
            }
        }

        let pruned = match (self.policy, &committed_min) {
            (RetentionPolicy::PruneBeforeBatch, Some(cutoff)) => {
                self.store
                    .delete_activities_before(athlete_id, cutoff)
                    .await?
            }
            _ => 0,
        };

        if pruned > 0 {
            tracing::info!(athlete_id, pruned, "Pruned activities older than batch");
        }

        Ok(ReconcileReport {
            stored,
            unchanged,
            pruned,
            failures,
        })
    }
}

fn track_min(min: &mut Option<String>, start_date: &str) {
    if min.as_deref().is_none_or(|m| start_date < m) {
        *min = Some(start_date.to_string());
    }
}

/// True when the stored row already carries exactly this content
/// (everything except the write timestamp).
fn same_content(prev: &Activity, next: &Activity) -> bool {
    let mut prev = prev.clone();
    prev.updated_at = next.updated_at.clone();
    prev == *next
}

/// Build the stored row from a raw listing entry.
///
/// Meters, seconds, and m/s stay canonical; km, km/h, pace, and the
/// duration strings are derived here and nowhere else.
fn build_activity(athlete_id: u64, raw: &StravaActivity, now: &str) -> Activity {
    Activity {
        athlete_id,
        strava_id: raw.id,
        name: raw.name.clone(),
        sport_type: raw.sport_type.clone(),
        start_date: raw.start_date.clone(),
        timezone: raw.timezone.clone(),
        description: raw.description.clone(),
        distance_m: raw.distance,
        distance_km: round2(raw.distance / 1000.0),
        moving_time_s: raw.moving_time,
        elapsed_time_s: raw.elapsed_time,
        moving_time_hm: format_minutes(raw.moving_time as f64 / 60.0),
        elapsed_time_hm: format_minutes(raw.elapsed_time as f64 / 60.0),
        elevation_gain_m: raw.total_elevation_gain,
        average_heartrate: raw.average_heartrate,
        max_heartrate: raw.max_heartrate,
        average_speed_ms: raw.average_speed,
        max_speed_ms: raw.max_speed,
        average_speed_kmh: raw.average_speed.map(|v| round2(v * 3.6)),
        pace_min_km: raw
            .average_speed
            .filter(|v| *v > 0.0)
            .map(|v| round2(1000.0 / v / 60.0)),
        average_power: raw.average_watts,
        rpe: None,
        updated_at: now.to_string(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
