// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes: sync/metric triggers and dashboard reads.

use crate::db::{ActivityFilter, ActivityStore, MetricFilter, MetricStore, ProfileStore};
use crate::error::{AppError, Result};
use crate::models::{Activity, AthleteProfile, DerivedMetric};
use crate::services::sync::{RefreshReport, SyncReport};
use crate::time_utils::format_minutes;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_ACTIVITIES_LIMIT: u32 = 20;
const DEFAULT_METRICS_LIMIT: u32 = 30;
/// How many recent activities feed one metric recomputation.
const DEFAULT_METRICS_WINDOW: u32 = 10;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/sync", post(trigger_sync))
        .route("/api/refresh", post(trigger_refresh))
        .route("/api/metrics/{athlete_id}", post(compute_metrics))
        .route("/api/activities", get(get_activities))
        .route("/api/metrics", get(get_metrics))
        .route("/api/stats/week", get(get_week_stats))
}

// ─── Triggers ────────────────────────────────────────────────

/// Run one full sync pass over every connected athlete.
///
/// Always returns the per-athlete breakdown, also when some athletes
/// failed; callers must inspect the list, not just the status code.
async fn trigger_sync(State(state): State<Arc<AppState>>) -> Result<Json<SyncReport>> {
    Ok(Json(state.orchestrator.run_sync_pass().await?))
}

/// Refresh exactly the expired credentials (cron entry point).
async fn trigger_refresh(State(state): State<Arc<AppState>>) -> Result<Json<RefreshReport>> {
    Ok(Json(state.orchestrator.run_refresh_pass().await?))
}

#[derive(Deserialize)]
struct ComputeMetricsQuery {
    /// How many recent activities to recompute over
    limit: Option<u32>,
}

/// Recompute and store daily training metrics for one athlete.
async fn compute_metrics(
    State(state): State<Arc<AppState>>,
    Path(athlete_id): Path<u64>,
    Query(query): Query<ComputeMetricsQuery>,
) -> Result<Json<Vec<DerivedMetric>>> {
    let filter = ActivityFilter {
        limit: Some(query.limit.unwrap_or(DEFAULT_METRICS_WINDOW)),
        ..Default::default()
    };
    let activities = state.activities.get_activities(athlete_id, &filter).await?;

    let profile = state
        .profiles
        .get_profile(athlete_id)
        .await?
        .unwrap_or_else(|| AthleteProfile::fallback(athlete_id));

    let rows = state
        .metrics_engine
        .compute_and_store(athlete_id, &activities, &profile)
        .await?;

    Ok(Json(rows))
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ActivitiesQuery {
    athlete_id: Option<u64>,
    sport_type: Option<String>,
    /// Filter by start date (inclusive, RFC3339 or YYYY-MM-DD)
    from: Option<String>,
    to: Option<String>,
    limit: Option<u32>,
}

#[derive(Serialize)]
struct ActivitiesResponse {
    total: usize,
    data: Vec<Activity>,
}

/// Filtered activity read, newest first.
async fn get_activities(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActivitiesQuery>,
) -> Result<Json<ActivitiesResponse>> {
    let athlete_id = query
        .athlete_id
        .ok_or_else(|| AppError::BadRequest("Missing 'athlete_id' parameter".to_string()))?;

    let filter = ActivityFilter {
        sport_type: query.sport_type,
        from: query.from,
        to: query.to,
        limit: Some(query.limit.unwrap_or(DEFAULT_ACTIVITIES_LIMIT)),
    };

    let data = state.activities.get_activities(athlete_id, &filter).await?;

    Ok(Json(ActivitiesResponse {
        total: data.len(),
        data,
    }))
}

// ─── Metrics ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct MetricsQuery {
    athlete_id: Option<u64>,
    /// Filter by date (inclusive, YYYY-MM-DD)
    from: Option<String>,
    to: Option<String>,
    limit: Option<u32>,
}

#[derive(Serialize)]
struct MetricsSummary {
    total_days: usize,
    total_tss: f64,
    total_trimp: f64,
    total_time_hours: f64,
    total_distance_km: f64,
    total_elevation_m: f64,
}

#[derive(Serialize)]
struct MetricsResponse {
    summary: MetricsSummary,
    data: Vec<DerivedMetric>,
}

/// Daily metric rows plus quick totals over the selected range.
async fn get_metrics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<MetricsResponse>> {
    let athlete_id = query
        .athlete_id
        .ok_or_else(|| AppError::BadRequest("Missing 'athlete_id' parameter".to_string()))?;

    let filter = MetricFilter {
        from: query.from,
        to: query.to,
        limit: Some(query.limit.unwrap_or(DEFAULT_METRICS_LIMIT)),
    };

    let data = state.metrics.get_metrics(athlete_id, &filter).await?;

    let summary = MetricsSummary {
        total_days: data.len(),
        total_tss: round2(data.iter().map(|d| d.tss).sum()),
        total_trimp: round2(data.iter().map(|d| d.trimp).sum()),
        total_time_hours: round2(data.iter().map(|d| d.total_time_min).sum::<f64>() / 60.0),
        total_distance_km: round2(data.iter().map(|d| d.total_distance_km).sum()),
        total_elevation_m: round2(data.iter().map(|d| d.total_elevation_m).sum()),
    };

    Ok(Json(MetricsResponse { summary, data }))
}

// ─── Weekly Stats ────────────────────────────────────────────

#[derive(Deserialize)]
struct WeekStatsQuery {
    athlete_id: Option<u64>,
}

#[derive(Serialize)]
struct WeekRange {
    from: String,
    to: String,
}

#[derive(Serialize)]
struct WeekTotals {
    activities: usize,
    distance_km: f64,
    elevation_m: f64,
    time: String,
}

#[derive(Serialize)]
struct WeekActivity {
    name: String,
    distance_km: f64,
    elevation_m: f64,
    time: String,
}

#[derive(Serialize)]
struct WeekStatsResponse {
    week_range: WeekRange,
    totals: WeekTotals,
    latest: Vec<WeekActivity>,
}

/// Monday-to-Sunday summary of the current week plus the three most
/// recent activities in it.
async fn get_week_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeekStatsQuery>,
) -> Result<Json<WeekStatsResponse>> {
    let athlete_id = query
        .athlete_id
        .ok_or_else(|| AppError::BadRequest("Missing 'athlete_id' parameter".to_string()))?;

    let today = Utc::now().date_naive();
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    let sunday = monday + Duration::days(6);

    let filter = ActivityFilter {
        from: Some(monday.to_string()),
        // End-of-day bound so Sunday's activities are included
        to: Some(format!("{}T23:59:59Z", sunday)),
        ..Default::default()
    };

    let activities = state.activities.get_activities(athlete_id, &filter).await?;

    let total_minutes: f64 = activities
        .iter()
        .map(|a| a.moving_time_s as f64 / 60.0)
        .sum();

    let totals = WeekTotals {
        activities: activities.len(),
        distance_km: round2(activities.iter().map(|a| a.distance_km).sum()),
        elevation_m: round2(activities.iter().map(|a| a.elevation_gain_m).sum()),
        time: format_minutes(total_minutes),
    };

    let latest = activities
        .iter()
        .take(3)
        .map(|a| WeekActivity {
            name: a.name.clone(),
            distance_km: a.distance_km,
            elevation_m: a.elevation_gain_m,
            time: a.moving_time_hm.clone(),
        })
        .collect();

    Ok(Json(WeekStatsResponse {
        week_range: WeekRange {
            from: monday.to_string(),
            to: sunday.to_string(),
        },
        totals,
        latest,
    }))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
