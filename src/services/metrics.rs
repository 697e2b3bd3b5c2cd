// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training-load computation.
//!
//! Computes TRIMP, TSS, and RPE load per activity and aggregates them into
//! one stored row per calendar day. Activities sharing a day are summed in
//! chronological order; recomputation with unchanged inputs writes
//! identical values.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::anyhow;

use crate::db::MetricStore;
use crate::error::AppError;
use crate::models::{Activity, AthleteProfile, DerivedMetric};
use crate::time_utils::{day_of, format_utc_rfc3339};

/// Neutral session-RPE midpoint used when the athlete entered none.
const DEFAULT_RPE: f64 = 5.0;

/// Load scores for a single activity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityLoad {
    pub trimp: f64,
    pub tss: f64,
    pub rpe_load: f64,
}

/// Computes and persists daily training-load rows.
pub struct MetricsEngine {
    metrics: Arc<dyn MetricStore>,
}

impl MetricsEngine {
    pub fn new(metrics: Arc<dyn MetricStore>) -> Self {
        Self { metrics }
    }

    /// Compute daily metrics for the given activities and upsert them
    /// keyed by `(athlete_id, date)`. Returns the rows in date order.
    pub async fn compute_and_store(
        &self,
        athlete_id: u64,
        activities: &[Activity],
        profile: &AthleteProfile,
    ) -> Result<Vec<DerivedMetric>, AppError> {
        validate_profile(athlete_id, profile)?;

        let now = format_utc_rfc3339(chrono::Utc::now());

        // Chronological within each day so aggregation order is fixed
        let mut ordered: Vec<&Activity> = activities.iter().collect();
        ordered.sort_by(|a, b| a.start_date.cmp(&b.start_date));

        let mut days: BTreeMap<String, DerivedMetric> = BTreeMap::new();

        for activity in ordered {
            let date = day_of(&activity.start_date).ok_or_else(|| {
                AppError::Internal(anyhow!(
                    "Malformed start_date {:?} on stored activity {}",
                    activity.start_date,
                    activity.strava_id
                ))
            })?;

            let load = activity_load(activity, profile);

            let entry = days.entry(date.clone()).or_insert_with(|| DerivedMetric {
                athlete_id,
                date,
                trimp: 0.0,
                tss: 0.0,
                rpe_load: 0.0,
                total_distance_km: 0.0,
                total_time_min: 0.0,
                total_elevation_m: 0.0,
                updated_at: now.clone(),
            });

            entry.trimp += load.trimp;
            entry.tss += load.tss;
            entry.rpe_load += load.rpe_load;
            entry.total_distance_km += activity.distance_km;
            entry.total_time_min += activity.elapsed_time_s as f64 / 60.0;
            entry.total_elevation_m += activity.elevation_gain_m;
        }

        for metric in days.values() {
            self.metrics.upsert_metric(metric).await?;
        }

        tracing::info!(athlete_id, days = days.len(), "Training metrics stored");
        Ok(days.into_values().collect())
    }
}

/// Reject profiles the formulas cannot support.
fn validate_profile(athlete_id: u64, profile: &AthleteProfile) -> Result<(), AppError> {
    if profile.max_hr - profile.resting_hr <= 0.0 || profile.ftp <= 0.0 {
        return Err(AppError::InvalidProfile(athlete_id));
    }
    Ok(())
}

/// Load scores for one activity.
///
/// A missing average heart rate substitutes the resting rate, which zeroes
/// the heart-rate-driven scores for that activity. That substitution is a
/// fixed rule of the score definitions, not a data repair.
pub fn activity_load(activity: &Activity, profile: &AthleteProfile) -> ActivityLoad {
    let duration_h = activity.elapsed_time_s as f64 / 3600.0;
    let elapsed_min = activity.elapsed_time_s as f64 / 60.0;

    let avg_hr = activity.average_heartrate.unwrap_or(profile.resting_hr);
    let intensity =
        ((avg_hr - profile.resting_hr) / (profile.max_hr - profile.resting_hr)).max(0.0);

    let trimp = duration_h * intensity * 100.0;

    // Measured power wins; otherwise estimate from intensity
    let normalized_power = activity
        .average_power
        .unwrap_or(profile.ftp * intensity);
    let tss = duration_h * normalized_power * intensity / profile.ftp * 100.0;

    let rpe = activity.rpe.unwrap_or(DEFAULT_RPE);
    let rpe_load = rpe * elapsed_min;

    ActivityLoad {
        trimp,
        tss,
        rpe_load,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> AthleteProfile {
        AthleteProfile {
            athlete_id: 7,
            resting_hr: 60.0,
            max_hr: 180.0,
            ftp: 250.0,
        }
    }

    fn activity(elapsed_s: i64, avg_hr: Option<f64>) -> Activity {
        Activity {
            athlete_id: 7,
            strava_id: 1,
            name: "Ride".to_string(),
            sport_type: "Ride".to_string(),
            start_date: "2026-08-01T07:00:00Z".to_string(),
            timezone: None,
            description: None,
            distance_m: 30_000.0,
            distance_km: 30.0,
            moving_time_s: elapsed_s,
            elapsed_time_s: elapsed_s,
            moving_time_hm: "1h 00min".to_string(),
            elapsed_time_hm: "1h 00min".to_string(),
            elevation_gain_m: 200.0,
            average_heartrate: avg_hr,
            max_heartrate: None,
            average_speed_ms: None,
            max_speed_ms: None,
            average_speed_kmh: None,
            pace_min_km: None,
            average_power: None,
            rpe: None,
            updated_at: "2026-08-01T10:00:00Z".to_string(),
        }
    }

    #[test]
    fn load_formulas_are_deterministic() {
        // intensity = (150-60)/(180-60) = 0.75
        let load = activity_load(&activity(3_600, Some(150.0)), &profile());
        assert_eq!(load.trimp, 75.0);
        // np = 250 * 0.75 = 187.5; tss = 1 * 187.5 * 0.75 / 250 * 100
        assert_eq!(load.tss, 56.25);
        assert_eq!(load.rpe_load, 5.0 * 60.0);

        let again = activity_load(&activity(3_600, Some(150.0)), &profile());
        assert_eq!(load, again);
    }

    #[test]
    fn missing_heart_rate_zeroes_hr_scores() {
        let load = activity_load(&activity(3_600, None), &profile());
        assert_eq!(load.trimp, 0.0);
        assert_eq!(load.tss, 0.0);
        // RPE load still accrues from duration
        assert_eq!(load.rpe_load, 300.0);
    }

    #[test]
    fn below_resting_heart_rate_clamps_to_zero() {
        let load = activity_load(&activity(3_600, Some(50.0)), &profile());
        assert_eq!(load.trimp, 0.0);
        assert_eq!(load.tss, 0.0);
    }

    #[test]
    fn measured_power_takes_precedence() {
        let mut a = activity(3_600, Some(150.0));
        a.average_power = Some(300.0);
        let load = activity_load(&a, &profile());
        // tss = 1 * 300 * 0.75 / 250 * 100
        assert_eq!(load.tss, 90.0);
    }

    #[test]
    fn athlete_rpe_overrides_default() {
        let mut a = activity(1_800, Some(150.0));
        a.rpe = Some(8.0);
        let load = activity_load(&a, &profile());
        assert_eq!(load.rpe_load, 8.0 * 30.0);
    }

    #[test]
    fn zero_span_profile_is_rejected() {
        let mut p = profile();
        p.max_hr = p.resting_hr;
        assert!(matches!(
            validate_profile(7, &p),
            Err(AppError::InvalidProfile(7))
        ));
    }

    #[test]
    fn zero_ftp_profile_is_rejected() {
        let mut p = profile();
        p.ftp = 0.0;
        assert!(matches!(
            validate_profile(7, &p),
            Err(AppError::InvalidProfile(7))
        ));
    }
}
