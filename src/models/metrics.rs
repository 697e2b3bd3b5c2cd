//! Training-load metric models.

use serde::{Deserialize, Serialize};

/// Daily training-load row (`training_metrics`), keyed by `(athlete_id, date)`.
///
/// When several activities fall on the same calendar day their loads are
/// summed; recomputation with unchanged inputs writes identical values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedMetric {
    pub athlete_id: u64,
    /// Calendar day, `YYYY-MM-DD`
    pub date: String,
    /// Banister-style training impulse
    pub trimp: f64,
    /// Simplified Training Stress Score
    pub tss: f64,
    /// Session RPE load (rpe x elapsed minutes)
    pub rpe_load: f64,
    /// Daily distance total, km
    pub total_distance_km: f64,
    /// Daily elapsed-time total, minutes
    pub total_time_min: f64,
    /// Daily elevation total, meters
    pub total_elevation_m: f64,
    /// Last write timestamp (RFC3339)
    pub updated_at: String,
}

/// Physiological profile (`athlete_profiles` row, read-only here).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthleteProfile {
    pub athlete_id: u64,
    /// Resting heart rate, bpm
    pub resting_hr: f64,
    /// Max heart rate, bpm
    pub max_hr: f64,
    /// Functional threshold power, watts
    pub ftp: f64,
}

impl AthleteProfile {
    /// Team-default profile used when an athlete has no stored row yet.
    pub fn fallback(athlete_id: u64) -> Self {
        Self {
            athlete_id,
            resting_hr: 60.0,
            max_hr: 180.0,
            ftp: 250.0,
        }
    }
}
