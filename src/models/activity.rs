// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Stored activity model.
//!
//! Meters, seconds, and m/s as delivered by Strava are the canonical fields;
//! km, km/h, pace, and the human-readable duration strings are derived once
//! at reconcile time and only used for display.

use serde::{Deserialize, Serialize};

/// Stored activity record (`strava_activities` row).
///
/// One row per `(athlete_id, strava_id)`; repeated syncs upsert in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Strava athlete ID (owner)
    pub athlete_id: u64,
    /// Strava activity ID, immutable and unique per athlete
    pub strava_id: u64,
    /// Activity name/title
    pub name: String,
    /// Sport type (Ride, Run, Hike, etc.)
    pub sport_type: String,
    /// Start date/time (RFC3339, as delivered by the provider)
    pub start_date: String,
    /// Timezone label, e.g. "(GMT+01:00) Europe/Madrid"
    pub timezone: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// Distance in meters (canonical)
    pub distance_m: f64,
    /// Distance in kilometers (derived)
    pub distance_km: f64,
    /// Moving time in seconds (canonical)
    pub moving_time_s: i64,
    /// Elapsed time in seconds (canonical)
    pub elapsed_time_s: i64,
    /// Moving time as "1h 04min" (derived)
    pub moving_time_hm: String,
    /// Elapsed time as "1h 04min" (derived)
    pub elapsed_time_hm: String,
    /// Total elevation gain in meters
    pub elevation_gain_m: f64,
    /// Average heart rate, bpm
    pub average_heartrate: Option<f64>,
    /// Max heart rate, bpm
    pub max_heartrate: Option<f64>,
    /// Average speed in m/s (canonical)
    pub average_speed_ms: Option<f64>,
    /// Max speed in m/s (canonical)
    pub max_speed_ms: Option<f64>,
    /// Average speed in km/h (derived)
    pub average_speed_kmh: Option<f64>,
    /// Pace in minutes per km (derived)
    pub pace_min_km: Option<f64>,
    /// Average power in watts, when recorded
    pub average_power: Option<f64>,
    /// Athlete-entered perceived exertion, 0-10 scale
    pub rpe: Option<f64>,
    /// Last write timestamp (RFC3339)
    pub updated_at: String,
}
