// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod fetcher;
pub mod metrics;
pub mod reconcile;
pub mod strava;
pub mod sync;
pub mod token;

pub use fetcher::ActivityFetcher;
pub use metrics::MetricsEngine;
pub use reconcile::{ActivityReconciler, ReconcileReport, RetentionPolicy};
pub use strava::{StravaApi, StravaClient};
pub use sync::{SyncOrchestrator, SyncReport, SyncStatus};
pub use token::TokenRefresher;
