// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Alameda-Sync: training dashboard backend for the Alameda team
//!
//! This crate keeps each athlete's Strava credential fresh, syncs their
//! activities into Supabase, computes daily training-load metrics, and
//! serves the dashboard's read endpoints.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use db::{ActivityStore, CredentialStore, MetricStore, ProfileStore};
use services::strava::StravaApi;
use services::{
    ActivityFetcher, ActivityReconciler, MetricsEngine, SyncOrchestrator, TokenRefresher,
};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub credentials: Arc<dyn CredentialStore>,
    pub activities: Arc<dyn ActivityStore>,
    pub metrics: Arc<dyn MetricStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub strava: Arc<dyn StravaApi>,
    pub orchestrator: SyncOrchestrator,
    pub metrics_engine: MetricsEngine,
}

impl AppState {
    /// Wire the engines onto the injected store and provider handles.
    pub fn new(
        config: Config,
        credentials: Arc<dyn CredentialStore>,
        activities: Arc<dyn ActivityStore>,
        metrics: Arc<dyn MetricStore>,
        profiles: Arc<dyn ProfileStore>,
        strava: Arc<dyn StravaApi>,
    ) -> Self {
        let refresher = TokenRefresher::new(strava.clone(), credentials.clone());
        let fetcher = ActivityFetcher::new(strava.clone(), config.sync_per_page);
        let reconciler = ActivityReconciler::new(activities.clone(), config.retention_policy);
        let orchestrator = SyncOrchestrator::new(
            credentials.clone(),
            refresher,
            fetcher,
            reconciler,
            config.sync_lookback_days,
        );
        let metrics_engine = MetricsEngine::new(metrics.clone());

        Self {
            config,
            credentials,
            activities,
            metrics,
            profiles,
            strava,
            orchestrator,
            metrics_engine,
        }
    }
}
