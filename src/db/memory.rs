// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory store implementation.
//!
//! Backs the integration tests and local development without a Supabase
//! project. Implements the same contracts as [`crate::db::SupabaseDb`],
//! including ordering and filter semantics.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::db::store::{
    ActivityFilter, ActivityStore, CredentialStore, MetricFilter, MetricStore, ProfileStore,
};
use crate::error::AppError;
use crate::models::{Activity, AthleteCredential, AthleteProfile, DerivedMetric};
use crate::time_utils::format_utc_rfc3339;

/// In-memory database with the same semantics as the Supabase tables.
#[derive(Default)]
pub struct MemoryDb {
    credentials: DashMap<u64, AthleteCredential>,
    activities: DashMap<(u64, u64), Activity>,
    metrics: DashMap<(u64, String), DerivedMetric>,
    profiles: DashMap<u64, AthleteProfile>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile row (the profiles table is read-only to the service).
    pub fn insert_profile(&self, profile: AthleteProfile) {
        self.profiles.insert(profile.athlete_id, profile);
    }

    /// Total stored activity rows across all athletes.
    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryDb {
    async fn get_credential(&self, athlete_id: u64) -> Result<Option<AthleteCredential>, AppError> {
        Ok(self.credentials.get(&athlete_id).map(|c| c.clone()))
    }

    async fn find_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AthleteCredential>, AppError> {
        Ok(self
            .credentials
            .iter()
            .find(|c| c.email.as_deref() == Some(email))
            .map(|c| c.clone()))
    }

    async fn all_credentials(&self) -> Result<Vec<AthleteCredential>, AppError> {
        let mut all: Vec<AthleteCredential> =
            self.credentials.iter().map(|c| c.clone()).collect();
        all.sort_by_key(|c| c.athlete_id);
        Ok(all)
    }

    async fn upsert_credential(&self, credential: &AthleteCredential) -> Result<(), AppError> {
        let mut row = credential.clone();
        row.updated_at = format_utc_rfc3339(chrono::Utc::now());
        self.credentials.insert(row.athlete_id, row);
        Ok(())
    }
}

#[async_trait]
impl ActivityStore for MemoryDb {
    async fn upsert_activity(&self, activity: &Activity) -> Result<(), AppError> {
        self.activities
            .insert((activity.athlete_id, activity.strava_id), activity.clone());
        Ok(())
    }

    async fn get_activities(
        &self,
        athlete_id: u64,
        filter: &ActivityFilter,
    ) -> Result<Vec<Activity>, AppError> {
        let mut rows: Vec<Activity> = self
            .activities
            .iter()
            .filter(|a| a.athlete_id == athlete_id)
            .filter(|a| {
                filter
                    .sport_type
                    .as_deref()
                    .is_none_or(|s| a.sport_type == s)
            })
            .filter(|a| filter.from.as_deref().is_none_or(|f| a.start_date.as_str() >= f))
            .filter(|a| filter.to.as_deref().is_none_or(|t| a.start_date.as_str() <= t))
            .map(|a| a.clone())
            .collect();

        rows.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        if let Some(limit) = filter.limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    async fn delete_activities_before(
        &self,
        athlete_id: u64,
        cutoff: &str,
    ) -> Result<u64, AppError> {
        let before = self.activities.len();
        self.activities
            .retain(|_, a| !(a.athlete_id == athlete_id && a.start_date.as_str() < cutoff));
        Ok((before - self.activities.len()) as u64)
    }
}

#[async_trait]
impl MetricStore for MemoryDb {
    async fn upsert_metric(&self, metric: &DerivedMetric) -> Result<(), AppError> {
        self.metrics
            .insert((metric.athlete_id, metric.date.clone()), metric.clone());
        Ok(())
    }

    async fn get_metrics(
        &self,
        athlete_id: u64,
        filter: &MetricFilter,
    ) -> Result<Vec<DerivedMetric>, AppError> {
        let mut rows: Vec<DerivedMetric> = self
            .metrics
            .iter()
            .filter(|m| m.athlete_id == athlete_id)
            .filter(|m| filter.from.as_deref().is_none_or(|f| m.date.as_str() >= f))
            .filter(|m| filter.to.as_deref().is_none_or(|t| m.date.as_str() <= t))
            .map(|m| m.clone())
            .collect();

        rows.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = filter.limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }
}

#[async_trait]
impl ProfileStore for MemoryDb {
    async fn get_profile(&self, athlete_id: u64) -> Result<Option<AthleteProfile>, AppError> {
        Ok(self.profiles.get(&athlete_id).map(|p| p.clone()))
    }
}
