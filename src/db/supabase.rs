// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supabase client wrapper with typed operations.
//!
//! Talks to the project's PostgREST endpoint (`/rest/v1`) using the
//! service-role key. Provides high-level operations for:
//! - Credentials (OAuth token state)
//! - Activities (synced Strava activities)
//! - Training metrics (daily load rows)
//! - Athlete profiles (read-only)

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::store::{
    ActivityFilter, ActivityStore, CredentialStore, MetricFilter, MetricStore, ProfileStore,
};
use crate::db::tables;
use crate::error::AppError;
use crate::models::{Activity, AthleteCredential, AthleteProfile, DerivedMetric};
use crate::time_utils::format_utc_rfc3339;

/// Supabase PostgREST database client.
#[derive(Clone)]
pub struct SupabaseDb {
    http: reqwest::Client,
    rest_url: String,
    service_key: String,
}

impl SupabaseDb {
    /// Create a new client for a Supabase project.
    ///
    /// `supabase_url` is the project base URL without a trailing slash;
    /// every call is bounded by `timeout`.
    pub fn new(
        supabase_url: &str,
        service_key: &str,
        timeout: std::time::Duration,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Database(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            rest_url: format!("{}/rest/v1", supabase_url),
            service_key: service_key.to_string(),
        })
    }

    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}/{}", self.rest_url, table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Generic filtered SELECT returning typed rows.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, AppError> {
        let response = self
            .request(reqwest::Method::GET, table)
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let response = check_response(response).await?;

        response
            .json()
            .await
            .map_err(|e| AppError::Database(format!("JSON parse error: {}", e)))
    }

    /// Upsert one row with an explicit conflict target.
    async fn upsert<T: Serialize>(
        &self,
        table: &str,
        on_conflict: &str,
        row: &T,
    ) -> Result<(), AppError> {
        let response = self
            .request(reqwest::Method::POST, table)
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        check_response(response).await?;
        Ok(())
    }

    /// Filtered DELETE returning the number of deleted rows.
    async fn delete_where(&self, table: &str, params: &[(&str, String)]) -> Result<u64, AppError> {
        let response = self
            .request(reqwest::Method::DELETE, table)
            .query(params)
            // return=representation so the deleted rows come back countable
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let response = check_response(response).await?;

        let deleted: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| AppError::Database(format!("JSON parse error: {}", e)))?;

        Ok(deleted.len() as u64)
    }
}

/// Check response status and return the response, or a database error.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Database(format!("HTTP {}: {}", status, body)))
}

// ─── Credential Operations ───────────────────────────────────

#[async_trait]
impl CredentialStore for SupabaseDb {
    async fn get_credential(&self, athlete_id: u64) -> Result<Option<AthleteCredential>, AppError> {
        let rows: Vec<AthleteCredential> = self
            .select(
                tables::CREDENTIALS,
                &[
                    ("athlete_id", format!("eq.{}", athlete_id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn find_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AthleteCredential>, AppError> {
        let rows: Vec<AthleteCredential> = self
            .select(
                tables::CREDENTIALS,
                &[
                    ("email", format!("eq.{}", email)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn all_credentials(&self) -> Result<Vec<AthleteCredential>, AppError> {
        self.select(
            tables::CREDENTIALS,
            &[
                ("select", "*".to_string()),
                ("order", "athlete_id.asc".to_string()),
            ],
        )
        .await
    }

    async fn upsert_credential(&self, credential: &AthleteCredential) -> Result<(), AppError> {
        let mut row = credential.clone();
        row.updated_at = format_utc_rfc3339(chrono::Utc::now());
        self.upsert(tables::CREDENTIALS, "athlete_id", &row).await
    }
}

// ─── Activity Operations ─────────────────────────────────────

#[async_trait]
impl ActivityStore for SupabaseDb {
    async fn upsert_activity(&self, activity: &Activity) -> Result<(), AppError> {
        self.upsert(tables::ACTIVITIES, "athlete_id,strava_id", activity)
            .await
    }

    async fn get_activities(
        &self,
        athlete_id: u64,
        filter: &ActivityFilter,
    ) -> Result<Vec<Activity>, AppError> {
        let mut params = vec![
            ("athlete_id", format!("eq.{}", athlete_id)),
            ("order", "start_date.desc".to_string()),
        ];
        if let Some(sport_type) = &filter.sport_type {
            params.push(("sport_type", format!("eq.{}", sport_type)));
        }
        if let Some(from) = &filter.from {
            params.push(("start_date", format!("gte.{}", from)));
        }
        if let Some(to) = &filter.to {
            params.push(("start_date", format!("lte.{}", to)));
        }
        if let Some(limit) = filter.limit {
            params.push(("limit", limit.to_string()));
        }
        self.select(tables::ACTIVITIES, &params).await
    }

    async fn delete_activities_before(
        &self,
        athlete_id: u64,
        cutoff: &str,
    ) -> Result<u64, AppError> {
        self.delete_where(
            tables::ACTIVITIES,
            &[
                ("athlete_id", format!("eq.{}", athlete_id)),
                ("start_date", format!("lt.{}", cutoff)),
            ],
        )
        .await
    }
}

// ─── Metric Operations ───────────────────────────────────────

#[async_trait]
impl MetricStore for SupabaseDb {
    async fn upsert_metric(&self, metric: &DerivedMetric) -> Result<(), AppError> {
        self.upsert(tables::METRICS, "athlete_id,date", metric).await
    }

    async fn get_metrics(
        &self,
        athlete_id: u64,
        filter: &MetricFilter,
    ) -> Result<Vec<DerivedMetric>, AppError> {
        let mut params = vec![
            ("athlete_id", format!("eq.{}", athlete_id)),
            ("order", "date.desc".to_string()),
        ];
        if let Some(from) = &filter.from {
            params.push(("date", format!("gte.{}", from)));
        }
        if let Some(to) = &filter.to {
            params.push(("date", format!("lte.{}", to)));
        }
        if let Some(limit) = filter.limit {
            params.push(("limit", limit.to_string()));
        }
        self.select(tables::METRICS, &params).await
    }
}

// ─── Profile Operations ──────────────────────────────────────

#[async_trait]
impl ProfileStore for SupabaseDb {
    async fn get_profile(&self, athlete_id: u64) -> Result<Option<AthleteProfile>, AppError> {
        let rows: Vec<AthleteProfile> = self
            .select(
                tables::PROFILES,
                &[
                    ("athlete_id", format!("eq.{}", athlete_id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }
}
