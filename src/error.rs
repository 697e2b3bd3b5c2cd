// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No stored credential for athlete {0}")]
    CredentialNotFound(u64),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// The provider rejected or failed a token refresh. The stored
    /// credential is left untouched when this is returned.
    #[error("Token refresh failed for athlete {athlete_id}: {detail}")]
    RefreshFailed { athlete_id: u64, detail: String },

    /// The activity listing failed or timed out. Pages fetched before the
    /// failure are discarded; callers never see a partial listing.
    #[error("Activity fetch failed (HTTP {status}): {body}")]
    FetchFailed { status: u16, body: String },

    /// The athlete's physiological profile has a zero heart-rate span or
    /// zero FTP, so the load formulas would divide by zero.
    #[error("Invalid physiological profile for athlete {0}")]
    InvalidProfile(u64),

    #[error("Strava API error: {0}")]
    StravaApi(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::CredentialNotFound(athlete_id) => (
                StatusCode::NOT_FOUND,
                "credential_not_found",
                Some(format!("athlete {}", athlete_id)),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::RefreshFailed { athlete_id, detail } => (
                StatusCode::BAD_GATEWAY,
                "refresh_failed",
                Some(format!("athlete {}: {}", athlete_id, detail)),
            ),
            AppError::FetchFailed { status, body } => (
                StatusCode::BAD_GATEWAY,
                "fetch_failed",
                Some(format!("HTTP {}: {}", status, body)),
            ),
            AppError::InvalidProfile(athlete_id) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid_profile",
                Some(format!("athlete {}", athlete_id)),
            ),
            AppError::StravaApi(msg) => {
                (StatusCode::BAD_GATEWAY, "strava_error", Some(msg.clone()))
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
