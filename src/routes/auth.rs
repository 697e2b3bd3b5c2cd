// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth connect flow.
//!
//! `/auth/strava` sends the athlete to Strava's consent screen;
//! `/auth/callback` exchanges the returned code and stores the credential.
//! Every callback outcome redirects back to the dashboard with an
//! `?strava=ok|ko` marker so the front end can show the result.

use crate::db::CredentialStore;
use crate::models::AthleteCredential;
use crate::services::strava::StravaApi;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

const OAUTH_SCOPE: &str = "read,activity:read_all,profile:read_all";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/strava", get(connect))
        .route("/auth/callback", get(callback))
}

/// Redirect to Strava's authorization page.
async fn connect(State(state): State<Arc<AppState>>) -> Redirect {
    let url = format!(
        "https://www.strava.com/oauth/authorize?client_id={}&response_type=code&redirect_uri={}&scope={}&approval_prompt=force",
        state.config.strava_client_id,
        urlencoding::encode(&state.config.strava_redirect_uri),
        OAUTH_SCOPE,
    );
    Redirect::temporary(&url)
}

#[derive(Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    /// Set by Strava when the athlete denies access
    error: Option<String>,
}

/// Handle the OAuth callback: exchange the code and upsert the credential.
async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
) -> Redirect {
    if query.error.is_some() {
        return redirect_error(&state, "access_denied");
    }

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return redirect_error(&state, "missing_code");
    };

    let token = match state.strava.exchange_code(&code).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Strava token exchange failed");
            return redirect_error(&state, "strava_token_error");
        }
    };

    let credential = AthleteCredential {
        athlete_id: token.athlete.id,
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at: token.expires_at,
        email: token.athlete.email.clone(),
        firstname: token.athlete.firstname.clone(),
        lastname: token.athlete.lastname.clone(),
        updated_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    if let Err(e) = state.credentials.upsert_credential(&credential).await {
        tracing::error!(athlete_id = credential.athlete_id, error = %e, "Failed to store credential");
        return redirect_error(&state, "store_error");
    }

    tracing::info!(
        athlete_id = credential.athlete_id,
        "Strava account connected"
    );

    let name = token.athlete.firstname.as_deref().unwrap_or("Athlete");
    Redirect::temporary(&format!(
        "{}?strava=ok&name={}",
        state.config.frontend_url,
        urlencoding::encode(name)
    ))
}

fn redirect_error(state: &AppState, reason: &str) -> Redirect {
    Redirect::temporary(&format!(
        "{}?strava=ko&reason={}",
        state.config.frontend_url, reason
    ))
}
