// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Alameda-Sync API Server
//!
//! Keeps the team's Strava credentials fresh, syncs activities into
//! Supabase, and serves training-load metrics for the dashboard.

use alameda_sync::{
    config::Config,
    db::SupabaseDb,
    services::StravaClient,
    AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Alameda-Sync API");

    let timeout = Duration::from_secs(config.http_timeout_secs);

    // Initialize Supabase database
    let db = Arc::new(
        SupabaseDb::new(&config.supabase_url, &config.supabase_service_key, timeout)
            .expect("Failed to build Supabase client"),
    );
    tracing::info!(url = %config.supabase_url, "Supabase client initialized");

    // Initialize Strava client
    let strava = Arc::new(
        StravaClient::new(
            config.strava_client_id.clone(),
            config.strava_client_secret.clone(),
            timeout,
        )
        .expect("Failed to build Strava client"),
    );

    // Build shared state; one SupabaseDb handle backs all four stores
    let state = Arc::new(AppState::new(
        config.clone(),
        db.clone(),
        db.clone(),
        db.clone(),
        db,
        strava,
    ));

    // Build router
    let app = alameda_sync::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("alameda_sync=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
