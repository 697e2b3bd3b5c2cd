// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Endpoint behavior driven through the full router.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

use alameda_sync::db::CredentialStore;
use alameda_sync::services::reconcile::RetentionPolicy;
use alameda_sync::services::ActivityReconciler;

mod common;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn health_returns_ok() {
    let (app, _state, _db, _strava) = common::create_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn activities_read_requires_athlete_id() {
    let (app, _state, _db, _strava) = common::create_test_app();

    let response = app.oneshot(get("/api/activities")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn sync_then_read_activities_with_filters() {
    let (app, _state, db, strava) = common::create_test_app();

    db.upsert_credential(&common::credential(7, common::future_expiry()))
        .await
        .unwrap();

    let mut run = common::raw_activity(2, "2026-08-02T07:00:00Z");
    run.sport_type = "Run".to_string();
    strava.set_activities(vec![
        common::raw_activity(3, "2026-08-03T07:00:00Z"),
        run,
        common::raw_activity(1, "2026-08-01T07:00:00Z"),
    ]);

    let response = app.clone().oneshot(post("/api/sync")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["ok"], true);
    assert_eq!(report["athletes"][0]["stored"], 3);

    // Newest first
    let response = app
        .clone()
        .oneshot(get("/api/activities?athlete_id=7"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["data"][0]["strava_id"], 3);
    assert_eq!(body["data"][2]["strava_id"], 1);

    // Sport filter
    let response = app
        .clone()
        .oneshot(get("/api/activities?athlete_id=7&sport_type=Run"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["strava_id"], 2);

    // Limit
    let response = app
        .oneshot(get("/api/activities?athlete_id=7&limit=2"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn sync_report_lists_every_athlete_even_on_failure() {
    let (app, _state, db, strava) = common::create_test_app();

    db.upsert_credential(&common::credential(1, common::future_expiry()))
        .await
        .unwrap();
    db.upsert_credential(&common::credential(2, common::past_expiry()))
        .await
        .unwrap();
    strava.fail_refresh("refresh-2");
    strava.set_activities(vec![common::raw_activity(1, "2026-08-01T07:00:00Z")]);

    let response = app.oneshot(post("/api/sync")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report = body_json(response).await;
    assert_eq!(report["ok"], false);
    let athletes = report["athletes"].as_array().unwrap();
    assert_eq!(athletes.len(), 2);
    assert_eq!(athletes[0]["status"], "ok");
    assert_eq!(athletes[1]["status"], "refresh_failed");
}

#[tokio::test]
async fn compute_metrics_endpoint_falls_back_to_default_profile() {
    let (app, _state, db, strava) = common::create_test_app();

    db.upsert_credential(&common::credential(7, common::future_expiry()))
        .await
        .unwrap();
    strava.set_activities(vec![common::raw_activity(1, "2026-08-01T07:00:00Z")]);
    app.clone().oneshot(post("/api/sync")).await.unwrap();

    // No profile row seeded; the team default applies
    let response = app
        .clone()
        .oneshot(post("/api/metrics/7"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let rows = body_json(response).await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["date"], "2026-08-01");

    // Stored and readable with summary totals
    let response = app
        .oneshot(get("/api/metrics?athlete_id=7"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["summary"]["total_days"], 1);
    assert_eq!(body["data"][0]["date"], "2026-08-01");
}

#[tokio::test]
async fn metrics_read_requires_athlete_id() {
    let (app, _state, _db, _strava) = common::create_test_app();

    let response = app.oneshot(get("/api/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn week_stats_covers_the_current_week() {
    let (app, _state, db, _strava) = common::create_test_app();

    let today = chrono::Utc::now().date_naive();
    let reconciler = ActivityReconciler::new(db.clone(), RetentionPolicy::KeepAll);
    reconciler
        .reconcile(
            7,
            &[
                common::raw_activity(1, &format!("{}T08:00:00Z", today)),
                // Far outside the current week
                common::raw_activity(2, "2020-01-01T08:00:00Z"),
            ],
        )
        .await
        .unwrap();

    let response = app
        .oneshot(get("/api/stats/week?athlete_id=7"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["totals"]["activities"], 1);
    assert_eq!(body["totals"]["distance_km"], 30.0);
    assert_eq!(body["latest"].as_array().unwrap().len(), 1);
    assert!(body["week_range"]["from"].is_string());
}

#[tokio::test]
async fn oauth_callback_stores_credential_and_redirects_ok() {
    let (app, _state, db, strava) = common::create_test_app();

    strava.script_exchange("goodcode", common::exchange_response(42));

    let response = app
        .oneshot(get("/auth/callback?code=goodcode"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.contains("strava=ok"));
    assert!(location.contains("name=Marta"));

    let stored = db.get_credential(42).await.unwrap().unwrap();
    assert_eq!(stored.access_token, "access-42");
    assert_eq!(stored.firstname.as_deref(), Some("Marta"));
}

#[tokio::test]
async fn oauth_callback_without_code_redirects_ko() {
    let (app, _state, _db, _strava) = common::create_test_app();

    let response = app.oneshot(get("/auth/callback")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.contains("strava=ko"));
    assert!(location.contains("reason=missing_code"));
}

#[tokio::test]
async fn oauth_callback_denied_redirects_ko() {
    let (app, _state, _db, _strava) = common::create_test_app();

    let response = app
        .oneshot(get("/auth/callback?error=access_denied"))
        .await
        .unwrap();

    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.contains("reason=access_denied"));
}
