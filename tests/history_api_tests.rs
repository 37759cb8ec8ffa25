// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Optimize and history endpoint tests, against a fake LLM endpoint.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use code_optimizer::error::ErrorResponse;
use code_optimizer::models::{HistoryEntry, MessageResponse, OptimizeResponse};
use serde::de::DeserializeOwned;
use tower::ServiceExt;

mod common;

async fn send<T: DeserializeOwned>(
    app: &Router,
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, T) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json");
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn optimize(app: &Router, token: &str, code: &str) -> OptimizeResponse {
    let (status, response) = send(
        app,
        "POST",
        "/optimize",
        token,
        Some(serde_json::json!({"code": code, "language": "python"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    response
}

#[tokio::test]
async fn test_optimize_records_history() {
    let optimizer = common::fake_optimizer().await;
    let (app, state) = common::create_test_app_with(Some(optimizer));
    let token = common::create_test_jwt(1, &state.config.jwt_signing_key);

    let response = optimize(&app, &token, "print(\"%s\" % name)").await;
    assert_eq!(response.suggestions, common::FAKE_SUGGESTIONS);
    assert_eq!(response.optimized_code, "print(f\"{name}\")");

    let (status, history): (_, Vec<HistoryEntry>) = send(&app, "GET", "/history", &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.len(), 1);
    assert_eq!(Some(history[0].id), response.id);
    assert_eq!(history[0].original_code, "print(\"%s\" % name)");
    assert_eq!(history[0].optimization_suggestions, common::FAKE_SUGGESTIONS);
    assert!(history[0].created_at.ends_with('Z'));
}

#[tokio::test]
async fn test_history_newest_first() {
    let optimizer = common::fake_optimizer().await;
    let (app, state) = common::create_test_app_with(Some(optimizer));
    let token = common::create_test_jwt(1, &state.config.jwt_signing_key);

    let first = optimize(&app, &token, "a = 1").await;
    // Timestamps have millisecond resolution
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = optimize(&app, &token, "b = 2").await;

    let (_, history): (_, Vec<HistoryEntry>) = send(&app, "GET", "/history", &token, None).await;
    let ids: Vec<_> = history.iter().map(|h| Some(h.id)).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn test_history_isolated_per_user() {
    let optimizer = common::fake_optimizer().await;
    let (app, state) = common::create_test_app_with(Some(optimizer));
    let alice = common::create_test_jwt(1, &state.config.jwt_signing_key);
    let bob = common::create_test_jwt(2, &state.config.jwt_signing_key);

    let record = optimize(&app, &alice, "x = 1").await;
    let id = record.id.unwrap();

    let (_, bob_history): (_, Vec<HistoryEntry>) = send(&app, "GET", "/history", &bob, None).await;
    assert!(bob_history.is_empty());

    // Bob cannot delete Alice's record
    let (status, error): (_, ErrorResponse) =
        send(&app, "DELETE", &format!("/history/{}", id), &bob, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error.message, "History not found");

    let (_, alice_history): (_, Vec<HistoryEntry>) =
        send(&app, "GET", "/history", &alice, None).await;
    assert_eq!(alice_history.len(), 1);
}

#[tokio::test]
async fn test_delete_history() {
    let optimizer = common::fake_optimizer().await;
    let (app, state) = common::create_test_app_with(Some(optimizer));
    let token = common::create_test_jwt(1, &state.config.jwt_signing_key);

    let id = optimize(&app, &token, "x = 1").await.id.unwrap();

    let (status, body): (_, MessageResponse) =
        send(&app, "DELETE", &format!("/history/{}", id), &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.message, "History deleted successfully");

    // Second delete of the same id
    let (status, _): (_, ErrorResponse) =
        send(&app, "DELETE", &format!("/history/{}", id), &token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, history): (_, Vec<HistoryEntry>) = send(&app, "GET", "/history", &token, None).await;
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_delete_history_rejects_non_numeric_id() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt(1, &state.config.jwt_signing_key);

    for uri in ["/history/abc", "/history/-1", "/history/1.5"] {
        let (status, body): (_, ErrorResponse) = send(&app, "DELETE", uri, &token, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body.error, "bad_request");
        assert_eq!(body.message, "Invalid history id");
    }
}
