// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication and CORS tests.
//!
//! These tests verify that:
//! 1. Registration and login issue working session tokens
//! 2. Protected routes reject requests without valid tokens
//! 3. CORS preflight requests return correct headers

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use code_optimizer::config::Config;
use code_optimizer::error::ErrorResponse;
use code_optimizer::models::{LoginResponse, MessageResponse, UserProfile};
use serde::de::DeserializeOwned;
use serde_json::json;
use tower::ServiceExt;

mod common;

async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn get_with_token(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

fn parse<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).unwrap()
}

#[tokio::test]
async fn test_register_then_login() {
    let (app, _) = common::create_test_app();
    let creds = json!({"username": "alice", "password": "hunter2"});

    let (status, body) = post_json(&app, "/register", creds.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(parse::<MessageResponse>(&body).message, "User created successfully");

    let (status, body) = post_json(&app, "/login", creds).await;
    assert_eq!(status, StatusCode::OK);
    let login: LoginResponse = parse(&body);
    assert!(!login.access_token.is_empty());
    assert_eq!(login.user.as_ref().unwrap().username, "alice");

    // The issued token opens the protected routes
    let (status, body) = get_with_token(&app, "/profile", Some(&login.access_token)).await;
    assert_eq!(status, StatusCode::OK);
    let profile: UserProfile = parse(&body);
    assert_eq!(Some(profile), login.user);
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let (app, _) = common::create_test_app();
    let creds = json!({"username": "bob", "password": "pw"});

    let (status, _) = post_json(&app, "/register", creds.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_json(&app, "/register", creds).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse::<ErrorResponse>(&body).message, "Username already exists");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let (app, _) = common::create_test_app();
    post_json(&app, "/register", json!({"username": "carol", "password": "right"})).await;

    for creds in [
        json!({"username": "carol", "password": "wrong"}),
        json!({"username": "nobody", "password": "right"}),
    ] {
        let (status, body) = post_json(&app, "/login", creds).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let error: ErrorResponse = parse(&body);
        assert_eq!(error.error, "invalid_credentials");
        assert_eq!(error.message, "Invalid username or password");
    }
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _) = common::create_test_app();

    for uri in ["/profile", "/user", "/history"] {
        let (status, body) = get_with_token(&app, uri, None).await;
        // Should return 401 Unauthorized without token
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(parse::<ErrorResponse>(&body).error, "unauthorized");
    }
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let (app, _) = common::create_test_app();

    let (status, body) = get_with_token(&app, "/history", Some("invalid.token.here")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(parse::<ErrorResponse>(&body).error, "invalid_token");

    // Signed with a different key
    let forged = common::create_test_jwt(12345, b"some_other_key_that_is_32_bytes!");
    let (status, _) = get_with_token(&app, "/history", Some(&forged)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_valid_token() {
    let (app, state) = common::create_test_app();
    let token = common::create_test_jwt(12345, &state.config.jwt_signing_key);

    let (status, body) = get_with_token(&app, "/history", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse::<Vec<serde_json::Value>>(&body).len(), 0);

    // Valid token, but no such user record
    let (status, _) = get_with_token(&app, "/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/optimize")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // OPTIONS should return 200 (CORS preflight success)
    assert_eq!(response.status(), StatusCode::OK);

    // Should have CORS headers
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_cors_refuses_foreign_origin() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/optimize")
                .header(header::ORIGIN, "http://localhost.evil.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(!response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_public_route_no_auth_required() {
    let (app, _) = common::create_test_app();

    let (status, body) = get_with_token(&app, "/health", None).await;

    // Health should be accessible without auth
    assert_eq!(status, StatusCode::OK);
    let health = parse::<serde_json::Value>(&body);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["storage"], "memory");
    assert_eq!(health["model"], Config::test_default().openai_model.as_str());
}
