// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes: registration and password login.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::db;
use crate::error::{AppError, Result};
use crate::middleware::auth::create_jwt;
use crate::models::{LoginResponse, MessageResponse, User, UserProfile};
use crate::services::{hash_password, verify_password};
use crate::time_utils::now_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

const MISSING_CREDENTIALS: &str = "Missing username or password";

/// Registration/login body. Fields are optional here so a missing field gets
/// the same 400 as an empty one.
#[derive(Deserialize, Validate)]
pub struct CredentialsBody {
    #[validate(length(max = 80, message = "Username must be at most 80 characters"))]
    username: Option<String>,
    #[validate(length(max = 1024, message = "Password is too long"))]
    password: Option<String>,
}

impl CredentialsBody {
    /// Return `(username, password)` or a 400.
    fn into_parts(self) -> Result<(String, String)> {
        self.validate().map_err(|errors| {
            let message = errors
                .field_errors()
                .values()
                .flat_map(|errs| errs.iter())
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .next()
                .unwrap_or_else(|| "Invalid request".to_string());
            AppError::BadRequest(message)
        })?;

        let username = self.username.map(|u| u.trim().to_string()).unwrap_or_default();
        let password = self.password.unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::BadRequest(MISSING_CREDENTIALS.to_string()));
        }
        Ok((username, password))
    }
}

/// Unwrap a JSON body, mapping malformed input to our 400.
fn credentials(body: std::result::Result<Json<CredentialsBody>, JsonRejection>) -> Result<(String, String)> {
    let Json(body) = body.map_err(|e| {
        tracing::debug!(error = %e, "Rejected credentials body");
        AppError::BadRequest(MISSING_CREDENTIALS.to_string())
    })?;
    body.into_parts()
}

/// Create an account. Registration never logs the user in.
async fn register(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<CredentialsBody>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let (username, password) = credentials(body)?;

    let user = User {
        id: db::new_id()?,
        username,
        password_hash: hash_password(&password)?,
        created_at: now_rfc3339(),
    };

    if !state.db.create_user(&user).await? {
        tracing::info!(username = %user.username, "Registration rejected: username taken");
        return Err(AppError::BadRequest("Username already exists".to_string()));
    }

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully".to_string(),
        }),
    ))
}

/// Verify credentials and issue a session token.
async fn login(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<CredentialsBody>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let (username, password) = credentials(body)?;

    let user = state
        .db
        .get_user_by_username(&username)
        .await?
        .filter(|user| verify_password(&password, &user.password_hash))
        .ok_or_else(|| {
            tracing::info!(username = %username, "Login failed");
            AppError::InvalidCredentials
        })?;

    let access_token = create_jwt(
        user.id,
        &state.config.jwt_signing_key,
        state.config.token_ttl_secs,
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(user_id = user.id, "Login successful");

    Ok(Json(LoginResponse {
        access_token,
        user: Some(UserProfile::from(&user)),
    }))
}
