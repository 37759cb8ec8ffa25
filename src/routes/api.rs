// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::db;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    HistoryEntry, HistoryRecord, MessageResponse, OptimizeRequest, OptimizeResponse, UserProfile,
};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::{delete, get, post},
    Extension, Json, Router,
};
use std::sync::Arc;

/// Longest accepted language name.
const MAX_LANGUAGE_LEN: usize = 50;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/user", get(get_profile))
        .route("/optimize", post(optimize))
        .route("/history", get(get_history))
        .route("/history/{id}", delete(delete_history))
}

// ─── User Profile ────────────────────────────────────────────

/// Get current user profile.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let profile = state
        .db
        .get_user(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserProfile::from(&profile)))
}

// ─── Optimization ────────────────────────────────────────────

/// Run the submitted code through the LLM and record the result.
async fn optimize(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: std::result::Result<Json<OptimizeRequest>, JsonRejection>,
) -> Result<Json<OptimizeResponse>> {
    let missing = || AppError::BadRequest("Missing code or language".to_string());

    let Json(request) = body.map_err(|_| missing())?;
    let language = request.language.trim();
    if request.code.trim().is_empty() || language.is_empty() {
        return Err(missing());
    }
    if language.chars().count() > MAX_LANGUAGE_LEN {
        return Err(AppError::BadRequest(format!(
            "Language must be at most {} characters",
            MAX_LANGUAGE_LEN
        )));
    }

    tracing::info!(user_id = user.user_id, language, "Optimizing code");

    let optimization = state.optimizer.optimize(&request.code, language).await?;

    let record = HistoryRecord {
        id: db::new_id()?,
        user_id: user.user_id,
        language: language.to_string(),
        original_code: request.code,
        optimized_code: optimization.optimized_code,
        optimization_suggestions: optimization.suggestions,
        created_at: now_rfc3339(),
    };

    state.db.insert_history(&record).await?;

    tracing::info!(
        user_id = user.user_id,
        history_id = record.id,
        "Optimization stored"
    );

    Ok(Json(OptimizeResponse {
        id: Some(record.id),
        optimized_code: record.optimized_code,
        suggestions: record.optimization_suggestions,
    }))
}

// ─── History ─────────────────────────────────────────────────

/// List the caller's history, newest first.
async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<HistoryEntry>>> {
    let records = state.db.list_history(user.user_id).await?;

    tracing::debug!(
        user_id = user.user_id,
        count = records.len(),
        "Fetched history"
    );

    Ok(Json(records.into_iter().map(HistoryEntry::from).collect()))
}

/// Delete one of the caller's history records.
async fn delete_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = id.map_err(|_| AppError::BadRequest("Invalid history id".to_string()))?;
    if !state.db.delete_history(user.user_id, id).await? {
        return Err(AppError::NotFound("History not found".to_string()));
    }

    tracing::info!(user_id = user.user_id, history_id = id, "History deleted");

    Ok(Json(MessageResponse {
        message: "History deleted successfully".to_string(),
    }))
}
