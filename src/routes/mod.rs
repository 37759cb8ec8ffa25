// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Router assembly: public routes, the JWT-protected API, and the layers
//! they share.

pub mod api;
pub mod auth;

use crate::config::Config;
use crate::middleware::auth::require_auth;
use crate::AppState;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Loopback hosts a local frontend dev server may run on, any port.
const LOCAL_ORIGINS: &[&str] = &["http://localhost", "http://127.0.0.1"];

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Persistence backend: "memory" or "firestore"
    pub storage: String,
    /// Model the optimizer asks for suggestions
    pub model: String,
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        storage: state.config.storage.name().to_string(),
        model: state.config.openai_model.clone(),
    })
}

/// Whether a browser at `origin` may call the API.
fn origin_allowed(frontend_url: &str, origin: &str) -> bool {
    if origin == frontend_url.trim_end_matches('/') {
        return true;
    }
    LOCAL_ORIGINS.iter().any(|local| {
        origin
            .strip_prefix(local)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(':'))
    })
}

fn cors_layer(config: &Config) -> CorsLayer {
    let frontend_url = config.frontend_url.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &axum::http::request::Parts| {
                origin
                    .to_str()
                    .is_ok_and(|origin| origin_allowed(&frontend_url, origin))
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/", get(|| async { "Code Optimizer API" }))
        .route("/health", get(health_check))
        .merge(auth::routes());

    let protected =
        api::routes().route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors_layer(&state.config))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
