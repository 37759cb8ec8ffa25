// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{routing::post, Json, Router};
use code_optimizer::config::Config;
use code_optimizer::db::{Database, FirestoreDb, MemoryDb};
use code_optimizer::routes::create_router;
use code_optimizer::services::OptimizerClient;
use code_optimizer::AppState;
use serde_json::{json, Value};
use std::sync::Arc;

/// Canned LLM reply used by the fake optimizer endpoint.
#[allow(dead_code)]
pub const FAKE_SUGGESTIONS: &str =
    "**Use f-strings** for formatting.\n```python\nprint(f\"{name}\")\n```";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Serve `router` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Start a fake OpenAI-compatible endpoint that always answers with
/// [`FAKE_SUGGESTIONS`]. Returns its base URL.
#[allow(dead_code)]
pub async fn fake_optimizer() -> String {
    let router = Router::new().route(
        "/chat/completions",
        post(|Json(_body): Json<Value>| async {
            Json(json!({
                "choices": [{"message": {"role": "assistant", "content": FAKE_SUGGESTIONS}}]
            }))
        }),
    );
    serve(router).await
}

/// Create a test app backed by the in-process store. The optimizer points at
/// `optimizer_url`, or at a closed port when `None`.
#[allow(dead_code)]
pub fn create_test_app_with(optimizer_url: Option<String>) -> (Router, Arc<AppState>) {
    let mut config = Config::test_default();
    if let Some(url) = optimizer_url {
        config.openai_base_url = url;
    }
    let optimizer = OptimizerClient::from_config(&config);

    let state = Arc::new(AppState {
        config,
        db: Database::Memory(MemoryDb::new()),
        optimizer,
    });

    (create_router(state.clone()), state)
}

/// Create a test app with offline dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with(None)
}

/// Start the full backend (with a fake optimizer) on a local port.
/// Returns its base URL and the shared state.
#[allow(dead_code)]
pub async fn spawn_app() -> (String, Arc<AppState>) {
    let optimizer_url = fake_optimizer().await;
    let (router, state) = create_test_app_with(Some(optimizer_url));
    (serve(router).await, state)
}

/// Create a test JWT for `user_id` signed with `signing_key`.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: u64, signing_key: &[u8]) -> String {
    code_optimizer::middleware::auth::create_jwt(user_id, signing_key, 3600).unwrap()
}
