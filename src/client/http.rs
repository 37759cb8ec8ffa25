// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client for the Code Optimizer API.
//!
//! Handles:
//! - Bearer token injection from persisted storage
//! - A response-middleware chain run for every response
//! - Session expiry: a 401 on an authenticated call clears the stored token
//!   before any other middleware runs

use crate::client::config::ClientConfig;
use crate::client::error::ClientError;
use crate::client::storage::{FileTokenStorage, TokenStorage};
use crate::models::{
    Credentials, HistoryEntry, LoginResponse, MessageResponse, OptimizeRequest, OptimizeResponse,
    UserProfile,
};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::{Arc, RwLock};

/// What a middleware gets to see about the request a response belongs to.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,
    pub path: String,
    /// Whether this call is session-scoped (carries the token if present)
    pub authenticated: bool,
}

impl RequestInfo {
    /// A 401 on a session-scoped call means the session is gone.
    pub fn is_session_expiry(&self, status: StatusCode) -> bool {
        self.authenticated && status == StatusCode::UNAUTHORIZED
    }
}

/// Hook run on every response, regardless of which caller issued the request.
pub trait ResponseMiddleware: Send + Sync {
    fn on_response(&self, request: &RequestInfo, status: StatusCode);
}

/// Built-in middleware: drop the stored token when the session expires.
struct ClearTokenOnExpiry {
    storage: Arc<dyn TokenStorage>,
}

impl ResponseMiddleware for ClearTokenOnExpiry {
    fn on_response(&self, request: &RequestInfo, status: StatusCode) {
        if request.is_session_expiry(status) {
            tracing::warn!(path = %request.path, "Session rejected by server, clearing token");
            self.storage.clear();
        }
    }
}

/// Code Optimizer API client. Cheap to clone; clones share storage and
/// middleware.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    storage: Arc<dyn TokenStorage>,
    middleware: RwLock<Vec<Arc<dyn ResponseMiddleware>>>,
}

impl ApiClient {
    /// Create a client for `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>, storage: Arc<dyn TokenStorage>) -> Self {
        let base_url: String = base_url.into();
        let clear_token: Arc<dyn ResponseMiddleware> = Arc::new(ClearTokenOnExpiry {
            storage: storage.clone(),
        });

        Self {
            inner: Arc::new(Inner {
                http: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
                storage,
                middleware: RwLock::new(vec![clear_token]),
            }),
        }
    }

    /// Create a client with file-backed token storage.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            Arc::new(FileTokenStorage::new(config.token_file.clone())),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The persisted token store.
    pub fn storage(&self) -> &Arc<dyn TokenStorage> {
        &self.inner.storage
    }

    /// Append a response middleware. Runs after the built-in token handling.
    pub fn add_middleware(&self, middleware: Arc<dyn ResponseMiddleware>) {
        if let Ok(mut chain) = self.inner.middleware.write() {
            chain.push(middleware);
        }
    }

    // ─── Auth ────────────────────────────────────────────────────────────────

    /// `POST /register`. Never carries a token.
    pub async fn register(&self, username: &str, password: &str) -> Result<MessageResponse, ClientError> {
        let body = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let request = self.request(Method::POST, "/register").json(&body);
        self.execute(request, Method::POST, "/register", false).await
    }

    /// `POST /login`. Never carries a token; a 401 here is a bad password,
    /// not an expired session.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let request = self.request(Method::POST, "/login").json(&body);
        self.execute(request, Method::POST, "/login", false).await
    }

    /// `GET /profile`.
    pub async fn get_profile(&self) -> Result<UserProfile, ClientError> {
        self.get("/profile").await
    }

    // ─── Code ────────────────────────────────────────────────────────────────

    /// `POST /optimize`.
    pub async fn optimize(&self, code: &str, language: &str) -> Result<OptimizeResponse, ClientError> {
        let body = OptimizeRequest {
            code: code.to_string(),
            language: language.to_string(),
        };
        let request = self.request(Method::POST, "/optimize").json(&body);
        self.execute(request, Method::POST, "/optimize", true).await
    }

    /// `GET /history`, newest first.
    pub async fn get_history(&self) -> Result<Vec<HistoryEntry>, ClientError> {
        self.get("/history").await
    }

    /// `DELETE /history/{id}`.
    pub async fn delete_history(&self, id: u64) -> Result<MessageResponse, ClientError> {
        let path = format!("/history/{}", id);
        let request = self.request(Method::DELETE, &path);
        self.execute(request, Method::DELETE, &path, true).await
    }

    // ─── Plumbing ────────────────────────────────────────────────────────────

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.inner
            .http
            .request(method, format!("{}{}", self.inner.base_url, path))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let request = self.request(Method::GET, path);
        self.execute(request, Method::GET, path, true).await
    }

    /// Send a request, run the middleware chain, and decode the JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        mut request: RequestBuilder,
        method: Method,
        path: &str,
        authenticated: bool,
    ) -> Result<T, ClientError> {
        if authenticated {
            if let Some(token) = self.inner.storage.get() {
                request = request.bearer_auth(token);
            }
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "Request failed");
            ClientError::Transport(e)
        })?;

        let status = response.status();
        tracing::debug!(%method, path, status = status.as_u16(), "Response received");

        let info = RequestInfo {
            method,
            path: path.to_string(),
            authenticated,
        };
        self.run_middleware(&info, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::from_response(status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn run_middleware(&self, info: &RequestInfo, status: StatusCode) {
        // Snapshot so a middleware may register another without deadlocking
        let chain: Vec<Arc<dyn ResponseMiddleware>> = match self.inner.middleware.read() {
            Ok(chain) => chain.clone(),
            Err(_) => return,
        };
        for middleware in chain {
            middleware.on_response(info, status);
        }
    }
}
