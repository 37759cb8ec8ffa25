// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication session store.
//!
//! Owns the session lifecycle: `loading` at construction, resolved once by
//! [`SessionStore::initialize`], then toggled by login, logout and server-side
//! expiry. Consumers read the current [`Session`] or subscribe to changes.

use crate::client::error::ClientError;
use crate::client::http::{ApiClient, RequestInfo, ResponseMiddleware};
use crate::models::UserProfile;
use reqwest::StatusCode;
use std::sync::Arc;
use tokio::sync::watch;

/// Snapshot of the authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: Option<UserProfile>,
    pub is_authenticated: bool,
    pub loading: bool,
}

/// Coarse session state for routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    Authenticated,
    Unauthenticated,
}

impl Session {
    pub fn loading() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            loading: true,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            loading: false,
        }
    }

    pub fn authenticated(user: UserProfile) -> Self {
        Self {
            user: Some(user),
            is_authenticated: true,
            loading: false,
        }
    }

    pub fn status(&self) -> SessionStatus {
        if self.loading {
            SessionStatus::Loading
        } else if self.is_authenticated {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Unauthenticated
        }
    }
}

/// Tagged result of `login`/`register`. Failures carry a message fit for
/// display next to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome<T> {
    Success(T),
    Failure(String),
}

impl<T> AuthOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success(_))
    }

    /// Failure message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            AuthOutcome::Success(_) => None,
            AuthOutcome::Failure(message) => Some(message),
        }
    }
}

/// Resets the session when the server rejects the token on any
/// session-scoped call.
struct ResetOnExpiry {
    state: Arc<watch::Sender<Session>>,
}

impl ResponseMiddleware for ResetOnExpiry {
    fn on_response(&self, request: &RequestInfo, status: StatusCode) {
        if request.is_session_expiry(status) {
            // Leave a pending initial check alone; initialize() resolves it.
            self.state.send_if_modified(|session| {
                if session.loading || !session.is_authenticated {
                    return false;
                }
                *session = Session::unauthenticated();
                true
            });
        }
    }
}

/// Process-wide authentication state.
pub struct SessionStore {
    api: ApiClient,
    state: Arc<watch::Sender<Session>>,
}

impl SessionStore {
    /// Create a store in the `loading` state and hook it into the client's
    /// response middleware.
    pub fn new(api: ApiClient) -> Self {
        let (tx, _rx) = watch::channel(Session::loading());
        let state = Arc::new(tx);

        api.add_middleware(Arc::new(ResetOnExpiry {
            state: state.clone(),
        }));

        Self { api, state }
    }

    /// Current session snapshot.
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status()
    }

    /// Receive every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Resolve the initial `loading` state. With a stored token, the profile
    /// fetch decides; without one, the session is unauthenticated at once.
    /// Only the first call does anything.
    pub async fn initialize(&self) {
        if !self.state.borrow().loading {
            return;
        }

        let resolved = if self.api.storage().get().is_some() {
            match self.api.get_profile().await {
                Ok(user) => {
                    tracing::info!(user_id = user.id, "Restored session");
                    Session::authenticated(user)
                }
                Err(e) => {
                    tracing::info!(error = %e, "Stored token rejected, starting signed out");
                    self.api.storage().clear();
                    Session::unauthenticated()
                }
            }
        } else {
            Session::unauthenticated()
        };

        self.state.send_if_modified(|session| {
            if !session.loading {
                return false;
            }
            *session = resolved;
            true
        });
    }

    /// Log in and persist the token. The profile comes from the login
    /// response when the server includes it, else from a follow-up fetch.
    pub async fn login(&self, username: &str, password: &str) -> AuthOutcome<UserProfile> {
        let response = match self.api.login(username, password).await {
            Ok(response) => response,
            Err(e) => return AuthOutcome::Failure(login_failure_message(&e)),
        };

        self.api.storage().set(&response.access_token);

        let user = match response.user {
            Some(user) => user,
            None => match self.api.get_profile().await {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!(error = %e, "Profile fetch after login failed");
                    self.api.storage().clear();
                    return AuthOutcome::Failure(e.user_message());
                }
            },
        };

        tracing::info!(user_id = user.id, "Logged in");
        self.state.send_replace(Session::authenticated(user.clone()));
        AuthOutcome::Success(user)
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, username: &str, password: &str) -> AuthOutcome<String> {
        match self.api.register(username, password).await {
            Ok(response) => AuthOutcome::Success(response.message),
            Err(e) => {
                tracing::debug!(error = %e, "Registration failed");
                AuthOutcome::Failure(match e {
                    ClientError::Transport(_) => {
                        "An unexpected error occurred during registration".to_string()
                    }
                    other => other.user_message(),
                })
            }
        }
    }

    /// Forget the token and sign out. Safe to call repeatedly.
    pub fn logout(&self) {
        self.api.storage().clear();
        self.state.send_if_modified(|session| {
            if *session == Session::unauthenticated() {
                return false;
            }
            *session = Session::unauthenticated();
            true
        });
    }
}

fn login_failure_message(error: &ClientError) -> String {
    match error {
        ClientError::Transport(_) => "An unexpected error occurred during login".to_string(),
        ClientError::Unauthorized(_) => "Invalid username or password".to_string(),
        other => other.user_message(),
    }
}
