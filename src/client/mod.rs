// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed client for the Code Optimizer API, with the session and
//! main-screen state a front end needs.

pub mod app;
pub mod config;
pub mod error;
pub mod http;
pub mod panels;
pub mod session;
pub mod storage;
pub mod workspace;

pub use app::{App, View};
pub use config::ClientConfig;
pub use error::ClientError;
pub use http::{ApiClient, RequestInfo, ResponseMiddleware};
pub use panels::{HistoryPanel, SuggestionsPanel};
pub use session::{AuthOutcome, Session, SessionStatus, SessionStore};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use workspace::{Draft, OptimizeOutcome, Workspace, WorkspaceState, SUPPORTED_LANGUAGES};
