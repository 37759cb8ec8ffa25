// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Main-screen controller: the submission draft, the latest suggestions,
//! and the cached history list.
//!
//! State sits behind a mutex that is never held across an `.await`; each
//! operation reads what it needs, releases the lock, awaits the backend,
//! then re-acquires the lock to apply the result. When the server rejects
//! the session, the whole state is discarded.

use crate::client::error::ClientError;
use crate::client::http::{ApiClient, RequestInfo, ResponseMiddleware};
use crate::models::{HistoryEntry, OptimizeResponse};
use reqwest::StatusCode;
use std::sync::{Arc, Mutex, MutexGuard};

pub const DEFAULT_LANGUAGE: &str = "python";

/// Languages offered by the submission panel.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "python",
    "javascript",
    "typescript",
    "java",
    "c",
    "cpp",
    "csharp",
    "go",
    "rust",
    "ruby",
    "php",
    "swift",
    "kotlin",
    "sql",
];

pub const EMPTY_CODE_NOTICE: &str = "Please enter some code first.";
pub const ANALYZING_PLACEHOLDER: &str = "Analyzing your code...";
pub const NO_SUGGESTIONS_PLACEHOLDER: &str = "No suggestions returned.";

/// Unsaved submission: code plus language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub code: String,
    pub language: String,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            code: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Everything the main screen renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceState {
    pub draft: Draft,
    /// Text for the suggestions panel
    pub suggestions: String,
    /// Cached history, in server order
    pub history: Vec<HistoryEntry>,
    /// An optimize call is in flight
    pub busy: bool,
    /// Transient message for the user (validation problems)
    pub notice: Option<String>,
}

/// How an `optimize` call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimizeOutcome {
    /// Rejected locally; no request was made.
    Rejected(String),
    /// Another optimize call is still running; no request was made.
    Busy,
    /// Backend answered; carries the text now shown.
    Completed(String),
    /// Backend or transport failed; carries the error text now shown.
    Failed(String),
}

/// Main-screen controller.
pub struct Workspace {
    api: ApiClient,
    state: Arc<Mutex<WorkspaceState>>,
}

fn lock_state(state: &Mutex<WorkspaceState>) -> MutexGuard<'_, WorkspaceState> {
    // A panic elsewhere must not wedge the UI; the state is plain data.
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Drops the previous user's draft, suggestions and history once the server
/// rejects the session.
struct DiscardOnExpiry {
    state: Arc<Mutex<WorkspaceState>>,
}

impl ResponseMiddleware for DiscardOnExpiry {
    fn on_response(&self, request: &RequestInfo, status: StatusCode) {
        if request.is_session_expiry(status) {
            *lock_state(&self.state) = WorkspaceState::default();
        }
    }
}

/// Clears the busy flag when dropped, so every exit path releases it.
struct BusyGuard<'a> {
    workspace: &'a Workspace,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.workspace.lock().busy = false;
    }
}

impl Workspace {
    /// Create a controller and hook it into the client's response
    /// middleware.
    pub fn new(api: ApiClient) -> Self {
        let state = Arc::new(Mutex::new(WorkspaceState::default()));
        api.add_middleware(Arc::new(DiscardOnExpiry {
            state: state.clone(),
        }));
        Self { api, state }
    }

    fn lock(&self) -> MutexGuard<'_, WorkspaceState> {
        lock_state(&self.state)
    }

    /// Copy of the current state for rendering.
    pub fn snapshot(&self) -> WorkspaceState {
        self.lock().clone()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.lock().history.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    // ─── Submission panel ────────────────────────────────────────────────────

    pub fn set_code(&self, code: impl Into<String>) {
        let mut state = self.lock();
        state.draft.code = code.into();
        state.notice = None;
    }

    /// Select a language from [`SUPPORTED_LANGUAGES`] (case-insensitive).
    pub fn set_language(&self, language: &str) -> Result<(), String> {
        let normalized = language.trim().to_ascii_lowercase();
        if !SUPPORTED_LANGUAGES.contains(&normalized.as_str()) {
            return Err(format!(
                "Unsupported language '{}'. Choose one of: {}",
                language.trim(),
                SUPPORTED_LANGUAGES.join(", ")
            ));
        }
        self.lock().draft.language = normalized;
        Ok(())
    }

    /// Clear the draft code and the suggestions panel.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.draft.code.clear();
        state.suggestions.clear();
        state.notice = None;
    }

    /// Drop everything (used on sign-out).
    pub fn reset(&self) {
        *self.lock() = WorkspaceState::default();
    }

    // ─── History ─────────────────────────────────────────────────────────────

    /// Load history when the main screen appears.
    pub async fn mount(&self) {
        // Failures are logged inside; the screen still renders.
        let _ = self.load_history().await;
    }

    /// Replace the cache with the server's list. On failure the previous
    /// cache stays, except after a 401, which discards it.
    pub async fn load_history(&self) -> Result<usize, ClientError> {
        match self.api.get_history().await {
            Ok(entries) => {
                let count = entries.len();
                self.lock().history = entries;
                Ok(count)
            }
            Err(e) => {
                tracing::error!(error = %e, "Error loading history");
                Err(e)
            }
        }
    }

    /// Delete an entry on the server, then drop it from the cache.
    pub async fn delete_history(&self, id: u64) -> Result<(), ClientError> {
        match self.api.delete_history(id).await {
            Ok(_) => {
                self.lock().history.retain(|entry| entry.id != id);
                Ok(())
            }
            Err(e) => {
                tracing::error!(history_id = id, error = %e, "Error deleting history");
                Err(e)
            }
        }
    }

    // ─── Optimize ────────────────────────────────────────────────────────────

    /// Submit the current draft.
    pub async fn submit(&self) -> OptimizeOutcome {
        let Draft { code, language } = self.lock().draft.clone();
        self.optimize(&code, &language).await
    }

    /// Send `code` for optimization and refresh history.
    pub async fn optimize(&self, code: &str, language: &str) -> OptimizeOutcome {
        {
            let mut state = self.lock();
            if code.trim().is_empty() {
                state.notice = Some(EMPTY_CODE_NOTICE.to_string());
                return OptimizeOutcome::Rejected(EMPTY_CODE_NOTICE.to_string());
            }
            if state.busy {
                return OptimizeOutcome::Busy;
            }
            state.busy = true;
            state.notice = None;
            state.suggestions = ANALYZING_PLACEHOLDER.to_string();
        }
        let _busy = BusyGuard { workspace: self };

        match self.api.optimize(code, language).await {
            Ok(response) => {
                let text = suggestion_text(&response);
                self.lock().suggestions = text.clone();
                // The history reload logs its own failure; the result stands.
                let _ = self.load_history().await;
                OptimizeOutcome::Completed(text)
            }
            Err(e) => {
                tracing::error!(error = %e, "Error optimizing code");
                let text = format!("Error: {}", e.user_message());
                self.lock().suggestions = text.clone();
                OptimizeOutcome::Failed(text)
            }
        }
    }
}

/// Text for the suggestions panel: suggestions, else optimized code, else a
/// placeholder.
fn suggestion_text(response: &OptimizeResponse) -> String {
    [&response.suggestions, &response.optimized_code]
        .into_iter()
        .find(|text| !text.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| NO_SUGGESTIONS_PLACEHOLDER.to_string())
}
