// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page composition: picks the screen from the session and wires the
//! main-screen pieces together.

use crate::client::config::ClientConfig;
use crate::client::http::ApiClient;
use crate::client::panels::{HistoryPanel, SuggestionsPanel};
use crate::client::session::{AuthOutcome, SessionStatus, SessionStore};
use crate::client::workspace::Workspace;
use crate::models::UserProfile;
use std::sync::{Mutex, MutexGuard};

/// Screen to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Loading,
    Login,
    Main,
}

impl From<SessionStatus> for View {
    fn from(status: SessionStatus) -> Self {
        match status {
            SessionStatus::Loading => View::Loading,
            SessionStatus::Unauthenticated => View::Login,
            SessionStatus::Authenticated => View::Main,
        }
    }
}

pub struct App {
    api: ApiClient,
    session: SessionStore,
    workspace: Workspace,
    history_panel: Mutex<HistoryPanel>,
}

impl App {
    pub fn new(api: ApiClient) -> Self {
        Self {
            session: SessionStore::new(api.clone()),
            workspace: Workspace::new(api.clone()),
            history_panel: Mutex::new(HistoryPanel::new()),
            api,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(ApiClient::from_config(config))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn view(&self) -> View {
        self.session.status().into()
    }

    /// Resolve the stored session and, if it is valid, enter the main screen.
    pub async fn start(&self) -> View {
        self.session.initialize().await;
        self.enter_view().await
    }

    /// Log in and enter the main screen with a fresh workspace.
    pub async fn login(&self, username: &str, password: &str) -> AuthOutcome<UserProfile> {
        let outcome = self.session.login(username, password).await;
        if outcome.is_success() {
            self.leave_main();
            self.enter_view().await;
        }
        outcome
    }

    pub async fn register(&self, username: &str, password: &str) -> AuthOutcome<String> {
        self.session.register(username, password).await
    }

    pub fn logout(&self) {
        self.session.logout();
        self.leave_main();
    }

    /// Delete a history entry and keep the panel consistent.
    pub async fn delete_history(&self, id: u64) -> bool {
        let deleted = self.workspace.delete_history(id).await.is_ok();
        let entries = self.workspace.history();
        self.panel().retain(&entries);
        deleted
    }

    pub fn toggle_history(&self, id: u64) {
        self.panel().toggle(id);
    }

    pub fn render_suggestions(&self) -> SuggestionsPanel {
        SuggestionsPanel::new(&self.workspace.snapshot().suggestions)
    }

    pub fn render_history(&self) -> String {
        let entries = self.workspace.history();
        let mut panel = self.panel();
        panel.retain(&entries);
        panel.render(&entries)
    }

    /// Load history when the session is authenticated, and drop main-screen
    /// state when it is not (for example after the server rejected the token).
    async fn enter_view(&self) -> View {
        if self.view() == View::Main {
            self.workspace.mount().await;
        }
        // A 401 during the history load flips the session.
        let view = self.view();
        if view == View::Login {
            self.leave_main();
        }
        view
    }

    fn leave_main(&self) {
        self.workspace.reset();
        self.panel().collapse();
    }

    fn panel(&self) -> MutexGuard<'_, HistoryPanel> {
        self.history_panel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
