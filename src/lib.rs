// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Code Optimizer: LLM-backed code review with per-user history
//!
//! This crate provides the backend API that forwards submitted code to an
//! LLM for optimization suggestions and stores the results per user, plus
//! the typed client used by the `codeopt` terminal front end.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod markup;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use services::OptimizerClient;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub optimizer: OptimizerClient,
}
