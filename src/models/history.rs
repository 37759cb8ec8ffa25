// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Code optimization history models.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One optimization run, stored in the `code_history` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: u64,
    /// Owner (users collection `id`)
    pub user_id: u64,
    pub language: String,
    pub original_code: String,
    pub optimized_code: String,
    /// Full LLM response text
    pub optimization_suggestions: String,
    /// RFC3339, millisecond precision (sortable)
    pub created_at: String,
}

/// History entry as returned by `GET /history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HistoryEntry {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub language: String,
    pub original_code: String,
    pub optimization_suggestions: String,
    pub optimized_code: String,
    pub created_at: String,
}

impl From<HistoryRecord> for HistoryEntry {
    fn from(record: HistoryRecord) -> Self {
        Self {
            id: record.id,
            language: record.language,
            original_code: record.original_code,
            optimization_suggestions: record.optimization_suggestions,
            optimized_code: record.optimized_code,
            created_at: record.created_at,
        }
    }
}

/// `POST /optimize` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub code: String,
    pub language: String,
}

/// `POST /optimize` response body.
///
/// Both text fields default to empty so a client can fall back from one to
/// the other.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct OptimizeResponse {
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub id: Option<u64>,
    #[serde(default)]
    pub optimized_code: String,
    #[serde(default)]
    pub suggestions: String,
}
