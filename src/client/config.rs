// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration.
//!
//! The API base URL is resolved once, when the client is constructed.

use crate::config::ConfigError;
use std::env;
use std::path::PathBuf;

/// Backend used when `CODEOPT_API_URL` is unset (local development).
pub const DEV_API_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API origin, without trailing slash
    pub base_url: String,
    /// Token storage file
    pub token_file: PathBuf,
}

impl ClientConfig {
    /// Load from `CODEOPT_API_URL` and `CODEOPT_TOKEN_FILE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let base_url = env::var("CODEOPT_API_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEV_API_URL.to_string());

        let token_file = match env::var("CODEOPT_TOKEN_FILE") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
            _ => super::storage::FileTokenStorage::default_path()
                .ok_or(ConfigError::Missing("CODEOPT_TOKEN_FILE"))?,
        };

        Self::new(base_url, token_file)
    }

    /// Build a config, validating the base URL.
    pub fn new(base_url: impl Into<String>, token_file: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(&base_url.into())?;
        Ok(Self {
            base_url,
            token_file: token_file.into(),
        })
    }
}

/// Require an http(s) origin and strip trailing slashes.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|_| ConfigError::Invalid("CODEOPT_API_URL", raw.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid("CODEOPT_API_URL", raw.to_string()));
    }
    Ok(trimmed.to_string())
}
