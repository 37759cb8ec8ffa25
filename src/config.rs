// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup. A `.env` file is honoured for local
//! development.

use std::env;

/// Default token lifetime: one hour.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 60 * 60;

/// Which persistence backend to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-process store; contents are lost on restart.
    Memory,
    /// Firestore in the given GCP project.
    Firestore { project_id: String },
}

impl StorageBackend {
    /// Short name for logs and the health endpoint.
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Firestore { .. } => "firestore",
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Session token lifetime in seconds
    pub token_ttl_secs: u64,
    /// Base URL of the OpenAI-compatible API
    pub openai_base_url: String,
    /// Chat model used for optimization
    pub openai_model: String,
    /// Persistence backend
    pub storage: StorageBackend,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// API key for the LLM provider
    pub openai_api_key: String,
}

impl Config {
    /// Fixed configuration for tests. Points the optimizer at a closed port
    /// so nothing leaves the machine unless a test overrides it.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            openai_base_url: "http://127.0.0.1:9".to_string(),
            openai_model: "gpt-4".to_string(),
            storage: StorageBackend::Memory,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            openai_api_key: "test_openai_key".to_string(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let storage = match env::var("GCP_PROJECT_ID") {
            Ok(project_id) if !project_id.trim().is_empty() => StorageBackend::Firestore {
                project_id: project_id.trim().to_string(),
            },
            _ => StorageBackend::Memory,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: parse_or("PORT", 8080)?,
            token_ttl_secs: parse_or("TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?,
            openai_base_url: env::var("OPENAI_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4".to_string()),
            storage,

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            openai_api_key: env::var("OPENAI_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("OPENAI_API_KEY"))?,
        })
    }
}

/// Read `key` and parse it, falling back to `default` when unset.
fn parse_or<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(key, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
