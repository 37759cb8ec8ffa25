// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client-side error type.

use reqwest::StatusCode;
use serde::Deserialize;

/// Errors returned by [`ApiClient`](super::http::ApiClient) calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never got a response (network, DNS, timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered 401.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-2xx answer.
    #[error("{message} (status {status})")]
    Api { status: StatusCode, message: String },

    /// A 2xx answer whose body did not match the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Text to show the user: the backend's message when there is one,
    /// otherwise the transport error text.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport(e) => e.to_string(),
            ClientError::Unauthorized(message) => message.clone(),
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Decode(e) => format!("Invalid response from server: {}", e),
        }
    }

    /// HTTP status, if the server answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
            ClientError::Decode(_) => None,
        }
    }

    /// Build an error from a non-2xx response body.
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| {
            format!("Request failed with status {}", status.as_u16())
        });

        if status == StatusCode::UNAUTHORIZED {
            ClientError::Unauthorized(message)
        } else {
            ClientError::Api { status, message }
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Pull `message`, else `error`, from a JSON error body.
fn extract_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .message
        .or(parsed.error)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}
