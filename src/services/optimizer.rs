// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! LLM client for code optimization.
//!
//! Talks to any OpenAI-compatible chat-completions endpoint. The model is
//! asked for analysis, suggestions, a list of changes and a fenced block
//! with the optimized code.

use crate::config::Config;
use crate::error::AppError;
use crate::markup::extract_code_block;
use serde::{Deserialize, Serialize};

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 2000;

const SYSTEM_PROMPT: &str = "\
You review source code and suggest optimizations. Structure your answer as:

1. Code Analysis: what the code does, its structure, inefficiencies and \
likely bugs, and time/space complexity where it matters.
2. Optimization Suggestions: concrete improvements to logic and performance, \
better idioms, and error handling.
3. Changes Made: the key changes in the optimized version and why each helps.
4. Optimized Code: the improved version, with brief comments.

Use markdown. Keep explanations short. Always put the optimized code in a \
single fenced code block delimited by triple backticks.";

/// Result of one optimization call.
#[derive(Debug, Clone)]
pub struct Optimization {
    /// Full model response (markdown)
    pub suggestions: String,
    /// First fenced block of the response, or the submitted code if none
    pub optimized_code: String,
}

/// OpenAI-compatible chat client.
#[derive(Clone)]
pub struct OptimizerClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OptimizerClient {
    /// Create a client from explicit settings.
    pub fn new(base_url: impl Into<String>, api_key: String, model: String) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    /// Create a client from application config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
            config.openai_model.clone(),
        )
    }

    /// Ask the model to analyze and optimize `code`.
    pub async fn optimize(&self, code: &str, language: &str) -> Result<Optimization, AppError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Please analyze and optimize this {language} code:\n\n{code}"),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        tracing::debug!(model = %self.model, language, bytes = code.len(), "Requesting optimization");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Optimizer(e.to_string()))?;

        let completion: ChatResponse = self.check_response_json(response).await?;

        let suggestions = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Optimizer("Model returned no content".to_string()))?;

        let optimized_code = extract_code_block(&suggestions).unwrap_or_else(|| code.to_string());

        Ok(Optimization {
            suggestions,
            optimized_code,
        })
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Optimizer rate limit hit (429)");
            }

            // OpenAI-style errors carry a readable message
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);

            return Err(AppError::Optimizer(format!("HTTP {}: {}", status, message)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Optimizer(format!("JSON parse error: {}", e)))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_optimize_extracts_code_block() {
        let router = Router::new().route(
            "/chat/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "gpt-4");
                assert_eq!(body["messages"][0]["role"], "system");
                assert!(body["messages"][1]["content"]
                    .as_str()
                    .unwrap()
                    .contains("this python code"));
                Json(json!({
                    "choices": [{"message": {"content": "Use f-strings.\n```python\nprint(f\"{1}\")\n```"}}]
                }))
            }),
        );
        let base = serve(router).await;
        let client = OptimizerClient::new(base, "key".into(), "gpt-4".into());

        let result = client.optimize("print(1)", "python").await.unwrap();
        assert!(result.suggestions.starts_with("Use f-strings."));
        assert_eq!(result.optimized_code, "print(f\"{1}\")");
    }

    #[tokio::test]
    async fn test_optimize_without_block_keeps_original() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({"choices": [{"message": {"content": "Looks fine."}}]})) }),
        );
        let base = serve(router).await;
        let client = OptimizerClient::new(base, "key".into(), "gpt-4".into());

        let result = client.optimize("x = 1", "python").await.unwrap();
        assert_eq!(result.suggestions, "Looks fine.");
        assert_eq!(result.optimized_code, "x = 1");
    }

    #[tokio::test]
    async fn test_upstream_error_message_is_surfaced() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": {"message": "Incorrect API key provided"}})),
                )
            }),
        );
        let base = serve(router).await;
        let client = OptimizerClient::new(base, "bad".into(), "gpt-4".into());

        let err = client.optimize("x = 1", "python").await.unwrap_err();
        assert!(matches!(err, AppError::Optimizer(ref m) if m.contains("Incorrect API key")));
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let base = serve(router).await;
        let client = OptimizerClient::new(base, "key".into(), "gpt-4".into());

        assert!(client.optimize("x = 1", "python").await.is_err());
    }
}
