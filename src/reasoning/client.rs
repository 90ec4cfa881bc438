//! Generative reasoning backend client (chat-completions shape)

use super::extract;
use crate::config::ReasoningConfig;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Reasoning backend error types
#[derive(Debug, thiserror::Error)]
pub enum ReasoningError {
    #[error("reasoning backend is not configured")]
    NotConfigured,

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("upstream error: {0}")]
    UpstreamError(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

pub struct ReasoningClient {
    http: Client,
    config: ReasoningConfig,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    arguments: String,
}

impl ReasoningClient {
    pub fn new(config: ReasoningConfig) -> Result<Self, ReasoningError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ReasoningError::RequestFailed(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Whether a backend credential is available
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Call with a strict structured-output contract: the backend must
    /// answer through the named function and its arguments are returned
    /// verbatim as JSON.
    pub async fn structured_call(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        function_name: &str,
        parameters: Value,
    ) -> Result<Value, ReasoningError> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt }
            ],
            "tools": [{
                "type": "function",
                "function": {
                    "name": function_name,
                    "parameters": parameters,
                }
            }],
            "tool_choice": { "type": "function", "function": { "name": function_name } }
        });

        let response = self.call_with_retry(body).await?;

        let tool_call = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.tool_calls)
            .and_then(|mut calls| if calls.is_empty() { None } else { Some(calls.remove(0)) })
            .ok_or_else(|| {
                ReasoningError::InvalidResponse("no tool call in response".to_string())
            })?;

        serde_json::from_str(&tool_call.function.arguments)
            .map_err(|e| ReasoningError::InvalidResponse(e.to_string()))
    }

    /// Call expecting a JSON record in the free-text response. When the
    /// backend wraps the record in prose, the delimited block is
    /// extracted as an explicit, logged degraded path.
    pub async fn prompt_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Value, ReasoningError> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt }
            ],
            "temperature": self.config.temperature,
        });

        let response = self.call_with_retry(body).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                ReasoningError::InvalidResponse("no content in response".to_string())
            })?;

        extract::parse_structured(&content).ok_or_else(|| {
            ReasoningError::InvalidResponse("response contained no JSON record".to_string())
        })
    }

    async fn call_with_retry(&self, body: Value) -> Result<ChatResponse, ReasoningError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(ReasoningError::NotConfigured)?;

        let url = format!("{}/chat/completions", self.config.api_url);

        let mut attempt = 0;
        loop {
            attempt += 1;

            let result = self
                .http
                .post(&url)
                .bearer_auth(api_key.expose_secret())
                .json(&body)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!(attempt, "reasoning call succeeded");
                        return response
                            .json()
                            .await
                            .map_err(|e| ReasoningError::InvalidResponse(e.to_string()));
                    }

                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());

                    // 4xx is not transient, fail immediately
                    if status.is_client_error() || attempt > self.config.retry_attempts {
                        return Err(ReasoningError::UpstreamError(format!(
                            "Status {}: {}",
                            status, error_text
                        )));
                    }
                    warn!(attempt, status = %status, "reasoning call retrying");
                }
                Err(e) => {
                    if attempt > self.config.retry_attempts {
                        return Err(if e.is_timeout() {
                            ReasoningError::Timeout(e.to_string())
                        } else {
                            ReasoningError::RequestFailed(e.to_string())
                        });
                    }
                    warn!(attempt, "reasoning transport error, retrying: {}", e);
                }
            }

            tokio::time::sleep(self.backoff(attempt)).await;
        }
    }

    fn backoff(&self, attempt: usize) -> Duration {
        let multiplier = 2_u32.pow(attempt.saturating_sub(1) as u32);
        self.config.retry_backoff().saturating_mul(multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_client() {
        let client = ReasoningClient::new(ReasoningConfig::default()).unwrap();
        assert!(!client.is_configured());
    }

    #[tokio::test]
    async fn test_unconfigured_call_fails() {
        let client = ReasoningClient::new(ReasoningConfig::default()).unwrap();
        let result = client.prompt_json("system", "user").await;
        assert!(matches!(result, Err(ReasoningError::NotConfigured)));
    }

    #[test]
    fn test_backoff_doubles() {
        let client = ReasoningClient::new(ReasoningConfig::default()).unwrap();
        assert_eq!(client.backoff(1), Duration::from_millis(200));
        assert_eq!(client.backoff(2), Duration::from_millis(400));
    }
}
