//! Groq chat-completions client implementing the agent's [`LlmClient`]
//! capability. Transient backend failures (network, 429, 5xx) are retried
//! with bounded exponential backoff; auth failures and malformed bodies are
//! terminal for the call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use remindly_agent::llm::{LlmClient, LlmError};
use remindly_core::config::LlmConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub min_wait_secs: u64,
    pub max_wait_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, min_wait_secs: 2, max_wait_secs: 10 }
    }
}

impl RetryPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let wait_secs = self.min_wait_secs.saturating_mul(multiplier).min(self.max_wait_secs);
        Duration::from_secs(wait_secs)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Whether a failed attempt is worth retrying.
fn is_retryable(error: &LlmError) -> bool {
    matches!(error, LlmError::RateLimited(_) | LlmError::Transport(_))
}

fn classify_status(status: StatusCode, body_excerpt: &str) -> LlmError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return LlmError::Auth(format!("{status}: {body_excerpt}"));
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return LlmError::RateLimited(format!("{status}: {body_excerpt}"));
    }
    if status.is_server_error() {
        return LlmError::Transport(format!("{status}: {body_excerpt}"));
    }
    LlmError::MalformedResponse(format!("unexpected status {status}: {body_excerpt}"))
}

fn extract_content(body: &str) -> Result<String, LlmError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|err| LlmError::MalformedResponse(err.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::MalformedResponse("response carried no message content".to_string()))
}

pub struct GroqClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: SecretString,
    retry: RetryPolicy,
}

impl GroqClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| LlmError::Auth("llm.api_key is not configured".to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| LlmError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            retry: RetryPolicy {
                max_attempts: config.max_retries,
                min_wait_secs: config.retry_min_wait_secs,
                max_wait_secs: config.retry_max_wait_secs,
            },
        })
    }

    async fn attempt(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            max_tokens,
            temperature,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|err| LlmError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|err| LlmError::Transport(err.to_string()))?;

        if !status.is_success() {
            let excerpt: String = body.chars().take(200).collect();
            return Err(classify_status(status, &excerpt));
        }

        extract_content(&body)
    }
}

#[async_trait]
impl LlmClient for GroqClient {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let mut last_error = LlmError::Transport("no attempt was made".to_string());

        for attempt in 0..self.retry.max_attempts {
            match self.attempt(prompt, max_tokens, temperature).await {
                Ok(content) => {
                    debug!(
                        event_name = "llm.complete.ok",
                        attempt,
                        content_len = content.len(),
                        "completion succeeded"
                    );
                    return Ok(content);
                }
                Err(error) if is_retryable(&error) => {
                    let wait = self.retry.backoff(attempt);
                    warn!(
                        event_name = "llm.complete.retry",
                        attempt,
                        wait_secs = wait.as_secs(),
                        error = %error,
                        "transient completion failure, backing off"
                    );
                    last_error = error;
                    if attempt + 1 < self.retry.max_attempts {
                        tokio::time::sleep(wait).await;
                    }
                }
                Err(error) => return Err(error),
            }
        }

        Err(LlmError::RetriesExhausted {
            attempts: self.retry.max_attempts,
            last_error: last_error.to_string(),
        })
    }
}
