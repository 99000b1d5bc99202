use async_trait::async_trait;
use thiserror::Error;

/// Text-generation backend failures. All variants are recoverable per turn;
/// the runtime converts them into a fixed apology at the turn boundary.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("llm authentication failed: {0}")]
    Auth(String),
    #[error("llm rate limited: {0}")]
    RateLimited(String),
    #[error("llm transport failed: {0}")]
    Transport(String),
    #[error("llm returned a malformed response: {0}")]
    MalformedResponse(String),
    #[error("llm retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

/// Prompt-in, text-out completion capability with a bounded output budget
/// and configurable randomness.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, LlmError>;
}
