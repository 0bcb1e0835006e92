//! Error types for worksheet generation and grading.
//!
//! - `PipelineError`: the core pipeline's only failure (embedding gateway).
//! - `LlmError`: chat/embedding HTTP calls to the model provider.
//! - `GenerationError`: everything a generation request can fail with.

use thiserror::Error;

/// Errors raised while running the validation/dedup pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("Embedding provider unavailable: {0}")]
  EmbeddingUnavailable(String),
}

/// Errors that can occur while talking to the LLM provider.
#[derive(Debug, Error)]
pub enum LlmError {
  #[error("LLM gateway not configured (OPENAI_API_KEY is not set)")]
  NotConfigured,

  #[error("HTTP request failed: {0}")]
  Request(String),

  #[error("OpenAI HTTP {status}: {message}")]
  Api { status: u16, message: String },

  #[error("Failed to parse LLM response: {0}")]
  Parse(String),
}

impl From<reqwest::Error> for LlmError {
  fn from(e: reqwest::Error) -> Self {
    LlmError::Request(e.to_string())
  }
}

impl From<LlmError> for PipelineError {
  fn from(e: LlmError) -> Self {
    PipelineError::EmbeddingUnavailable(e.to_string())
  }
}

/// Request-level failure of a worksheet generation.
#[derive(Debug, Error)]
pub enum GenerationError {
  #[error("Generation call failed: {0}")]
  Llm(#[from] LlmError),

  #[error(transparent)]
  Pipeline(#[from] PipelineError),
}
