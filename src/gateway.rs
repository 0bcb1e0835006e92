//! Capabilities the backend needs from a model provider.
//!
//! Each is injected into `AppState` by the caller; the pipeline never builds
//! a client on its own. `crate::openai::OpenAI` implements all three.

use async_trait::async_trait;

use crate::error::{LlmError, PipelineError};

/// Turns prompts into embedding vectors, one per prompt, same order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
  async fn embed(&self, prompts: &[String]) -> Result<Vec<Vec<f64>>, PipelineError>;
}

/// Drafts candidate problems. Returns the model's raw JSON text.
#[async_trait]
pub trait ProblemGenerator: Send + Sync {
  async fn generate_raw(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

/// Suggests a mark for a free-response answer. Returns raw JSON text.
#[async_trait]
pub trait FreeGrader: Send + Sync {
  async fn grade_raw(&self, prompt: &str) -> Result<String, LlmError>;
}
