//! Minimal OpenAI client for our use-cases.
//!
//! We call chat.completions in JSON-object mode (generation, grading) and the
//! embeddings endpoint (dedup). Calls are instrumented and log model names,
//! latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::error::{LlmError, PipelineError};
use crate::gateway::{EmbeddingProvider, FreeGrader, ProblemGenerator};

const GENERATION_TEMPERATURE: f32 = 0.3;
const GRADING_TEMPERATURE: f32 = 0.0;

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub gen_model: String,
  pub embed_model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let gen_model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
    let embed_model =
      std::env::var("OPENAI_EMBED_MODEL").unwrap_or_else(|_| "text-embedding-3-small".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(120))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, gen_model, embed_model })
  }

  async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<reqwest::Response, LlmError> {
    let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
    let res = self.client.post(&url)
      .header(USER_AGENT, "sakumon-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(body).send().await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      return Err(LlmError::Api { status, message });
    }
    Ok(res)
  }

  /// JSON-object chat completion. Returns the raw message text; parsing is the caller's job.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.gen_model))]
  async fn chat_json_text(&self, system: Option<&str>, user: &str, temperature: f32) -> Result<String, LlmError> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system {
      messages.push(ChatMessageReq { role: "system".into(), content: system.into() });
    }
    messages.push(ChatMessageReq { role: "user".into(), content: user.into() });

    let req = ChatCompletionRequest {
      model: self.gen_model.clone(),
      messages,
      temperature,
      response_format: Some(ResponseFormat { r#type: "json_object".into() }),
    };

    let start = Instant::now();
    let res = self.post("chat/completions", &req).await;
    let body: ChatCompletionResponse = match res {
      Ok(r) => r.json().await.map_err(|e| LlmError::Parse(e.to_string()))?,
      Err(e) => {
        error!(elapsed = ?start.elapsed(), error = %e, "Chat completion failed");
        return Err(e);
      }
    };
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.into_iter().next()
      .and_then(|c| c.message.content)
      .unwrap_or_default();
    info!(elapsed = ?start.elapsed(), response_len = text.len(), "Chat completion received");
    Ok(text)
  }

  #[instrument(level = "info", skip(self, inputs), fields(model = %self.embed_model, count = inputs.len()))]
  async fn embeddings(&self, inputs: &[String]) -> Result<Vec<Vec<f64>>, LlmError> {
    let req = EmbeddingRequest { model: &self.embed_model, input: inputs };
    let start = Instant::now();
    let body: EmbeddingResponse = self.post("embeddings", &req).await?
      .json().await.map_err(|e| LlmError::Parse(e.to_string()))?;

    let mut data = body.data;
    data.sort_by_key(|d| d.index);
    let vectors: Vec<Vec<f64>> = data.into_iter().map(|d| d.embedding).collect();
    info!(elapsed = ?start.elapsed(), vectors = vectors.len(), dim = vectors.first().map_or(0, Vec::len), "Embeddings received");
    Ok(vectors)
  }
}

#[async_trait]
impl ProblemGenerator for OpenAI {
  async fn generate_raw(&self, system: &str, user: &str) -> Result<String, LlmError> {
    self.chat_json_text(Some(system), user, GENERATION_TEMPERATURE).await
  }
}

#[async_trait]
impl EmbeddingProvider for OpenAI {
  async fn embed(&self, prompts: &[String]) -> Result<Vec<Vec<f64>>, PipelineError> {
    Ok(self.embeddings(prompts).await?)
  }
}

#[async_trait]
impl FreeGrader for OpenAI {
  async fn grade_raw(&self, prompt: &str) -> Result<String, LlmError> {
    self.chat_json_text(None, prompt, GRADING_TEMPERATURE).await
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

// --- Embedding DTOs ---

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
  model: &'a str,
  input: &'a [String],
}
#[derive(Deserialize)]
struct EmbeddingResponse { data: Vec<EmbeddingData> }
#[derive(Deserialize)]
struct EmbeddingData {
  #[serde(default)] index: usize,
  embedding: Vec<f64>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
