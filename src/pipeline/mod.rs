//! Post-generation pipeline for candidate problems.
//!
//! raw → validate → rubric → embed (external) → dedup → backfill → worksheet.
//!
//! Every stage except the embedding call is a pure in-memory transformation.
//! The embedding call is the only failure point and it fails the whole run.

pub mod backfill;
pub mod dedup;
pub mod parse;
pub mod rubric;
pub mod validate;

use tracing::{info, instrument};

use crate::domain::{Problem, Worksheet};
use crate::error::PipelineError;
use crate::gateway::EmbeddingProvider;

pub use backfill::select_backfill;
pub use dedup::{cosine, dedupe, DUPLICATE_THRESHOLD};
pub use parse::parse_generated_items;
pub use rubric::{complete_rubrics, default_rubric};
pub use validate::ensure_mcq_validity;

#[instrument(level = "info", skip(raw, target, embedder), fields(candidates = raw.len(), target_count = target))]
pub async fn finalize(
  raw: Vec<Problem>,
  target: usize,
  embedder: &dyn EmbeddingProvider,
) -> Result<Worksheet, PipelineError> {
  if raw.is_empty() {
    return Ok(Worksheet::default());
  }

  let checked = ensure_mcq_validity(raw);
  let with_rubric = complete_rubrics(checked.items);

  let prompts: Vec<String> = with_rubric.iter().map(|p| p.prompt.clone()).collect();
  let vectors = embedder.embed(&prompts).await?;
  if vectors.len() != prompts.len() {
    return Err(PipelineError::EmbeddingUnavailable(format!(
      "expected {} vectors, got {}",
      prompts.len(),
      vectors.len()
    )));
  }

  let deduped = dedupe(with_rubric.clone(), vectors);
  let items = select_backfill(deduped.kept, &with_rubric, target);

  let mut issues = checked.issues;
  issues.extend(deduped.issues);
  info!(target: "worksheet", items = items.len(), issues = issues.len(), "pipeline finished");
  Ok(Worksheet { items, issues })
}
