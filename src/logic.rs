//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - Building the generation prompts from a `GenerateInput`
//!   - Running generation → parse → pipeline for one request
//!   - Grading free-response answers through the configured grader

use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::domain::{GenerateInput, Worksheet};
use crate::error::{GenerationError, LlmError, PipelineError};
use crate::gateway::{EmbeddingProvider, ProblemGenerator};
use crate::grading::{self, FreeGrade};
use crate::pipeline::{finalize, parse_generated_items};
use crate::state::AppState;
use crate::util::fill_template;

/// System and user prompts for one generation request.
pub fn build_generation_prompts(input: &GenerateInput, prompts: &Prompts) -> (String, String) {
  let ratio = input.ratio();
  let system = fill_template(
    &prompts.generation_system_template,
    &[("mcq", &ratio.mcq.to_string()), ("free", &ratio.free.to_string())],
  );

  let joined = |v: &Option<Vec<String>>| v.as_ref().filter(|v| !v.is_empty()).map(|v| v.join(", "));
  let lines = [
    Some(format!("subject: {} / unit: {}", input.subject, input.unit)),
    input.range.as_ref().filter(|r| !r.is_empty()).map(|r| format!("range: {}", r)),
    joined(&input.keywords).map(|k| format!("keywords: {}", k)),
    joined(&input.objectives).map(|o| format!("objectives: {}", o)),
    Some(prompts.style_hints.clone()),
    prompts.subject_hints.get(&input.subject).cloned(),
    Some(prompts.output_rule.clone()),
  ];
  let user = lines.into_iter().flatten().filter(|l| !l.is_empty()).collect::<Vec<_>>().join("\n");
  (system, user)
}

/// One generation request: prompt the model, parse, run the pipeline.
#[instrument(level = "info", skip_all, fields(subject = %input.subject, unit = %input.unit))]
pub async fn generate_worksheet(
  input: &GenerateInput,
  prompts: &Prompts,
  generator: &dyn ProblemGenerator,
  embedder: &dyn EmbeddingProvider,
) -> Result<Worksheet, GenerationError> {
  let (system, user) = build_generation_prompts(input, prompts);
  let raw = generator.generate_raw(&system, &user).await?;
  let candidates = parse_generated_items(&raw);
  info!(target: "worksheet", candidates = candidates.len(), raw_len = raw.len(), "model draft parsed");
  let target = input.ratio().target();
  Ok(finalize(candidates, target, embedder).await?)
}

/// Generation through the gateways held in `AppState`.
pub async fn generate_with_state(state: &AppState, input: &GenerateInput) -> Result<Worksheet, GenerationError> {
  let Some(generator) = state.gateways.generator.as_deref() else {
    error!(target: "worksheet", "generation requested without a configured generator");
    return Err(LlmError::NotConfigured.into());
  };
  let Some(embedder) = state.gateways.embedder.as_deref() else {
    error!(target: "worksheet", "generation requested without a configured embedder");
    return Err(PipelineError::EmbeddingUnavailable(LlmError::NotConfigured.to_string()).into());
  };
  generate_worksheet(input, &state.prompts, generator, embedder).await
}

pub async fn grade_free_with_state(state: &AppState, answer: &str, rubric: &serde_json::Value) -> Result<FreeGrade, LlmError> {
  let grader = state.gateways.grader.as_deref().ok_or(LlmError::NotConfigured)?;
  grading::grade_free(grader, &state.prompts, answer, rubric).await
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Ratio;

  fn input() -> GenerateInput {
    GenerateInput {
      subject: "数学".into(),
      unit: "一次関数".into(),
      range: Some("教科書 p.40-55".into()),
      ratio: Some(Ratio { mcq: 5, free: 2 }),
      keywords: Some(vec!["傾き".into(), "切片".into()]),
      objectives: Some(vec![]),
    }
  }

  #[test]
  fn prompts_carry_ratio_and_request_fields() {
    let (system, user) = build_generation_prompts(&input(), &Prompts::default());
    assert!(system.contains("mcq 5問 / free 2問"));
    let lines: Vec<_> = user.lines().collect();
    assert_eq!(lines[0], "subject: 数学 / unit: 一次関数");
    assert_eq!(lines[1], "range: 教科書 p.40-55");
    assert_eq!(lines[2], "keywords: 傾き, 切片");
    assert!(!user.contains("objectives:"));
    assert!(user.contains("重点: 傾きと切片"));
    assert!(lines.last().unwrap().starts_with("出力はJSONのみ"));
  }

  #[test]
  fn unknown_subject_has_no_hint_line() {
    let mut i = input();
    i.subject = "英語".into();
    i.range = None;
    i.ratio = None;
    let (system, user) = build_generation_prompts(&i, &Prompts::default());
    assert!(system.contains("mcq 7問 / free 3問"));
    assert_eq!(user.lines().count(), 4);
  }
}
