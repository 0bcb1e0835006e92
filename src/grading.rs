//! Answer grading: exact-match for multiple choice, LLM-suggested mark for free response.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::config::Prompts;
use crate::domain::ProblemKind;
use crate::error::LlmError;
use crate::gateway::FreeGrader;
use crate::state::StoredProblem;
use crate::util::fill_template;

pub const FALLBACK_COMMENT: &str = "観点に照らして一部不十分です。";

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
  pub problem_id: String,
  pub answer: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct McqDetail {
  pub problem_id: String,
  pub correct: bool,
  pub expected: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct McqGrade {
  pub score: usize,
  pub total: usize,
  pub details: Vec<McqDetail>,
}

/// Correct iff the problem exists, is mcq, and the answer matches exactly.
pub fn grade_mcq(answers: &[SubmittedAnswer], problems: &[StoredProblem]) -> McqGrade {
  let key: HashMap<&str, &StoredProblem> = problems.iter().map(|p| (p.id.as_str(), p)).collect();
  let details: Vec<McqDetail> = answers
    .iter()
    .map(|a| {
      let p = key.get(a.problem_id.as_str());
      let correct = p.map_or(false, |p| p.problem.kind == ProblemKind::Mcq && p.problem.answer == a.answer);
      McqDetail {
        problem_id: a.problem_id.clone(),
        correct,
        expected: p.map(|p| p.problem.answer.clone()),
      }
    })
    .collect();
  McqGrade {
    score: details.iter().filter(|d| d.correct).count(),
    total: answers.len(),
    details,
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mark {
  #[serde(rename = "○")]
  Good,
  #[serde(rename = "△")]
  Partial,
  #[serde(rename = "×")]
  Wrong,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FreeGrade {
  pub mark: Mark,
  pub comment: String,
}

/// Lenient parse of the grader's JSON; gaps fall back to △ and a stock comment.
pub fn parse_free_grade(raw: &str) -> FreeGrade {
  #[derive(Deserialize, Default)]
  struct Loose {
    #[serde(default)] mark: Option<serde_json::Value>,
    #[serde(default)] comment: Option<serde_json::Value>,
  }
  let loose: Loose = serde_json::from_str(raw).unwrap_or_else(|e| {
    warn!(target: "grading", error = %e, "grader output is not JSON");
    Loose::default()
  });
  let mark = loose
    .mark
    .and_then(|m| serde_json::from_value::<Mark>(m).ok())
    .unwrap_or(Mark::Partial);
  let comment = match loose.comment {
    Some(serde_json::Value::String(s)) if !s.is_empty() => s,
    _ => FALLBACK_COMMENT.to_string(),
  };
  FreeGrade { mark, comment }
}

#[instrument(level = "info", skip(grader, prompts, answer, rubric), fields(answer_len = answer.len()))]
pub async fn grade_free(
  grader: &dyn FreeGrader,
  prompts: &Prompts,
  answer: &str,
  rubric: &serde_json::Value,
) -> Result<FreeGrade, LlmError> {
  let rubric_json = rubric.to_string();
  let prompt = fill_template(&prompts.grade_free_template, &[("rubric_json", &rubric_json), ("answer", answer)]);
  let raw = grader.grade_raw(&prompt).await?;
  Ok(parse_free_grade(&raw))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Problem;

  fn stored(id: &str, kind: ProblemKind, answer: &str) -> StoredProblem {
    StoredProblem {
      id: id.into(),
      worksheet_id: "w1".into(),
      position: 1,
      problem: Problem {
        kind,
        prompt: "p".into(),
        choices: None,
        answer: answer.into(),
        explanation: None,
        difficulty: None,
        objectives: None,
        rubric: None,
        meta: Default::default(),
      },
    }
  }

  fn ans(id: &str, a: &str) -> SubmittedAnswer {
    SubmittedAnswer { problem_id: id.into(), answer: a.into() }
  }

  #[test]
  fn mcq_scores_exact_matches_only() {
    let problems = vec![
      stored("p1", ProblemKind::Mcq, "2"),
      stored("p2", ProblemKind::Mcq, "H2O"),
      stored("p3", ProblemKind::Free, "自由記述"),
    ];
    let g = grade_mcq(
      &[ans("p1", "2"), ans("p2", "h2o"), ans("p3", "自由記述"), ans("nope", "x")],
      &problems,
    );
    assert_eq!(g.score, 1);
    assert_eq!(g.total, 4);
    assert!(g.details[0].correct);
    assert!(!g.details[1].correct);
    assert_eq!(g.details[1].expected.as_deref(), Some("H2O"));
    assert!(!g.details[2].correct);
    assert_eq!(g.details[3].expected, None);
  }

  #[test]
  fn free_grade_parses_marks() {
    let g = parse_free_grade(r#"{"mark":"○","comment":"定義と根拠が明確です。"}"#);
    assert_eq!(g, FreeGrade { mark: Mark::Good, comment: "定義と根拠が明確です。".into() });
    assert_eq!(parse_free_grade(r#"{"mark":"×","comment":"誤り"}"#).mark, Mark::Wrong);
  }

  #[test]
  fn free_grade_falls_back() {
    let g = parse_free_grade("not json");
    assert_eq!(g.mark, Mark::Partial);
    assert_eq!(g.comment, FALLBACK_COMMENT);

    let g = parse_free_grade(r#"{"mark":"A","comment":""}"#);
    assert_eq!(g.mark, Mark::Partial);
    assert_eq!(g.comment, FALLBACK_COMMENT);
  }

  #[test]
  fn mark_serializes_as_symbol() {
    assert_eq!(serde_json::to_string(&Mark::Good).unwrap(), "\"○\"");
  }
}
