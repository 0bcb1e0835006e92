//! Structural checks for multiple-choice items.
//!
//! Duplicate choices are repaired; every other finding is only logged.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{Problem, ProblemKind};

/// Validator output. `items` has the same length and order as the input.
#[derive(Debug, Default)]
pub struct Validated {
  pub items: Vec<Problem>,
  pub issues: Vec<String>,
}

pub fn ensure_mcq_validity(items: Vec<Problem>) -> Validated {
  let mut issues = Vec::new();
  let items = items
    .into_iter()
    .enumerate()
    .map(|(i, p)| check_item(i + 1, p, &mut issues))
    .collect();
  debug!(target: "worksheet", issues = issues.len(), "mcq validation done");
  Validated { items, issues }
}

fn check_item(idx: usize, mut p: Problem, issues: &mut Vec<String>) -> Problem {
  if p.kind != ProblemKind::Mcq {
    return p;
  }
  let choices = match p.choices.take() {
    Some(c) if c.len() >= 2 => c,
    other => {
      issues.push(format!("Q{idx}: choices が不足しています"));
      p.choices = other;
      return p;
    }
  };

  if !choices.contains(&p.answer) {
    issues.push(format!("Q{idx}: answer が choices に含まれていません"));
  }

  let before = choices.len();
  let mut seen = HashSet::new();
  let unique: Vec<String> = choices.into_iter().filter(|c| seen.insert(c.clone())).collect();
  if unique.len() != before {
    issues.push(format!("Q{idx}: choices に重複があります"));
  }
  p.choices = Some(unique);
  p
}

#[cfg(test)]
mod tests {
  use super::*;

  fn mcq(choices: Option<&[&str]>, answer: &str) -> Problem {
    Problem {
      kind: ProblemKind::Mcq,
      prompt: "直線 y=2x+1 の傾きは？".into(),
      choices: choices.map(|c| c.iter().map(|s| s.to_string()).collect()),
      answer: answer.into(),
      explanation: None,
      difficulty: Some(2),
      objectives: None,
      rubric: None,
      meta: Default::default(),
    }
  }

  #[test]
  fn clean_item_is_untouched() {
    let p = mcq(Some(&["1", "2", "3", "4"]), "2");
    let out = ensure_mcq_validity(vec![p.clone()]);
    assert_eq!(out.items, vec![p]);
    assert!(out.issues.is_empty());
  }

  #[test]
  fn duplicate_choices_keep_first_occurrence() {
    let out = ensure_mcq_validity(vec![mcq(Some(&["A", "B", "A", "C"]), "B")]);
    assert_eq!(out.items[0].choices.as_deref(), Some(&["A".to_string(), "B".into(), "C".into()][..]));
    assert_eq!(out.issues, vec!["Q1: choices に重複があります".to_string()]);
  }

  #[test]
  fn missing_answer_is_flagged_not_fixed() {
    let out = ensure_mcq_validity(vec![mcq(Some(&["A", "B"]), "Z")]);
    assert_eq!(out.issues, vec!["Q1: answer が choices に含まれていません".to_string()]);
    assert_eq!(out.items[0].choices.as_deref(), Some(&["A".to_string(), "B".into()][..]));
    assert_eq!(out.items[0].answer, "Z");
  }

  #[test]
  fn too_few_choices_skips_other_checks() {
    let out = ensure_mcq_validity(vec![
      mcq(None, "A"),
      mcq(Some(&["A"]), "Z"),
    ]);
    assert_eq!(
      out.issues,
      vec!["Q1: choices が不足しています".to_string(), "Q2: choices が不足しています".into()]
    );
    assert_eq!(out.items[0].choices, None);
    assert_eq!(out.items[1].choices.as_deref(), Some(&["A".to_string()][..]));
  }

  #[test]
  fn both_issues_reported_in_order_with_position() {
    let free = Problem { kind: ProblemKind::Free, choices: None, ..mcq(None, "x") };
    let out = ensure_mcq_validity(vec![free.clone(), mcq(Some(&["A", "A", "B"]), "C")]);
    assert_eq!(out.items[0], free);
    assert_eq!(
      out.issues,
      vec![
        "Q2: answer が choices に含まれていません".to_string(),
        "Q2: choices に重複があります".into(),
      ]
    );
  }
}
