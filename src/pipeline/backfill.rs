//! Tops the kept list back up to the requested count.
//!
//! Re-admission is positional: `original[kept.len()]` is appended until the
//! target is met or the original list runs out. This can bring back an item
//! that dedup dropped, or repeat one that is already kept.

use tracing::debug;

use crate::domain::Problem;

pub fn select_backfill(mut kept: Vec<Problem>, original: &[Problem], target: usize) -> Vec<Problem> {
  let before = kept.len();
  while kept.len() < target && kept.len() < original.len() {
    kept.push(original[kept.len()].clone());
  }
  kept.truncate(target);
  if kept.len() != before {
    debug!(target: "worksheet", before, after = kept.len(), target, "backfill applied");
  }
  kept
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ProblemKind;

  fn items(n: usize) -> Vec<Problem> {
    (1..=n)
      .map(|i| Problem {
        kind: ProblemKind::Mcq,
        prompt: format!("Q{}", i),
        choices: Some(vec!["a".into(), "b".into()]),
        answer: "a".into(),
        explanation: None,
        difficulty: None,
        objectives: None,
        rubric: None,
        meta: Default::default(),
      })
      .collect()
  }

  fn prompts(v: &[Problem]) -> Vec<&str> {
    v.iter().map(|p| p.prompt.as_str()).collect()
  }

  #[test]
  fn restores_count_by_original_position() {
    let original = items(12);
    // Q3, Q5, Q8, Q9, Q11 were dropped.
    let kept: Vec<_> = [1, 2, 4, 6, 7, 10, 12].iter().map(|&i| original[i - 1].clone()).collect();
    let out = select_backfill(kept, &original, 10);
    assert_eq!(out.len(), 10);
    assert_eq!(
      prompts(&out),
      ["Q1", "Q2", "Q4", "Q6", "Q7", "Q10", "Q12", "Q8", "Q9", "Q10"]
    );
  }

  #[test]
  fn limited_by_original_length() {
    let original = items(4);
    let kept = vec![original[0].clone(), original[2].clone()];
    let out = select_backfill(kept, &original, 10);
    assert_eq!(prompts(&out), ["Q1", "Q3", "Q3", "Q4"]);
  }

  #[test]
  fn truncates_to_target() {
    let original = items(12);
    let out = select_backfill(original.clone(), &original, 10);
    assert_eq!(out.len(), 10);
    assert_eq!(out, original[..10].to_vec());
  }

  #[test]
  fn empty_stays_empty() {
    assert!(select_backfill(Vec::new(), &[], 10).is_empty());
  }
}
