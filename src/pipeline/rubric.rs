//! Default rubric for free-response items that arrive without one.

use crate::domain::{Criterion, Problem, ProblemKind, Rubric};

pub fn default_rubric() -> Rubric {
  let c = |name: &str, points, desc: &str| Criterion { name: name.into(), desc: Some(desc.into()), points };
  Rubric {
    max_points: 5,
    criteria: vec![
      c("定義の適切さ", 2, "用語・式の定義が正しい"),
      c("筋道・根拠", 2, "導出や因果の説明が一貫"),
      c("最終表現", 1, "記号・表記・年号などが正確"),
    ],
  }
}

pub fn complete_rubrics(items: Vec<Problem>) -> Vec<Problem> {
  items
    .into_iter()
    .map(|mut p| {
      if p.kind == ProblemKind::Free && p.rubric.is_none() {
        p.rubric = Some(default_rubric());
      }
      p
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(kind: ProblemKind, rubric: Option<Rubric>) -> Problem {
    Problem {
      kind,
      prompt: "化学式 H2O の式量を求めよ。".into(),
      choices: None,
      answer: "18".into(),
      explanation: None,
      difficulty: None,
      objectives: None,
      rubric,
      meta: Default::default(),
    }
  }

  #[test]
  fn default_rubric_shape() {
    let r = default_rubric();
    assert_eq!(r.max_points, 5);
    let names: Vec<_> = r.criteria.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["定義の適切さ", "筋道・根拠", "最終表現"]);
    assert_eq!(r.criteria.iter().map(|c| c.points).sum::<i32>(), 5);
    assert!(r.criteria.iter().all(|c| c.desc.is_some()));
  }

  #[test]
  fn only_bare_free_items_get_default() {
    let own = Rubric { max_points: 3, criteria: vec![] };
    let out = complete_rubrics(vec![
      item(ProblemKind::Free, Some(own.clone())),
      item(ProblemKind::Free, None),
      item(ProblemKind::Mcq, None),
    ]);
    assert_eq!(out.len(), 3);
    assert_eq!(out[0].rubric, Some(own));
    assert_eq!(out[1].rubric, Some(default_rubric()));
    assert_eq!(out[2].rubric, None);
  }
}
