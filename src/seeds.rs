//! Built-in content: the subject/unit catalog, per-subject generation hints,
//! and a minimal question bank.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Criterion, Problem, ProblemKind, Rubric};

pub const SUBJECTS: [&str; 3] = ["数学", "理科", "社会"];

/// Units offered per subject.
pub fn units() -> BTreeMap<&'static str, Vec<&'static str>> {
  BTreeMap::from([
    ("数学", vec!["一次関数"]),
    ("理科", vec!["化学式"]),
    ("社会", vec!["太平洋戦争"]),
  ])
}

/// Focus points and distractor strategies the generator is told about per subject.
/// Config may add or override entries.
pub fn subject_hints() -> BTreeMap<String, String> {
  BTreeMap::from([
    ("数学".to_string(), "重点: 傾きと切片, 直線の式, 交点計算。ダミー: 単位/符号/係数の取り違え。".to_string()),
    ("理科".to_string(), "重点: 化学式の表記・式量・係数合わせ。ダミー: 係数過不足・価数取り違え。".to_string()),
    ("社会".to_string(), "重点: 年代・出来事・用語・因果。ダミー: 年号シャッフル・誤因果。".to_string()),
  ])
}

/// A ready-made problem teachers can search for and reuse.
#[derive(Clone, Debug, Serialize)]
pub struct BankItem {
  pub id: String,
  pub subject: String,
  pub unit: String,
  pub tags: Vec<String>,
  #[serde(rename = "type")]
  pub kind: ProblemKind,
  pub payload: Problem,
}

fn strings(v: &[&str]) -> Vec<String> {
  v.iter().map(|s| s.to_string()).collect()
}

fn rubric(criteria: &[(&str, i32)]) -> Rubric {
  Rubric {
    max_points: criteria.iter().map(|(_, p)| p).sum(),
    criteria: criteria.iter().map(|(name, points)| Criterion { name: name.to_string(), desc: None, points: *points }).collect(),
  }
}

fn mcq(prompt: String, choices: &[&str], answer: &str, explanation: &str, objectives: Option<&[&str]>) -> Problem {
  Problem {
    kind: ProblemKind::Mcq,
    prompt,
    choices: Some(strings(choices)),
    answer: answer.into(),
    explanation: Some(explanation.into()),
    difficulty: Some(1),
    objectives: objectives.map(strings),
    rubric: None,
    meta: Default::default(),
  }
}

fn free(prompt: String, answer: &str, explanation: &str, criteria: &[(&str, i32)]) -> Problem {
  Problem {
    kind: ProblemKind::Free,
    prompt,
    choices: None,
    answer: answer.into(),
    explanation: Some(explanation.into()),
    difficulty: None,
    objectives: None,
    rubric: Some(rubric(criteria)),
    meta: Default::default(),
  }
}

/// Seed bank: per unit, four mcq followed by two free items.
pub fn bank_items() -> Vec<BankItem> {
  let mut groups: Vec<(&str, &str, &[&str], Problem)> = Vec::new();
  for i in 0..4 {
    groups.push(("数学", "一次関数", &["一次関数", "傾き", "切片"],
      mcq(format!("直線 y=2x+{} の傾きは？", i), &["1", "2", "-2", "0"], "2", "y=ax+b で a が傾き。", Some(&["傾きの理解"][..]))));
  }
  for i in 0..2 {
    groups.push(("数学", "一次関数", &["交点"],
      free(format!("直線 y=3x-1 と y=x+{} の交点を求めよ。", i), "x=… , y=…", "連立で解く。", &[("立式", 2), ("計算", 2), ("表記", 1)])));
  }
  for _ in 0..4 {
    groups.push(("理科", "化学式", &["式量"],
      mcq("水(H2O)の式量は？(H=1,O=16)".into(), &["18", "17", "20", "16"], "18", "2*1 + 16 = 18", None)));
  }
  for _ in 0..2 {
    groups.push(("理科", "化学式", &["係数合わせ"],
      free("反応の係数を最簡にせよ: H2 + O2 → H2O".into(), "2H2 + O2 → 2H2O", "H 原子数をそろえる。", &[("保存則", 3), ("表記", 2)])));
  }
  for _ in 0..4 {
    groups.push(("社会", "太平洋戦争", &["年表", "出来事"],
      mcq("真珠湾攻撃が行われたのは西暦何年？".into(), &["1941", "1939", "1945", "1942"], "1941", "1941年12月。", None)));
  }
  for _ in 0..2 {
    groups.push(("社会", "太平洋戦争", &["因果"],
      free("ミッドウェー海戦の結果が戦局に与えた影響を80字で述べよ。".into(), "日本の攻勢は後退し主導権が連合国側へ傾いた。", "空母喪失が転機。", &[("事実", 2), ("因果", 2), ("表現", 1)])));
  }

  groups
    .into_iter()
    .enumerate()
    .map(|(i, (subject, unit, tags, payload))| BankItem {
      id: format!("bank-{}", i + 1),
      subject: subject.into(),
      unit: unit.into(),
      tags: strings(tags),
      kind: payload.kind,
      payload,
    })
    .collect()
}
