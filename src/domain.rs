//! Domain models: problem kinds, rubric, generated problems and generation requests.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Which kind of question is this?
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
  /// Multiple choice; `answer` must equal one of `choices`.
  Mcq,
  /// Free response, graded against a rubric.
  Free,
}

/// One named, weighted scoring criterion.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Criterion {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub desc: Option<String>,
  #[serde(deserialize_with = "whole_i32")]
  pub points: i32,
}

/// Scoring guide for free-response items.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Rubric {
  #[serde(default, deserialize_with = "whole_i32")] pub max_points: i32,
  #[serde(default)] pub criteria: Vec<Criterion>,
}

/// A problem as produced during generation, before it gets a durable id.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Problem {
  #[serde(rename = "type")]
  pub kind: ProblemKind,
  pub prompt: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub choices: Option<Vec<String>>,
  pub answer: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub explanation: Option<String>,
  #[serde(default, deserialize_with = "whole_opt_u8", skip_serializing_if = "Option::is_none")]
  pub difficulty: Option<u8>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub objectives: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rubric: Option<Rubric>,
  #[serde(default)]
  pub meta: serde_json::Map<String, serde_json::Value>,
}

impl Problem {
  /// Difficulty is either absent or within 1..=5.
  pub fn has_valid_difficulty(&self) -> bool {
    self.difficulty.map_or(true, |d| (1..=5).contains(&d))
  }
}

/// Integer from a JSON number, accepting whole floats like `2.0`.
fn whole_number<E: de::Error>(v: &Value) -> Result<i64, E> {
  let n = match v {
    Value::Number(n) => n,
    other => return Err(E::custom(format!("expected an integer, got {}", other))),
  };
  n.as_i64()
    .or_else(|| {
      n.as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
        .map(|f| f as i64)
    })
    .ok_or_else(|| E::custom(format!("expected an integer, got {}", n)))
}

fn whole_i32<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
  let n = whole_number::<D::Error>(&Value::deserialize(d)?)?;
  i32::try_from(n).map_err(de::Error::custom)
}

fn whole_opt_u8<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u8>, D::Error> {
  match Option::<Value>::deserialize(d)? {
    None | Some(Value::Null) => Ok(None),
    Some(v) => {
      let n = whole_number::<D::Error>(&v)?;
      u8::try_from(n).map(Some).map_err(de::Error::custom)
    }
  }
}

pub const DEFAULT_MCQ: u32 = 7;
pub const DEFAULT_FREE: u32 = 3;

/// Requested mix of question kinds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ratio {
  pub mcq: u32,
  pub free: u32,
}

impl Default for Ratio {
  fn default() -> Self { Ratio { mcq: DEFAULT_MCQ, free: DEFAULT_FREE } }
}

impl Ratio {
  /// Number of items the final worksheet should hold.
  /// A zero component falls back to its default count.
  pub fn target(&self) -> usize {
    let mcq = if self.mcq == 0 { DEFAULT_MCQ } else { self.mcq };
    let free = if self.free == 0 { DEFAULT_FREE } else { self.free };
    (mcq + free) as usize
  }
}

/// What the teacher asked for.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct GenerateInput {
  pub subject: String,
  pub unit: String,
  #[serde(default)] pub range: Option<String>,
  #[serde(default)] pub ratio: Option<Ratio>,
  #[serde(default)] pub keywords: Option<Vec<String>>,
  #[serde(default)] pub objectives: Option<Vec<String>>,
}

impl GenerateInput {
  pub fn ratio(&self) -> Ratio {
    self.ratio.unwrap_or_default()
  }
}

/// Final pipeline output: ordered items plus the human-readable issue log.
#[derive(Clone, Debug, Serialize, Default, PartialEq)]
pub struct Worksheet {
  pub items: Vec<Problem>,
  pub issues: Vec<String>,
}
