//! Raw model output → candidate problems.
//!
//! The model is asked for `{"items": [...]}`, but a bare array is accepted as
//! well. Anything else, or any item that fails the schema, discards the whole
//! batch: the caller sees zero items.

use serde_json::Value;
use tracing::warn;

use crate::domain::Problem;
use crate::util::trunc_for_log;

pub fn parse_generated_items(raw: &str) -> Vec<Problem> {
  let value: Value = match serde_json::from_str(raw) {
    Ok(v) => v,
    Err(e) => {
      warn!(target: "worksheet", error = %e, raw = %trunc_for_log(raw, 120), "generated output is not JSON");
      return Vec::new();
    }
  };

  let array = match value {
    Value::Array(items) => items,
    Value::Object(mut obj) => match obj.remove("items") {
      Some(Value::Array(items)) => items,
      _ => {
        warn!(target: "worksheet", "generated object has no items array");
        return Vec::new();
      }
    },
    _ => {
      warn!(target: "worksheet", "generated output is neither array nor object");
      return Vec::new();
    }
  };

  match serde_json::from_value::<Vec<Problem>>(Value::Array(array)) {
    Ok(items) if items.iter().all(Problem::has_valid_difficulty) => items,
    Ok(_) => {
      warn!(target: "worksheet", "generated batch has difficulty outside 1..=5");
      Vec::new()
    }
    Err(e) => {
      warn!(target: "worksheet", error = %e, "generated items do not match the problem schema");
      Vec::new()
    }
  }
}
