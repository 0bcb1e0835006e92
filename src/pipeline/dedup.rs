//! Near-duplicate removal over prompt embeddings.
//!
//! Items are scanned in order; the first of a group of similar prompts wins.

use tracing::debug;

use crate::domain::Problem;

/// Similarity strictly above this marks a near-duplicate.
pub const DUPLICATE_THRESHOLD: f64 = 0.9;

const EPSILON: f64 = 1e-9;

/// Cosine similarity with a small denominator guard for zero vectors.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
  let (mut dot, mut na, mut nb) = (0.0, 0.0, 0.0);
  for (x, y) in a.iter().zip(b) {
    dot += x * y;
    na += x * x;
    nb += y * y;
  }
  dot / (na.sqrt() * nb.sqrt() + EPSILON)
}

pub fn is_near_duplicate(similarity: f64) -> bool {
  similarity > DUPLICATE_THRESHOLD
}

#[derive(Debug, Default)]
pub struct Deduplicated {
  pub kept: Vec<Problem>,
  pub kept_vectors: Vec<Vec<f64>>,
  pub issues: Vec<String>,
}

/// `vectors[i]` must belong to `items[i]`.
pub fn dedupe(items: Vec<Problem>, vectors: Vec<Vec<f64>>) -> Deduplicated {
  let mut out = Deduplicated::default();
  for (i, (item, v)) in items.into_iter().zip(vectors).enumerate() {
    let dup = out.kept_vectors.iter().any(|kv| is_near_duplicate(cosine(kv, &v)));
    if dup {
      out.issues.push(format!("重複疑い: Q{}", i + 1));
    } else {
      out.kept.push(item);
      out.kept_vectors.push(v);
    }
  }
  debug!(target: "worksheet", kept = out.kept.len(), dropped = out.issues.len(), "dedup done");
  out
}
