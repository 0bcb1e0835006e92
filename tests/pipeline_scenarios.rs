//! End-to-end pipeline scenarios with stub embedding providers.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use sakumon_backend::domain::{Problem, ProblemKind};
use sakumon_backend::error::PipelineError;
use sakumon_backend::gateway::EmbeddingProvider;
use sakumon_backend::pipeline::{default_rubric, finalize};

/// Returns preset vectors in order and counts calls.
struct FixedEmbedder {
    vectors: Vec<Vec<f64>>,
    calls: AtomicUsize,
}

impl FixedEmbedder {
    fn new(vectors: Vec<Vec<f64>>) -> Self {
        Self { vectors, calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, prompts: &[String]) -> Result<Vec<Vec<f64>>, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vectors.iter().take(prompts.len()).cloned().collect())
    }
}

struct DownEmbedder;

#[async_trait]
impl EmbeddingProvider for DownEmbedder {
    async fn embed(&self, _prompts: &[String]) -> Result<Vec<Vec<f64>>, PipelineError> {
        Err(PipelineError::EmbeddingUnavailable("connection refused".into()))
    }
}

fn mcq(n: usize) -> Problem {
    Problem {
        kind: ProblemKind::Mcq,
        prompt: format!("問{}: 直線の傾きを選べ", n),
        choices: Some(vec!["1".into(), "2".into(), "3".into(), "4".into()]),
        answer: "2".into(),
        explanation: Some("傾きは x の係数".into()),
        difficulty: Some(2),
        objectives: None,
        rubric: None,
        meta: Default::default(),
    }
}

fn free(n: usize) -> Problem {
    Problem {
        kind: ProblemKind::Free,
        prompt: format!("問{}: 切片の意味を説明せよ", n),
        choices: Some(vec![]),
        answer: "x=0 のときの y の値".into(),
        explanation: None,
        difficulty: Some(3),
        objectives: None,
        rubric: None,
        meta: Default::default(),
    }
}

/// One-hot vectors: pairwise orthogonal, so nothing is a near-duplicate.
fn orthogonal(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| {
            let mut v = vec![0.0; n];
            v[i] = 1.0;
            v
        })
        .collect()
}

#[tokio::test]
async fn clean_batch_passes_through_with_rubrics() {
    let mut raw: Vec<Problem> = (1..=7).map(mcq).collect();
    raw.extend((8..=10).map(free));
    let embedder = FixedEmbedder::new(orthogonal(10));

    let ws = finalize(raw.clone(), 10, &embedder).await.unwrap();

    assert_eq!(ws.items.len(), 10);
    assert!(ws.issues.is_empty());
    for (out, inp) in ws.items.iter().zip(&raw) {
        assert_eq!(out.prompt, inp.prompt);
    }
    assert!(ws.items[7..].iter().all(|p| p.rubric == Some(default_rubric())));
    assert!(ws.items[..7].iter().all(|p| p.rubric.is_none()));
}

#[tokio::test]
async fn near_duplicates_are_reported_and_backfilled_by_position() {
    let raw: Vec<Problem> = (1..=10).map(mcq).collect();
    // Q3 and Q7 sit at 0.95 similarity to Q1; everything else is orthogonal.
    let mut vectors = orthogonal(10);
    let q1_like = {
        let mut v = vec![0.0; 10];
        v[0] = 0.95;
        v[9] = (1.0f64 - 0.95 * 0.95).sqrt();
        v
    };
    vectors[2] = q1_like.clone();
    vectors[6] = q1_like;
    let embedder = FixedEmbedder::new(vectors);

    let ws = finalize(raw.clone(), 10, &embedder).await.unwrap();

    assert_eq!(ws.issues, vec!["重複疑い: Q3".to_string(), "重複疑い: Q7".into()]);
    assert_eq!(ws.items.len(), 10);
    let prompts: Vec<&str> = ws.items.iter().map(|p| p.prompt.as_str()).collect();
    // Kept: Q1 Q2 Q4 Q5 Q6 Q8 Q9 Q10, then original[8], original[9].
    let expected: Vec<String> = [1, 2, 4, 5, 6, 8, 9, 10, 9, 10]
        .iter()
        .map(|&i| raw[i - 1].prompt.clone())
        .collect();
    assert_eq!(prompts, expected);
}

#[tokio::test]
async fn backfill_can_readmit_dropped_duplicates() {
    // 12 candidates, target 10, five of them collapse onto Q1.
    let raw: Vec<Problem> = (1..=12).map(mcq).collect();
    let mut vectors = orthogonal(12);
    for i in [2, 4, 7, 8, 10] {
        vectors[i] = vectors[0].clone();
    }
    let embedder = FixedEmbedder::new(vectors);

    let ws = finalize(raw.clone(), 10, &embedder).await.unwrap();

    assert_eq!(ws.issues.len(), 5);
    assert_eq!(ws.items.len(), 10);
    // Positions 8, 9, 10 of the original list come back, including dropped Q8 and Q9.
    assert_eq!(ws.items[7].prompt, raw[7].prompt);
    assert_eq!(ws.items[8].prompt, raw[8].prompt);
    assert_eq!(ws.items[9].prompt, raw[9].prompt);
}

#[tokio::test]
async fn validator_issues_come_before_duplicate_issues() {
    let mut bad = mcq(1);
    bad.choices = Some(vec!["1".into(), "1".into(), "2".into()]);
    bad.answer = "5".into();
    let raw = vec![bad, mcq(2), mcq(3)];
    let mut vectors = orthogonal(3);
    vectors[2] = vectors[1].clone();
    let embedder = FixedEmbedder::new(vectors);

    let ws = finalize(raw, 2, &embedder).await.unwrap();

    assert_eq!(
        ws.issues,
        vec![
            "Q1: answer が choices に含まれていません".to_string(),
            "Q1: choices に重複があります".into(),
            "重複疑い: Q3".into(),
        ]
    );
    assert_eq!(ws.items.len(), 2);
    assert_eq!(ws.items[0].choices.as_deref(), Some(&["1".to_string(), "2".into()][..]));
    assert_eq!(ws.items[0].answer, "5");
}

#[tokio::test]
async fn empty_batch_skips_the_embedder() {
    let embedder = FixedEmbedder::new(vec![]);
    let ws = finalize(Vec::new(), 10, &embedder).await.unwrap();
    assert!(ws.items.is_empty());
    assert!(ws.issues.is_empty());
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn embedding_failure_is_fatal() {
    let result = finalize(vec![mcq(1), free(2)], 10, &DownEmbedder).await;
    match result {
        Err(PipelineError::EmbeddingUnavailable(msg)) => assert!(msg.contains("connection refused")),
        other => panic!("expected EmbeddingUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn short_vector_batch_is_rejected() {
    let embedder = FixedEmbedder::new(orthogonal(1));
    let result = finalize(vec![mcq(1), mcq(2)], 10, &embedder).await;
    assert!(matches!(result, Err(PipelineError::EmbeddingUnavailable(_))));
}
