//! Application state: in-memory worksheet store, prompts, and model gateways.
//!
//! This module owns:
//!   - worksheet headers and their problems (by worksheet id)
//!   - the prompts struct (from TOML or defaults)
//!   - the injected generator / embedder / grader (None when not configured)
//!   - the read-only seed question bank
//!
//! Each generation request works on its own data; the only shared mutable
//! state is the store, which is written once per finished request.
//!
//! The store stands in for a database: the maps only grow for the life of
//! the process and nothing is ever evicted.

use std::{collections::HashMap, sync::Arc};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::{load_config_from_env, Prompts};
use crate::domain::{GenerateInput, Problem};
use crate::gateway::{EmbeddingProvider, FreeGrader, ProblemGenerator};
use crate::openai::OpenAI;
use crate::seeds::{bank_items, BankItem};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorksheetHeader {
    pub id: String,
    pub subject: String,
    pub unit: String,
    pub range: Option<String>,
}

/// A problem after persistence: durable id plus 1-based position.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProblem {
    pub id: String,
    pub worksheet_id: String,
    pub position: usize,
    #[serde(flatten)]
    pub problem: Problem,
}

/// Model gateways the handlers call through.
#[derive(Clone, Default)]
pub struct Gateways {
    pub generator: Option<Arc<dyn ProblemGenerator>>,
    pub embedder: Option<Arc<dyn EmbeddingProvider>>,
    pub grader: Option<Arc<dyn FreeGrader>>,
}

impl Gateways {
    pub fn from_openai(oa: OpenAI) -> Self {
        let oa = Arc::new(oa);
        Self {
            generator: Some(oa.clone()),
            embedder: Some(oa.clone()),
            grader: Some(oa),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub worksheets: Arc<RwLock<HashMap<String, WorksheetHeader>>>,
    pub problems: Arc<RwLock<HashMap<String, Vec<StoredProblem>>>>,
    pub gateways: Gateways,
    pub prompts: Prompts,
    pub bank: Arc<Vec<BankItem>>,
}

impl AppState {
    /// Build state from env: load config, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Self {
        let prompts = load_config_from_env()
            .map(|c| c.into_prompts())
            .unwrap_or_default();

        let gateways = match OpenAI::from_env() {
            Some(oa) => {
                info!(target: "sakumon_backend", base_url = %oa.base_url, gen_model = %oa.gen_model, embed_model = %oa.embed_model, "OpenAI enabled.");
                Gateways::from_openai(oa)
            }
            None => {
                info!(target: "sakumon_backend", "OpenAI disabled (no OPENAI_API_KEY). Generation and free grading will fail.");
                Gateways::default()
            }
        };

        Self::new(gateways, prompts)
    }

    pub fn new(gateways: Gateways, prompts: Prompts) -> Self {
        Self {
            worksheets: Arc::new(RwLock::new(HashMap::new())),
            problems: Arc::new(RwLock::new(HashMap::new())),
            gateways,
            prompts,
            bank: Arc::new(bank_items()),
        }
    }

    /// Persist a finished worksheet, assigning ids and positions.
    #[instrument(level = "debug", skip(self, input, items), fields(count = items.len()))]
    pub async fn save_worksheet(&self, input: &GenerateInput, items: Vec<Problem>) -> (WorksheetHeader, Vec<StoredProblem>) {
        let header = WorksheetHeader {
            id: Uuid::new_v4().to_string(),
            subject: input.subject.clone(),
            unit: input.unit.clone(),
            range: input.range.clone(),
        };
        let stored: Vec<StoredProblem> = items
            .into_iter()
            .enumerate()
            .map(|(i, problem)| StoredProblem {
                id: Uuid::new_v4().to_string(),
                worksheet_id: header.id.clone(),
                position: i + 1,
                problem,
            })
            .collect();

        let mut worksheets = self.worksheets.write().await;
        let mut problems = self.problems.write().await;
        worksheets.insert(header.id.clone(), header.clone());
        problems.insert(header.id.clone(), stored.clone());
        (header, stored)
    }

    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_worksheet(&self, id: &str) -> Option<WorksheetHeader> {
        self.worksheets.read().await.get(id).cloned()
    }

    /// Problems of a worksheet ordered by position; empty for unknown ids.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn worksheet_problems(&self, id: &str) -> Vec<StoredProblem> {
        let mut items = self.problems.read().await.get(id).cloned().unwrap_or_default();
        items.sort_by_key(|p| p.position);
        items
    }

    /// Bank items for a subject/unit in seed order, at most `limit` of them.
    pub fn search_bank(&self, subject: &str, unit: &str, limit: usize) -> Vec<BankItem> {
        self.bank
            .iter()
            .filter(|b| b.subject == subject && b.unit == unit)
            .take(limit)
            .cloned()
            .collect()
    }
}
