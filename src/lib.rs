//! Worksheet generation backend: LLM-drafted problems, validated, deduplicated
//! by prompt embeddings, backfilled to the requested count, stored and graded.

pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod grading;
pub mod logic;
pub mod openai;
pub mod pipeline;
pub mod protocol;
pub mod routes;
pub mod seeds;
pub mod state;
pub mod telemetry;
pub mod util;
