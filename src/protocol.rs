//! Public protocol structs for HTTP endpoints (serde ready).
//! Every response is wrapped in `Envelope` with a short trace id.

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::{Deserialize, Serialize};

use crate::grading::SubmittedAnswer;
use crate::seeds::BankItem;
use crate::state::StoredProblem;
use crate::util::trace_id;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub trace_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    pub meta: Meta,
}

/// 200 with `{ ok: true, data, meta }`.
pub fn ok<T: Serialize>(data: T) -> Response {
    Json(Envelope { ok: true, data: Some(data), error: None, meta: Meta { trace_id: trace_id() } }).into_response()
}

/// Error status with `{ ok: false, error: { code, message }, meta }`.
pub fn err(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    let body: Envelope<()> = Envelope {
        ok: false,
        data: None,
        error: Some(ErrorBody { code, message: message.into() }),
        meta: Meta { trace_id: trace_id() },
    };
    (status, Json(body)).into_response()
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOut {
    pub worksheet_id: String,
    pub items: Vec<StoredProblem>,
    pub issues: Vec<String>,
}

#[derive(Serialize)]
pub struct ProblemsOut {
    pub items: Vec<StoredProblem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeMcqIn {
    pub worksheet_id: String,
    pub answers: Vec<SubmittedAnswer>,
}

/// The rubric is passed to the grader verbatim, so any JSON shape is accepted.
#[derive(Deserialize)]
pub struct GradeFreeIn {
    pub answer: String,
    #[serde(default)]
    pub rubric: serde_json::Value,
}

pub const BANK_DEFAULT_LIMIT: u32 = 10;
pub const BANK_MAX_LIMIT: u32 = 50;

/// `tags` is accepted for forward compatibility; search matches subject and unit only.
#[derive(Deserialize)]
pub struct BankSearchIn {
    pub subject: String,
    pub unit: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Serialize)]
pub struct BankSearchOut {
    pub items: Vec<BankItem>,
}

#[derive(Serialize)]
pub struct CatalogOut {
    pub subjects: Vec<&'static str>,
    pub units: std::collections::BTreeMap<&'static str, Vec<&'static str>>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
