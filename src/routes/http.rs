//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs basic result info.

use std::sync::Arc;

use axum::{
  extract::{rejection::JsonRejection, Path, State},
  http::StatusCode,
  response::Response,
  Json,
};
use tracing::{error, info, instrument, warn};

use crate::domain::GenerateInput;
use crate::grading::grade_mcq;
use crate::logic::{generate_with_state, grade_free_with_state};
use crate::protocol::*;
use crate::seeds;
use crate::state::AppState;

fn bad_request(rejection: JsonRejection) -> Response {
  warn!(target: "sakumon_backend", error = %rejection.body_text(), "rejected request body");
  err(StatusCode::BAD_REQUEST, "BAD_REQUEST", rejection.body_text())
}

#[instrument(level = "info")]
pub async fn http_health() -> Response { ok(HealthOut { ok: true }) }

#[instrument(level = "info")]
pub async fn http_catalog() -> Response {
  ok(CatalogOut { subjects: seeds::SUBJECTS.to_vec(), units: seeds::units() })
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_generate(
  State(state): State<Arc<AppState>>,
  body: Result<Json<GenerateInput>, JsonRejection>,
) -> Response {
  let input = match body {
    Ok(Json(input)) => input,
    Err(rejection) => return bad_request(rejection),
  };

  match generate_with_state(&state, &input).await {
    Ok(ws) => {
      let (header, items) = state.save_worksheet(&input, ws.items).await;
      info!(target: "worksheet", id = %header.id, subject = %input.subject, unit = %input.unit, items = items.len(), issues = ws.issues.len(), "HTTP worksheet generated");
      ok(GenerateOut { worksheet_id: header.id, items, issues: ws.issues })
    }
    Err(e) => {
      error!(target: "worksheet", subject = %input.subject, unit = %input.unit, error = %e, "HTTP generation failed");
      err(StatusCode::INTERNAL_SERVER_ERROR, "GEN_ERROR", e.to_string())
    }
  }
}

#[instrument(level = "info", skip_all, fields(%id))]
pub async fn http_get_worksheet(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Response {
  match state.get_worksheet(&id).await {
    Some(ws) => ok(ws),
    None => err(StatusCode::NOT_FOUND, "NOT_FOUND", "worksheet not found"),
  }
}

#[instrument(level = "info", skip_all, fields(%id))]
pub async fn http_get_problems(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Response {
  let items = state.worksheet_problems(&id).await;
  ok(ProblemsOut { items })
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_grade_mcq(
  State(state): State<Arc<AppState>>,
  body: Result<Json<GradeMcqIn>, JsonRejection>,
) -> Response {
  let body = match body {
    Ok(Json(b)) => b,
    Err(rejection) => return bad_request(rejection),
  };
  let problems = state.worksheet_problems(&body.worksheet_id).await;
  let grade = grade_mcq(&body.answers, &problems);
  info!(target: "grading", worksheet = %body.worksheet_id, score = grade.score, total = grade.total, "HTTP mcq graded");
  ok(grade)
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_grade_free(
  State(state): State<Arc<AppState>>,
  body: Result<Json<GradeFreeIn>, JsonRejection>,
) -> Response {
  let body = match body {
    Ok(Json(b)) => b,
    Err(rejection) => return bad_request(rejection),
  };
  match grade_free_with_state(&state, &body.answer, &body.rubric).await {
    Ok(grade) => {
      info!(target: "grading", mark = ?grade.mark, "HTTP free answer graded");
      ok(grade)
    }
    Err(e) => {
      error!(target: "grading", error = %e, "HTTP free grading failed");
      err(StatusCode::INTERNAL_SERVER_ERROR, "GRADE_ERROR", e.to_string())
    }
  }
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_bank_search(
  State(state): State<Arc<AppState>>,
  body: Result<Json<BankSearchIn>, JsonRejection>,
) -> Response {
  let body = match body {
    Ok(Json(b)) => b,
    Err(rejection) => return bad_request(rejection),
  };
  let limit = body.limit.unwrap_or(BANK_DEFAULT_LIMIT);
  if !(1..=BANK_MAX_LIMIT).contains(&limit) {
    warn!(target: "bank", limit, "bank search limit out of range");
    return err(StatusCode::BAD_REQUEST, "BAD_REQUEST", format!("limit must be between 1 and {}", BANK_MAX_LIMIT));
  }
  let items = state.search_bank(&body.subject, &body.unit, limit as usize);
  info!(target: "bank", subject = %body.subject, unit = %body.unit, tags = body.tags.as_ref().map_or(0, Vec::len), hits = items.len(), "HTTP bank searched");
  ok(BankSearchOut { items })
}
