//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs its parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{rejection::JsonRejection, Path, State}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::error::AttemptError;
use crate::protocol::*;
use crate::state::AppState;
use crate::logic::*;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let catalog = state.catalog.read().await;
  Json(HealthOut { ok: !catalog.is_failed(), catalog: catalog.label() })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_topics(State(state): State<Arc<AppState>>) -> Result<Json<TopicsOut>, AttemptError> {
  Ok(Json(topics(&state).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_exam(State(state): State<Arc<AppState>>) -> Result<Json<ExamOut>, AttemptError> {
  let exam = new_exam(&state).await?;
  info!(target: "exam", exam_id = %exam.exam_id, questions = exam.questions.len(), "HTTP exam served");
  Ok(Json(exam))
}

#[instrument(level = "info", skip(state), fields(%exam_id))]
pub async fn http_get_exam(
  State(state): State<Arc<AppState>>,
  Path(exam_id): Path<String>,
) -> Result<Json<AttemptOut>, AttemptError> {
  Ok(Json(read_attempt(&state, &exam_id).await?))
}

/// A body that does not deserialize is answered with the same JSON error shape (422).
#[instrument(level = "info", skip(state, body), fields(%exam_id))]
pub async fn http_post_submit(
  State(state): State<Arc<AppState>>,
  Path(exam_id): Path<String>,
  body: Result<Json<SubmitIn>, JsonRejection>,
) -> Result<Json<ResultOut>, AttemptError> {
  let Json(body) = body?;
  let result = submit_answers(&state, &exam_id, &body.answers).await?;
  info!(target: "exam", %exam_id, score = result.score, total = result.total, percentage = result.percentage, "HTTP submission graded");
  Ok(Json(result))
}
