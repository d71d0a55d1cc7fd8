//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Starting a new exam attempt
//!   - Submitting answers and returning the graded result
//!   - Reading back an attempt and the topic inventory

use std::collections::BTreeMap;

use tracing::{instrument, warn};

use crate::error::AttemptError;
use crate::protocol::{attempt_out, exam_out, result_out, AttemptOut, ExamOut, ResultOut, TopicOut, TopicsOut};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn new_exam(state: &AppState) -> Result<ExamOut, AttemptError> {
  let exam = state.start_exam().await?;
  Ok(exam_out(&exam))
}

#[instrument(level = "info", skip(state, answers), fields(%exam_id, answered = answers.len()))]
pub async fn submit_answers(state: &AppState, exam_id: &str, answers: &BTreeMap<usize, usize>) -> Result<ResultOut, AttemptError> {
  match state.submit(exam_id, answers).await {
    Ok(result) => Ok(result_out(&result)),
    Err(e) => {
      warn!(target: "exam", %exam_id, error = %e, "Submission rejected");
      Err(e)
    }
  }
}

#[instrument(level = "info", skip(state), fields(%exam_id))]
pub async fn read_attempt(state: &AppState, exam_id: &str) -> Result<AttemptOut, AttemptError> {
  let attempt = state.get_attempt(exam_id).await?;
  Ok(attempt_out(&attempt))
}

#[instrument(level = "info", skip(state))]
pub async fn topics(state: &AppState) -> Result<TopicsOut, AttemptError> {
  let topics = state
    .topic_inventory()
    .await?
    .into_iter()
    .map(|(topic, available, planned)| TopicOut { topic, available, planned })
    .collect();
  Ok(TopicsOut { topics })
}
