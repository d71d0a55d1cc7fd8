//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::logic::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "quiz_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "quiz_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply = reply_to_text(&txt, &state).await;
        if let Err(e) = socket.send(Message::Text(reply)).await {
          error!(target: "quiz_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "quiz_backend", "WebSocket disconnected");
}

/// Parse, dispatch, serialize.
async fn reply_to_text(txt: &str, state: &AppState) -> String {
  let reply_msg = match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(incoming) => {
      debug!(target: "quiz_backend", "WS received: {:?}", &incoming);
      handle_client_ws(incoming, state).await
    }
    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
  };

  serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  })
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::NewExam => match new_exam(state).await {
      Ok(exam) => {
        info!(target: "exam", exam_id = %exam.exam_id, questions = exam.questions.len(), "WS exam served");
        ServerWsMessage::Exam { exam }
      }
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::SubmitAnswers { exam_id, answers } => match submit_answers(state, &exam_id, &answers).await {
      Ok(result) => {
        info!(target: "exam", %exam_id, score = result.score, total = result.total, "WS submission graded");
        ServerWsMessage::Result { exam_id, result }
      }
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::builder::ExamPlan;
  use crate::repository::QuestionRepository;
  use serde_json::Value;

  fn state() -> AppState {
    let repo = QuestionRepository::from_json(
      r#"[{"topic": "Javascript", "q": "typeof null?", "options": ["null", "object"], "correct": 1, "rationale": "historic quirk"}]"#,
    )
    .unwrap();
    AppState::with_repository(repo, ExamPlan::default(), Some(5))
  }

  #[tokio::test]
  async fn ping_pongs() {
    let out = reply_to_text(r#"{"type": "ping"}"#, &state()).await;
    assert_eq!(out, r#"{"type":"pong"}"#);
  }

  #[tokio::test]
  async fn bad_json_is_an_error_message() {
    let out: Value = serde_json::from_str(&reply_to_text("{", &state()).await).unwrap();
    assert_eq!(out["type"], "error");
    assert!(out["message"].as_str().unwrap().starts_with("Invalid JSON"));
  }

  #[tokio::test]
  async fn new_exam_then_submit() {
    let state = state();
    let exam: Value = serde_json::from_str(&reply_to_text(r#"{"type": "new_exam"}"#, &state).await).unwrap();
    assert_eq!(exam["type"], "exam");
    let exam_id = exam["exam"]["examId"].as_str().unwrap();

    let submit = serde_json::json!({ "type": "submit_answers", "examId": exam_id, "answers": { "0": 1 } });
    let out: Value = serde_json::from_str(&reply_to_text(&submit.to_string(), &state).await).unwrap();
    assert_eq!(out["type"], "result");
    assert_eq!(out["result"]["percentage"], 100);
    assert_eq!(out["result"]["outcomes"][0]["rationale"], "historic quirk");
    assert_eq!(out["result"]["outcomes"][0]["verdict"], "Correct");
  }
}
