//! Quiz Exam Backend
//!
//! - Loads a pool of multiple-choice questions once (file or HTTP source)
//! - Builds randomized per-topic exams and grades submissions
//! - Axum HTTP + WebSocket API, static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT             : u16 (default 3000)
//!   QUIZ_CONFIG_PATH : path to TOML config (source, exam plan, seed)
//!   QUIZ_DATA_PATH   : question file, overrides the config (default ./static/data.json)
//!   QUIZ_DATA_URL    : question URL, overrides the config and QUIZ_DATA_PATH
//!   QUIZ_SEED        : u64 seed for reproducible exams
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

mod telemetry;
mod domain;
mod error;
mod config;
mod source;
mod repository;
mod random;
mod builder;
mod grader;
mod session;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::config::{load_quiz_config_from_env, QuizConfig};
use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let config = load_quiz_config_from_env().unwrap_or_default().with_env_overrides();

  // Shared state starts in the Loading phase; the one-shot load settles it.
  let state = Arc::new(AppState::new(&config));
  spawn_catalog_load(state.clone(), &config);

  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "quiz_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}

fn spawn_catalog_load(state: Arc<AppState>, config: &QuizConfig) {
  match config.build_source() {
    Ok(source) => {
      tokio::spawn(async move { state.load_catalog(source.as_ref()).await });
    }
    Err(e) => {
      tokio::spawn(async move { state.settle_catalog(Err(e)).await });
    }
  }
}
