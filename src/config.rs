//! Loading quiz configuration (question source, exam plan, optional seed) from TOML.
//!
//! See `QuizConfig` and `SourceCfg` for the expected schema. Environment
//! variables override the file:
//!   QUIZ_DATA_PATH : read questions from this file
//!   QUIZ_DATA_URL  : fetch questions from this URL (wins over QUIZ_DATA_PATH)
//!   QUIZ_SEED      : u64 seed for reproducible exams

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::builder::ExamPlan;
use crate::error::LoadError;
use crate::session::DEFAULT_MAX_ATTEMPTS;
use crate::source::{EmbeddedSource, FileSource, HttpSource, QuestionSource};

pub const DEFAULT_DATA_PATH: &str = "./static/data.json";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Question bank compiled into the binary, served by `kind = "embedded"` without `data`.
const BUNDLED_QUESTIONS: &str = include_str!("../static/data.json");

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct QuizConfig {
  #[serde(default)]
  pub seed: Option<u64>,
  #[serde(default)]
  pub source: SourceCfg,
  /// `[[exam.topics]]` entries; absent means the default HTML/CSS/Javascript plan.
  #[serde(default)]
  pub exam: ExamPlan,
  /// Exam attempts kept in memory; the oldest is dropped beyond this.
  #[serde(default = "default_max_attempts")]
  pub max_attempts: usize,
}

impl Default for QuizConfig {
  fn default() -> Self {
    Self {
      seed: None,
      source: SourceCfg::default(),
      exam: ExamPlan::default(),
      max_attempts: DEFAULT_MAX_ATTEMPTS,
    }
  }
}

fn default_max_attempts() -> usize { DEFAULT_MAX_ATTEMPTS }

/// Where questions come from.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceCfg {
  File { path: String },
  Http {
    url: String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
  },
  /// Inline JSON, or the bundled bank when `data` is absent.
  Embedded {
    #[serde(default)]
    data: Option<String>,
  },
}

impl Default for SourceCfg {
  fn default() -> Self { SourceCfg::File { path: DEFAULT_DATA_PATH.into() } }
}

fn default_timeout_secs() -> u64 { DEFAULT_TIMEOUT_SECS }

impl QuizConfig {
  pub fn plan(&self) -> ExamPlan { self.exam.clone().normalized() }

  /// Instantiate the configured question source.
  pub fn build_source(&self) -> Result<Box<dyn QuestionSource>, LoadError> {
    let source: Box<dyn QuestionSource> = match &self.source {
      SourceCfg::File { path } => Box::new(FileSource::new(path)),
      SourceCfg::Http { url, timeout_secs } => Box::new(HttpSource::new(url.clone(), Duration::from_secs(*timeout_secs))?),
      SourceCfg::Embedded { data } => Box::new(EmbeddedSource::new(data.as_deref().unwrap_or(BUNDLED_QUESTIONS))),
    };
    Ok(source)
  }

  /// Apply QUIZ_DATA_PATH / QUIZ_DATA_URL / QUIZ_SEED from the environment.
  pub fn with_env_overrides(self) -> Self {
    self.with_overrides(
      std::env::var("QUIZ_DATA_PATH").ok(),
      std::env::var("QUIZ_DATA_URL").ok(),
      std::env::var("QUIZ_SEED").ok(),
    )
  }

  fn with_overrides(mut self, path: Option<String>, url: Option<String>, seed: Option<String>) -> Self {
    if let Some(path) = path.filter(|p| !p.is_empty()) {
      self.source = SourceCfg::File { path };
    }
    if let Some(url) = url.filter(|u| !u.is_empty()) {
      self.source = SourceCfg::Http { url, timeout_secs: DEFAULT_TIMEOUT_SECS };
    }
    if let Some(raw) = seed {
      match raw.parse::<u64>() {
        Ok(s) => self.seed = Some(s),
        Err(e) => warn!(target: "quiz_backend", %raw, error = %e, "Ignoring unparsable QUIZ_SEED"),
      }
    }
    self
  }
}

/// Attempt to load `QuizConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_quiz_config_from_env() -> Option<QuizConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<QuizConfig>(&s) {
      Ok(cfg) => {
        info!(target: "quiz_backend", %path, "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quiz_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "quiz_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
