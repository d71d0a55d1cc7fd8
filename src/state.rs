//! Application state: question catalog, exam attempts, randomness, and the exam plan.
//!
//! This module owns:
//!   - the catalog (Loading -> Ready | Failed, set once by `load_catalog`)
//!   - attempts by exam id (Ready -> Submitted)
//!   - the random source used by the exam builder
//!
//! Handlers never touch these stores directly; they go through the methods here.

use std::{collections::BTreeMap, sync::Arc};
use rand::rngs::StdRng;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::builder::{build_exam, ExamPlan};
use crate::config::QuizConfig;
use crate::domain::{Exam, GradeResult, Topic};
use crate::error::{AttemptError, LoadError};
use crate::random::RngSource;
use crate::repository::QuestionRepository;
use crate::session::{Attempt, AttemptStore, Catalog};
use crate::source::QuestionSource;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RwLock<Catalog>>,
    pub attempts: Arc<RwLock<AttemptStore>>,
    pub rng: Arc<Mutex<RngSource<StdRng>>>,
    pub plan: ExamPlan,
}

impl AppState {
    /// Fresh state in the Loading phase.
    #[instrument(level = "info", skip_all)]
    pub fn new(config: &QuizConfig) -> Self {
        let plan = config.plan();
        for quota in &plan.topics {
            info!(target: "exam", topic = %quota.topic, count = quota.count, "Exam plan");
        }
        if let Some(seed) = config.seed {
            warn!(target: "quiz_backend", seed, "Seeded RNG: exams are reproducible");
        }
        Self {
            catalog: Arc::new(RwLock::new(Catalog::Loading)),
            attempts: Arc::new(RwLock::new(AttemptStore::new(config.max_attempts))),
            rng: Arc::new(Mutex::new(RngSource::from_seed_opt(config.seed))),
            plan,
        }
    }

    /// State with an already validated repository.
    #[cfg(test)]
    pub fn with_repository(repo: QuestionRepository, plan: ExamPlan, seed: Option<u64>) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(Catalog::Ready(Arc::new(repo)))),
            attempts: Arc::new(RwLock::new(AttemptStore::new(crate::session::DEFAULT_MAX_ATTEMPTS))),
            rng: Arc::new(Mutex::new(RngSource::from_seed_opt(seed))),
            plan,
        }
    }

    /// Load once from `source` and settle the catalog. Later calls are ignored:
    /// a failed load stays failed.
    #[instrument(level = "info", skip_all, fields(source = %source.describe()))]
    pub async fn load_catalog(&self, source: &dyn QuestionSource) {
        if !matches!(*self.catalog.read().await, Catalog::Loading) {
            warn!(target: "quiz_backend", "Catalog already settled; not reloading");
            return;
        }
        let outcome = QuestionRepository::load(source).await;
        self.settle_catalog(outcome).await;
    }

    /// Record the outcome of a load attempt made elsewhere.
    pub async fn settle_catalog(&self, outcome: Result<QuestionRepository, LoadError>) {
        let mut catalog = self.catalog.write().await;
        if !matches!(*catalog, Catalog::Loading) {
            return;
        }
        *catalog = match outcome {
            Ok(repo) => {
                if repo.is_empty() {
                    warn!(target: "quiz_backend", "Question catalog is empty; exams will have no questions");
                }
                info!(target: "quiz_backend", questions = repo.len(), "Question catalog ready");
                Catalog::Ready(Arc::new(repo))
            }
            Err(e) => {
                error!(target: "quiz_backend", error = %e, "Error loading questions");
                Catalog::Failed(e.to_string())
            }
        };
    }

    /// Build a new exam and register it as a Ready attempt.
    #[instrument(level = "info", skip(self))]
    pub async fn start_exam(&self) -> Result<Exam, AttemptError> {
        let repo = self.catalog.read().await.repository()?;
        let exam = {
            let mut rng = self.rng.lock().await;
            build_exam(&repo, &self.plan, &mut *rng)
        };
        if exam.is_empty() {
            warn!(target: "exam", exam_id = %exam.id, "Exam has no questions for the configured topics");
        }
        let evicted = self.attempts.write().await.insert(Attempt::new(exam.clone()));
        for old in evicted {
            debug!(target: "exam", evicted = %old, "Dropped oldest attempt");
        }
        info!(target: "exam", exam_id = %exam.id, questions = exam.len(), "Exam started");
        Ok(exam)
    }

    /// Read-only snapshot of an attempt.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_attempt(&self, exam_id: &str) -> Result<Attempt, AttemptError> {
        let id = parse_exam_id(exam_id)?;
        self.attempts
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AttemptError::NotFound(exam_id.to_string()))
    }

    /// Grade `answers` for an attempt. Irreversible on success.
    #[instrument(level = "info", skip(self, answers), fields(answered = answers.len()))]
    pub async fn submit(&self, exam_id: &str, answers: &BTreeMap<usize, usize>) -> Result<GradeResult, AttemptError> {
        let id = parse_exam_id(exam_id)?;
        let mut attempts = self.attempts.write().await;
        let attempt = attempts
            .get_mut(&id)
            .ok_or_else(|| AttemptError::NotFound(exam_id.to_string()))?;
        let result = attempt.submit(answers)?.clone();
        info!(target: "exam", %exam_id, score = result.score, total = result.total, percentage = result.percentage, "Exam submitted");
        Ok(result)
    }

    /// Pool size per topic plus the configured count, for every topic either side knows.
    pub async fn topic_inventory(&self) -> Result<Vec<(Topic, usize, usize)>, AttemptError> {
        let repo = self.catalog.read().await.repository()?;
        let mut rows: BTreeMap<Topic, (usize, usize)> = repo
            .topic_counts()
            .into_iter()
            .map(|(t, n)| (t, (n, 0)))
            .collect();
        for quota in &self.plan.topics {
            rows.entry(quota.topic.clone()).or_insert((0, 0)).1 = quota.count;
        }
        Ok(rows.into_iter().map(|(t, (available, planned))| (t, available, planned)).collect())
    }
}

fn parse_exam_id(raw: &str) -> Result<Uuid, AttemptError> {
    Uuid::parse_str(raw).map_err(|_| AttemptError::NotFound(raw.to_string()))
}
