//! Exam building: per-topic sampling, then one shuffle across topics.

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::domain::{Exam, Topic};
use crate::random::{sample, shuffle, RandomSource};
use crate::repository::QuestionRepository;

/// How many questions to draw from one topic.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TopicQuota {
  pub topic: Topic,
  pub count: usize,
}

/// Ordered topic -> count configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ExamPlan {
  pub topics: Vec<TopicQuota>,
}

impl Default for ExamPlan {
  fn default() -> Self {
    Self::new([("HTML", 5), ("CSS", 5), ("Javascript", 10)])
  }
}

impl ExamPlan {
  /// Build a plan; a topic listed twice keeps its first position with the counts summed.
  pub fn new<T: Into<Topic>>(quotas: impl IntoIterator<Item = (T, usize)>) -> Self {
    let mut topics: Vec<TopicQuota> = Vec::new();
    for (topic, count) in quotas {
      let topic = topic.into();
      match topics.iter_mut().find(|q| q.topic == topic) {
        Some(existing) => existing.count += count,
        None => topics.push(TopicQuota { topic, count }),
      }
    }
    Self { topics }
  }

  /// Merge duplicate topics of a plan read from configuration.
  pub fn normalized(self) -> Self {
    Self::new(self.topics.into_iter().map(|q| (q.topic, q.count)))
  }

  /// Upper bound on the exam length.
  pub fn max_questions(&self) -> usize {
    self.topics.iter().map(|q| q.count).sum()
  }
}

/// Draw `min(count, pool)` questions per topic, concatenate, and shuffle.
/// Never fails: missing or short pools just yield a shorter exam.
#[instrument(level = "debug", skip_all, fields(repo_len = repo.len(), max = plan.max_questions()))]
pub fn build_exam(repo: &QuestionRepository, plan: &ExamPlan, rng: &mut dyn RandomSource) -> Exam {
  let mut selected = Vec::with_capacity(plan.max_questions());
  for quota in &plan.topics {
    let pool = repo.pool(&quota.topic);
    if pool.len() < quota.count {
      debug!(target: "exam", topic = %quota.topic, requested = quota.count, available = pool.len(), "Topic pool smaller than requested; using whole pool");
    }
    selected.extend(sample(&pool, quota.count, rng));
  }
  shuffle(&mut selected, rng);
  Exam::new(selected)
}
