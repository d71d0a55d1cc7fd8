//! Lifecycle state: the question catalog (Loading -> Ready | Failed) and one
//! exam attempt (Ready -> Submitted).
//!
//! Both transitions are one-way. A failed load is never retried, and a
//! submitted attempt keeps its result and refuses new answers.
//! Attempts live in a bounded store; the oldest one is dropped first.

use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::Arc,
};

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Exam, GradeResult, Submission};
use crate::error::AttemptError;
use crate::grader::grade;
use crate::repository::QuestionRepository;

/// The question pool as seen by the running instance.
#[derive(Clone, Debug)]
pub enum Catalog {
    Loading,
    Ready(Arc<QuestionRepository>),
    Failed(String),
}

impl Catalog {
    pub fn is_failed(&self) -> bool {
        matches!(self, Catalog::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Catalog::Loading => "loading",
            Catalog::Ready(_) => "ready",
            Catalog::Failed(_) => "failed",
        }
    }

    /// The repository, or the reason no exam can be built right now.
    pub fn repository(&self) -> Result<Arc<QuestionRepository>, AttemptError> {
        match self {
            Catalog::Ready(repo) => Ok(repo.clone()),
            Catalog::Loading => Err(AttemptError::CatalogLoading),
            Catalog::Failed(msg) => Err(AttemptError::CatalogUnavailable(msg.clone())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Ready,
    Submitted,
}

/// One exam and, once submitted, its result.
#[derive(Clone, Debug)]
pub struct Attempt {
    exam: Exam,
    result: Option<GradeResult>,
}

impl Attempt {
    pub fn new(exam: Exam) -> Self {
        Self { exam, result: None }
    }

    pub fn exam(&self) -> &Exam {
        &self.exam
    }

    pub fn result(&self) -> Option<&GradeResult> {
        self.result.as_ref()
    }

    pub fn phase(&self) -> Phase {
        if self.result.is_some() {
            Phase::Submitted
        } else {
            Phase::Ready
        }
    }

    /// Validate `answers`, grade, and move to Submitted. Rejected once submitted;
    /// a rejected (invalid) submission leaves the attempt Ready.
    pub fn submit(&mut self, answers: &BTreeMap<usize, usize>) -> Result<&GradeResult, AttemptError> {
        if self.result.is_some() {
            return Err(AttemptError::AlreadySubmitted(self.exam.id.to_string()));
        }
        let submission = Submission::for_exam(&self.exam, answers)?;
        Ok(&*self.result.insert(grade(&self.exam, &submission)))
    }
}

pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

/// Attempts by exam id, capped at `capacity` entries in insertion order.
#[derive(Debug)]
pub struct AttemptStore {
    by_id: HashMap<Uuid, Attempt>,
    order: VecDeque<Uuid>,
    capacity: usize,
}

impl AttemptStore {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            by_id: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Store `attempt`, returning the ids evicted to stay within capacity.
    pub fn insert(&mut self, attempt: Attempt) -> Vec<Uuid> {
        let id = attempt.exam().id;
        if self.by_id.insert(id, attempt).is_none() {
            self.order.push_back(id);
        }
        let mut evicted = Vec::new();
        while self.order.len() > self.capacity {
            if let Some(old) = self.order.pop_front() {
                self.by_id.remove(&old);
                evicted.push(old);
            }
        }
        evicted
    }

    pub fn get(&self, id: &Uuid) -> Option<&Attempt> {
        self.by_id.get(id)
    }

    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut Attempt> {
        self.by_id.get_mut(id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Question, Topic};
    use crate::error::SubmissionError;

    fn attempt() -> Attempt {
        let qs = [1usize, 0]
            .iter()
            .enumerate()
            .map(|(id, &c)| {
                Arc::new(Question {
                    id,
                    topic: Topic::from("CSS"),
                    text: format!("q{id}"),
                    options: vec!["x".into(), "y".into()],
                    correct_index: c,
                    rationale: String::new(),
                })
            })
            .collect();
        Attempt::new(Exam::new(qs))
    }

    #[test]
    fn submit_moves_to_submitted_once() {
        let mut a = attempt();
        assert_eq!(a.phase(), Phase::Ready);

        let answers = BTreeMap::from([(0, 1), (1, 1)]);
        let result = a.submit(&answers).unwrap().clone();
        assert_eq!(result.score, 1);
        assert_eq!(a.phase(), Phase::Submitted);

        let again = a.submit(&BTreeMap::from([(0, 1), (1, 0)])).unwrap_err();
        assert!(matches!(again, AttemptError::AlreadySubmitted(_)));
        assert_eq!(a.result(), Some(&result));
    }

    #[test]
    fn incomplete_submission_keeps_attempt_ready() {
        let mut a = attempt();
        let err = a.submit(&BTreeMap::from([(0, 1)])).unwrap_err();
        assert_eq!(
            err,
            AttemptError::Submission(SubmissionError::Incomplete { missing: vec![1] })
        );
        assert_eq!(a.phase(), Phase::Ready);
        assert!(a.submit(&BTreeMap::from([(0, 1), (1, 0)])).is_ok());
    }

    #[test]
    fn store_drops_oldest_past_capacity() {
        let mut store = AttemptStore::new(3);
        let ids: Vec<Uuid> = (0..5)
            .map(|_| {
                let a = attempt();
                let id = a.exam().id;
                store.insert(a);
                id
            })
            .collect();

        assert_eq!(store.len(), 3);
        assert!(store.get(&ids[0]).is_none());
        assert!(store.get(&ids[1]).is_none());
        assert!(ids[2..].iter().all(|id| store.get(id).is_some()));
    }

    #[test]
    fn store_reports_evictions() {
        let mut store = AttemptStore::new(0);
        let first = attempt();
        let first_id = first.exam().id;
        assert!(store.insert(first).is_empty());
        assert_eq!(store.insert(attempt()), vec![first_id]);
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
    }

    #[test]
    fn catalog_only_serves_when_ready() {
        assert_eq!(Catalog::Loading.repository().unwrap_err(), AttemptError::CatalogLoading);
        assert!(!Catalog::Loading.is_failed());
        let failed = Catalog::Failed("boom".into()).repository().unwrap_err();
        assert_eq!(failed.to_string(), "questions are unavailable: boom");
        assert!(Catalog::Failed("boom".into()).is_failed());
        let ready = Catalog::Ready(Arc::new(QuestionRepository::default()));
        assert_eq!(ready.label(), "ready");
        assert!(ready.repository().is_ok());
    }
}
