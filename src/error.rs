//! Error taxonomy: loading the question pool, validating records, validating
//! submissions, and driving an attempt through its lifecycle.

use std::fmt;

use thiserror::Error;

/// The question source is unavailable or returned unusable data.
/// Terminal for the running instance: no partial exam is ever built from it.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("question data is not a JSON array of records: {0}")]
    Malformed(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Why a single record was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordProblem {
    pub index: usize,
    pub reason: String,
}

impl fmt::Display for RecordProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {}: {}", self.index, self.reason)
    }
}

/// One or more records break the question invariants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{} invalid question record(s): {}", .problems.len(), join_problems(.problems))]
pub struct ValidationError {
    pub problems: Vec<RecordProblem>,
}

fn join_problems(problems: &[RecordProblem]) -> String {
    problems.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// A submission does not fit the exam it claims to answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("every question must be answered; missing positions {missing:?}")]
    Incomplete { missing: Vec<usize> },

    #[error("position {position} is outside the exam ({exam_len} questions)")]
    UnknownQuestion { position: usize, exam_len: usize },

    #[error("position {position}: choice {choice} is outside the {options} options")]
    ChoiceOutOfRange {
        position: usize,
        choice: usize,
        options: usize,
    },
}

/// Failures of the attempt lifecycle (Ready -> Submitted).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttemptError {
    #[error("questions are still loading, try again shortly")]
    CatalogLoading,

    #[error("questions are unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("exam not found: {0}")]
    NotFound(String),

    #[error("exam {0} was already submitted")]
    AlreadySubmitted(String),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}
