//! Domain models used by the backend: topics, questions, exams, submissions, results.

use std::{collections::BTreeMap, fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SubmissionError;

/// Category label used to partition the pool (e.g. "HTML", "CSS", "Javascript").
/// Matching is exact and case-sensitive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
  pub fn new(label: impl Into<String>) -> Self { Topic(label.into()) }
  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Topic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl From<&str> for Topic {
  fn from(s: &str) -> Self { Topic(s.to_string()) }
}

/// A validated multiple-choice question.
/// `correct_index < options.len()` holds for every value built by the repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
  /// Position of the record in the source array.
  pub id: usize,
  pub topic: Topic,
  pub text: String,
  pub options: Vec<String>,
  pub correct_index: usize,
  pub rationale: String,
}

/// The randomized, fixed-order question list for one attempt.
#[derive(Clone, Debug)]
pub struct Exam {
  pub id: Uuid,
  questions: Vec<Arc<Question>>,
}

impl Exam {
  pub fn new(questions: Vec<Arc<Question>>) -> Self {
    Self { id: Uuid::new_v4(), questions }
  }

  pub fn questions(&self) -> &[Arc<Question>] { &self.questions }
  pub fn len(&self) -> usize { self.questions.len() }
  pub fn is_empty(&self) -> bool { self.questions.is_empty() }
}

/// One chosen option index per exam position. Only constructible through
/// validation against the exam it answers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
  choices: Vec<usize>,
}

impl Submission {
  /// Check that `answers` covers every position of `exam` exactly and that each
  /// chosen index names an existing option.
  pub fn for_exam(exam: &Exam, answers: &BTreeMap<usize, usize>) -> Result<Self, SubmissionError> {
    if let Some((&position, _)) = answers.iter().find(|(p, _)| **p >= exam.len()) {
      return Err(SubmissionError::UnknownQuestion { position, exam_len: exam.len() });
    }

    let missing: Vec<usize> = (0..exam.len()).filter(|p| !answers.contains_key(p)).collect();
    if !missing.is_empty() {
      return Err(SubmissionError::Incomplete { missing });
    }

    let mut choices = Vec::with_capacity(exam.len());
    for (position, q) in exam.questions().iter().enumerate() {
      let choice = answers[&position];
      if choice >= q.options.len() {
        return Err(SubmissionError::ChoiceOutOfRange { position, choice, options: q.options.len() });
      }
      choices.push(choice);
    }
    Ok(Self { choices })
  }

  /// Positional form: `choices[i]` answers question `i`.
  #[cfg(test)]
  pub fn from_choices(exam: &Exam, choices: &[usize]) -> Result<Self, SubmissionError> {
    let answers: BTreeMap<usize, usize> = choices.iter().copied().enumerate().collect();
    Self::for_exam(exam, &answers)
  }

  pub fn choices(&self) -> &[usize] { &self.choices }
}

/// Per-question grading outcome, enough for a renderer to mark right/wrong.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOutcome {
  pub position: usize,
  pub correct: bool,
  pub correct_index: usize,
  pub chosen_index: usize,
  pub rationale: String,
}

impl QuestionOutcome {
  pub fn verdict(&self) -> &'static str {
    if self.correct { "Correct" } else { "Incorrect" }
  }
}

/// Derived result of grading one submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GradeResult {
  pub outcomes: Vec<QuestionOutcome>,
  pub score: usize,
  pub total: usize,
  /// Rounded half up; 0 for an empty exam.
  pub percentage: u32,
}

impl GradeResult {
  pub fn summary(&self) -> String {
    format!("Final Score: {} / {}", self.score, self.total)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn exam(option_counts: &[usize]) -> Exam {
    let qs = option_counts
      .iter()
      .enumerate()
      .map(|(id, &n)| {
        Arc::new(Question {
          id,
          topic: Topic::from("Javascript"),
          text: String::new(),
          options: (0..n).map(|i| i.to_string()).collect(),
          correct_index: 0,
          rationale: String::new(),
        })
      })
      .collect();
    Exam::new(qs)
  }

  #[test]
  fn complete_submission_is_accepted() {
    let exam = exam(&[2, 3]);
    let sub = Submission::for_exam(&exam, &BTreeMap::from([(1, 2), (0, 0)])).unwrap();
    assert_eq!(sub.choices(), &[0, 2]);
  }

  #[test]
  fn missing_answers_are_listed() {
    let exam = exam(&[2, 2, 2]);
    let err = Submission::for_exam(&exam, &BTreeMap::from([(1, 0)])).unwrap_err();
    assert_eq!(err, SubmissionError::Incomplete { missing: vec![0, 2] });
  }

  #[test]
  fn answers_beyond_the_exam_are_rejected() {
    let exam = exam(&[2]);
    let err = Submission::from_choices(&exam, &[0, 1]).unwrap_err();
    assert_eq!(err, SubmissionError::UnknownQuestion { position: 1, exam_len: 1 });
  }

  #[test]
  fn choice_must_name_an_option() {
    let exam = exam(&[2, 4]);
    let err = Submission::from_choices(&exam, &[1, 4]).unwrap_err();
    assert_eq!(err, SubmissionError::ChoiceOutOfRange { position: 1, choice: 4, options: 4 });
  }

  #[test]
  fn topic_serializes_as_plain_string() {
    let json = serde_json::to_string(&Topic::from("CSS")).unwrap();
    assert_eq!(json, "\"CSS\"");
  }
}
