//! Grading: compare a validated submission with the exam's correct indices.
//!
//! Grading is pure and total. Submissions are checked for completeness by
//! `Submission::for_exam` before they ever reach this module.

use tracing::{debug, instrument};

use crate::domain::{Exam, GradeResult, QuestionOutcome, Submission};

/// Grade `submission` against `exam`. Same inputs, same result.
#[instrument(level = "debug", skip_all, fields(exam_id = %exam.id, total = exam.len()))]
pub fn grade(exam: &Exam, submission: &Submission) -> GradeResult {
  let outcomes: Vec<QuestionOutcome> = exam
    .questions()
    .iter()
    .zip(submission.choices())
    .enumerate()
    .map(|(position, (q, &chosen_index))| QuestionOutcome {
      position,
      correct: chosen_index == q.correct_index,
      correct_index: q.correct_index,
      chosen_index,
      rationale: q.rationale.clone(),
    })
    .collect();

  let score = outcomes.iter().filter(|o| o.correct).count();
  let total = exam.len();
  let percentage = percentage(score, total);
  debug!(target: "exam", score, total, percentage, "Graded submission");

  GradeResult { outcomes, score, total, percentage }
}

/// `round(100 * score / total)` with halves rounded up, in integer arithmetic.
/// An empty exam scores 0%.
pub fn percentage(score: usize, total: usize) -> u32 {
  if total == 0 {
    return 0;
  }
  ((200 * score + total) / (2 * total)) as u32
}
