//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! Exams go out without correct indices or rationale; those only travel back
//! inside a result, after the attempt is submitted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Exam, GradeResult, QuestionOutcome, Topic};
use crate::session::{Attempt, Phase};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    NewExam,
    SubmitAnswers {
        #[serde(rename = "examId")]
        exam_id: String,
        answers: BTreeMap<usize, usize>,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Exam {
        exam: ExamOut,
    },
    Result {
        #[serde(rename = "examId")]
        exam_id: String,
        result: ResultOut,
    },
    Error {
        message: String,
    },
}

/// One question as the renderer sees it.
#[derive(Debug, Serialize)]
pub struct QuestionOut {
    pub position: usize,
    pub topic: Topic,
    pub text: String,
    pub options: Vec<String>,
}

/// DTO used by both WS and HTTP for exam delivery.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamOut {
    pub exam_id: String,
    pub questions: Vec<QuestionOut>,
}

/// Convert an internal `Exam` to the public DTO.
pub fn exam_out(exam: &Exam) -> ExamOut {
    ExamOut {
        exam_id: exam.id.to_string(),
        questions: exam
            .questions()
            .iter()
            .enumerate()
            .map(|(position, q)| QuestionOut {
                position,
                topic: q.topic.clone(),
                text: q.text.clone(),
                options: q.options.clone(),
            })
            .collect(),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeOut {
    #[serde(flatten)]
    pub outcome: QuestionOutcome,
    pub verdict: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ResultOut {
    pub score: usize,
    pub total: usize,
    pub percentage: u32,
    pub summary: String,
    pub outcomes: Vec<OutcomeOut>,
}

pub fn result_out(result: &GradeResult) -> ResultOut {
    ResultOut {
        score: result.score,
        total: result.total,
        percentage: result.percentage,
        summary: result.summary(),
        outcomes: result
            .outcomes
            .iter()
            .map(|o| OutcomeOut { outcome: o.clone(), verdict: o.verdict() })
            .collect(),
    }
}

#[derive(Debug, Serialize)]
pub struct AttemptOut {
    pub phase: Phase,
    pub exam: ExamOut,
    pub result: Option<ResultOut>,
}

pub fn attempt_out(attempt: &Attempt) -> AttemptOut {
    AttemptOut {
        phase: attempt.phase(),
        exam: exam_out(attempt.exam()),
        result: attempt.result().map(result_out),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct SubmitIn {
    /// Exam position -> chosen option index. JSON object keys are the positions.
    pub answers: BTreeMap<usize, usize>,
}

#[derive(Serialize)]
pub struct TopicOut {
    pub topic: Topic,
    pub available: usize,
    pub planned: usize,
}

#[derive(Serialize)]
pub struct TopicsOut {
    pub topics: Vec<TopicOut>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub catalog: &'static str,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Question;
    use std::sync::Arc;

    #[test]
    fn exam_out_hides_answers() {
        let exam = Exam::new(vec![Arc::new(Question {
            id: 4,
            topic: Topic::from("HTML"),
            text: "Which tag?".into(),
            options: vec!["<b>".into(), "<i>".into()],
            correct_index: 1,
            rationale: "secret".into(),
        })]);
        let json = serde_json::to_value(exam_out(&exam)).unwrap();
        assert_eq!(json["examId"], exam.id.to_string());
        assert_eq!(json["questions"][0]["position"], 0);
        assert_eq!(json["questions"][0]["topic"], "HTML");
        let text = json.to_string();
        assert!(!text.contains("secret"));
        assert!(!text.contains("correct"));
    }

    #[test]
    fn submit_in_accepts_string_keys() {
        let body: SubmitIn = serde_json::from_str(r#"{"answers": {"0": 2, "1": 0}}"#).unwrap();
        assert_eq!(body.answers, BTreeMap::from([(0, 2), (1, 0)]));
    }

    #[test]
    fn ws_messages_are_tagged() {
        let msg: ClientWsMessage =
            serde_json::from_str(r#"{"type": "submit_answers", "examId": "x", "answers": {"0": 1}}"#).unwrap();
        assert!(matches!(msg, ClientWsMessage::SubmitAnswers { .. }));
        let out = serde_json::to_string(&ServerWsMessage::Pong).unwrap();
        assert_eq!(out, r#"{"type":"pong"}"#);
    }

    #[test]
    fn outcome_is_flattened_with_verdict() {
        let o = QuestionOutcome {
            position: 0,
            correct: false,
            correct_index: 2,
            chosen_index: 1,
            rationale: "why".into(),
        };
        let json = serde_json::to_value(OutcomeOut { verdict: o.verdict(), outcome: o }).unwrap();
        assert_eq!(json["correctIndex"], 2);
        assert_eq!(json["chosenIndex"], 1);
        assert_eq!(json["verdict"], "Incorrect");
    }
}
