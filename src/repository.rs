//! Question repository: the validated, immutable question pool.
//!
//! Records are checked one by one so a bad document is reported with every
//! offending record index, instead of failing later while rendering or grading.

use std::{collections::BTreeMap, sync::Arc};

use serde::Deserialize;
use tracing::{info, instrument};

use crate::domain::{Question, Topic};
use crate::error::{LoadError, RecordProblem, ValidationError};
use crate::source::QuestionSource;

/// Wire shape of one record in the source document.
#[derive(Debug, Deserialize)]
struct RawQuestion {
    topic: String,
    q: String,
    options: Vec<String>,
    correct: i64,
    rationale: String,
}

#[derive(Debug, Clone, Default)]
pub struct QuestionRepository {
    questions: Vec<Arc<Question>>,
}

impl QuestionRepository {
    /// Fetch from `source`, then parse and validate.
    #[instrument(level = "info", skip_all, fields(source = %source.describe()))]
    pub async fn load(source: &dyn QuestionSource) -> Result<Self, LoadError> {
        let text = source.fetch().await?;
        let repo = Self::from_json(&text)?;
        for (topic, count) in repo.topic_counts() {
            info!(target: "quiz_backend", %topic, count, "Question pool loaded");
        }
        Ok(repo)
    }

    /// Parse a JSON array of records. A non-array document is `Malformed`;
    /// bad records are collected into one `ValidationError`.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        let values: Vec<serde_json::Value> =
            serde_json::from_str(text).map_err(|e| LoadError::Malformed(e.to_string()))?;

        let mut questions = Vec::with_capacity(values.len());
        let mut problems = Vec::new();
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<RawQuestion>(value) {
                Ok(raw) => match validate(index, raw) {
                    Ok(q) => questions.push(q),
                    Err(reason) => problems.push(RecordProblem { index, reason }),
                },
                Err(e) => problems.push(RecordProblem { index, reason: e.to_string() }),
            }
        }

        if !problems.is_empty() {
            return Err(ValidationError { problems }.into());
        }
        Ok(Self::from_questions(questions))
    }

    pub fn from_questions(questions: Vec<Question>) -> Self {
        Self { questions: questions.into_iter().map(Arc::new).collect() }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[cfg(test)]
    pub fn questions(&self) -> &[Arc<Question>] {
        &self.questions
    }

    /// All questions of one topic, in source order.
    pub fn pool(&self, topic: &Topic) -> Vec<Arc<Question>> {
        self.questions.iter().filter(|q| &q.topic == topic).cloned().collect()
    }

    /// Pool size per topic.
    pub fn topic_counts(&self) -> BTreeMap<Topic, usize> {
        let mut counts = BTreeMap::new();
        for q in &self.questions {
            *counts.entry(q.topic.clone()).or_insert(0) += 1;
        }
        counts
    }
}

fn validate(index: usize, raw: RawQuestion) -> Result<Question, String> {
    if raw.topic.trim().is_empty() {
        return Err("topic is empty".into());
    }
    if raw.options.is_empty() {
        return Err("options is empty".into());
    }
    let correct_index = usize::try_from(raw.correct)
        .ok()
        .filter(|c| *c < raw.options.len())
        .ok_or_else(|| {
            format!("correct index {} is outside 0..{}", raw.correct, raw.options.len())
        })?;

    Ok(Question {
        id: index,
        topic: Topic::new(raw.topic),
        text: raw.q,
        options: raw.options,
        correct_index,
        rationale: raw.rationale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::EmbeddedSource;

    const TWO_RECORDS: &str = r#"[
        {"topic": "HTML", "q": "Which tag?", "options": ["<a>", "<p>"], "correct": 1, "rationale": "p is a paragraph"},
        {"topic": "CSS", "q": "Which unit?", "options": ["px", "em", "rem"], "correct": 0, "rationale": "px is absolute"}
    ]"#;

    #[test]
    fn parses_valid_records() {
        let repo = QuestionRepository::from_json(TWO_RECORDS).unwrap();
        assert_eq!(repo.len(), 2);
        let first = &repo.questions()[0];
        assert_eq!(first.id, 0);
        assert_eq!(first.topic.as_str(), "HTML");
        assert_eq!(first.text, "Which tag?");
        assert_eq!(first.correct_index, 1);
        assert_eq!(repo.pool(&Topic::from("CSS")).len(), 1);
        assert!(repo.pool(&Topic::from("css")).is_empty());
    }

    #[test]
    fn non_array_is_malformed() {
        let err = QuestionRepository::from_json(r#"{"topic": "HTML"}"#).unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[test]
    fn reports_every_bad_record() {
        let doc = r#"[
            {"topic": "HTML", "q": "ok", "options": ["a"], "correct": 0, "rationale": ""},
            {"topic": "HTML", "options": ["a"], "correct": 0, "rationale": ""},
            {"topic": "HTML", "q": "x", "options": [], "correct": 0, "rationale": ""},
            {"topic": "HTML", "q": "x", "options": ["a", "b"], "correct": 2, "rationale": ""},
            {"topic": "HTML", "q": "x", "options": ["a", "b"], "correct": -1, "rationale": ""},
            {"topic": " ", "q": "x", "options": ["a"], "correct": 0, "rationale": ""}
        ]"#;
        let err = QuestionRepository::from_json(doc).unwrap_err();
        let LoadError::Invalid(v) = err else { panic!("expected validation error") };
        let indices: Vec<usize> = v.problems.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
        assert!(v.problems[0].reason.contains("missing field `q`"));
        assert_eq!(v.problems[1].reason, "options is empty");
        assert_eq!(v.problems[2].reason, "correct index 2 is outside 0..2");
        assert_eq!(v.problems[3].reason, "correct index -1 is outside 0..2");
        assert_eq!(v.problems[4].reason, "topic is empty");
    }

    #[test]
    fn empty_array_is_an_empty_repository() {
        let repo = QuestionRepository::from_json("[]").unwrap();
        assert!(repo.is_empty());
        assert!(repo.topic_counts().is_empty());
    }

    #[test]
    fn bundled_question_bank_is_valid() {
        let repo = QuestionRepository::from_json(include_str!("../static/data.json")).unwrap();
        let counts = repo.topic_counts();
        assert!(counts[&Topic::from("HTML")] >= 5);
        assert!(counts[&Topic::from("CSS")] >= 5);
        assert!(counts[&Topic::from("Javascript")] >= 10);
    }

    #[tokio::test]
    async fn load_goes_through_the_source() {
        let repo = QuestionRepository::load(&EmbeddedSource::new(TWO_RECORDS)).await.unwrap();
        let counts = repo.topic_counts();
        assert_eq!(counts[&Topic::from("HTML")], 1);
        assert_eq!(counts[&Topic::from("CSS")], 1);
    }
}
