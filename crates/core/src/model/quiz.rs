use serde::Deserialize;
use thiserror::Error;

use crate::model::ids::QuizId;
use crate::model::question::{Question, QuestionDraft, QuestionError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz has no questions")]
    NoQuestions,

    #[error("question {index} is malformed: {source}")]
    Question {
        index: usize,
        #[source]
        source: QuestionError,
    },
}

/// A validated quiz: an ordered, non-empty list of questions tied to one
/// generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    title: String,
    url: String,
    summary: Option<String>,
    questions: Vec<Question>,
    related_topics: Vec<String>,
}

impl Quiz {
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` if `questions` is empty.
    pub fn new(
        id: QuizId,
        title: impl Into<String>,
        url: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        Ok(Self {
            id,
            title: title.into(),
            url: url.into(),
            summary: None,
            questions,
            related_topics: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    #[must_use]
    pub fn with_related_topics(mut self, topics: Vec<String>) -> Self {
        self.related_topics = topics;
        self
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The topic or Wikipedia URL the quiz was generated from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed quiz; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn related_topics(&self) -> &[String] {
        &self.related_topics
    }
}

/// Quiz document as returned by `POST /generate` and `GET /quiz/{id}`.
///
/// Apart from `id`, a `null` field reads the same as a missing one.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizDraft {
    pub id: QuizId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(rename = "quiz", default)]
    pub questions: Option<Vec<QuestionDraft>>,
    #[serde(default)]
    pub related_topics: Option<Vec<String>>,
}

impl QuizDraft {
    /// Validate every question and build a `Quiz`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Question` with the index of the first bad question,
    /// or `QuizError::NoQuestions` for an empty document.
    pub fn validate(self) -> Result<Quiz, QuizError> {
        let questions = self
            .questions
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                draft
                    .validate()
                    .map_err(|source| QuizError::Question { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut quiz = Quiz::new(
            self.id,
            self.title.unwrap_or_default(),
            self.url.unwrap_or_default(),
            questions,
        )?
        .with_related_topics(self.related_topics.unwrap_or_default());
        if let Some(summary) = self.summary.filter(|s| !s.trim().is_empty()) {
            quiz = quiz.with_summary(summary);
        }
        Ok(quiz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERATED: &str = r#"{
        "id": 4,
        "url": "https://en.wikipedia.org/wiki/Alan_Turing",
        "title": "Alan Turing",
        "summary": "English mathematician.",
        "quiz": [
            {"question": "Where was Turing born?", "options": ["London", "Paris", "Berlin", "Rome"],
             "correct_answer": "London", "difficulty": "easy", "explanation": "Maida Vale, London."},
            {"question": "What did he break?", "options": ["Enigma", "Lorenz"],
             "correct_answer": "Enigma", "difficulty": "medium", "explanation": "At Bletchley Park."}
        ],
        "related_topics": ["Enigma machine", "Bletchley Park"]
    }"#;

    #[test]
    fn parses_generated_document() {
        let draft: QuizDraft = serde_json::from_str(GENERATED).unwrap();
        let quiz = draft.validate().unwrap();

        assert_eq!(quiz.id(), QuizId::new(4));
        assert_eq!(quiz.title(), "Alan Turing");
        assert_eq!(quiz.len(), 2);
        assert_eq!(quiz.summary(), Some("English mathematician."));
        assert_eq!(quiz.related_topics().len(), 2);
        assert_eq!(quiz.question(1).unwrap().correct_answer(), "Enigma");
    }

    #[test]
    fn reports_index_of_malformed_question() {
        let draft: QuizDraft = serde_json::from_str(
            r#"{"id":1,"title":"t","url":"u","quiz":[
                {"question":"ok","options":["a","b"],"correct_answer":"a"},
                {"question":"bad","options":["a","b"],"correct_answer":"z"}
            ]}"#,
        )
        .unwrap();

        let err = draft.validate().unwrap_err();
        assert!(matches!(
            err,
            QuizError::Question {
                index: 1,
                source: QuestionError::AnswerNotAnOption { .. }
            }
        ));
    }

    #[test]
    fn null_fields_read_as_missing() {
        let draft: QuizDraft = serde_json::from_str(
            r#"{"id":9,"title":null,"url":null,"summary":null,"related_topics":null,"quiz":[
                {"question":"ok","options":["a","b"],"correct_answer":"a","explanation":null}
            ]}"#,
        )
        .unwrap();
        let quiz = draft.validate().unwrap();
        assert_eq!(quiz.title(), "");
        assert_eq!(quiz.summary(), None);
        assert!(quiz.related_topics().is_empty());
        assert_eq!(quiz.question(0).unwrap().explanation(), "");

        let draft: QuizDraft = serde_json::from_str(r#"{"id":9,"quiz":null}"#).unwrap();
        assert_eq!(draft.validate().unwrap_err(), QuizError::NoQuestions);
    }

    #[test]
    fn rejects_empty_quiz() {
        let draft: QuizDraft =
            serde_json::from_str(r#"{"id":1,"title":"t","url":"u","quiz":[]}"#).unwrap();
        assert_eq!(draft.validate().unwrap_err(), QuizError::NoQuestions);
    }
}
