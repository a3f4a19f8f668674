//! Request and response bodies of the quiz backend.

use quiz_core::model::{HistoryEntry, Quiz, QuizDraft};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storage::StorageError;

#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest<'a> {
    pub url: &'a str,
}

/// FastAPI error body. `detail` is a string for handled errors and a list of
/// objects for request validation failures.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

/// Parse and validate a quiz document.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for invalid JSON and
/// `StorageError::Malformed` when the quiz fails validation.
pub fn decode_quiz(bytes: &[u8]) -> Result<Quiz, StorageError> {
    let draft: QuizDraft =
        serde_json::from_slice(bytes).map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(draft.validate()?)
}

/// # Errors
///
/// Returns `StorageError::Serialization` for invalid JSON.
pub fn decode_history(bytes: &[u8]) -> Result<Vec<HistoryEntry>, StorageError> {
    serde_json::from_slice(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Extract the `detail` message from an error response body.
#[must_use]
pub fn error_detail(bytes: &[u8]) -> Option<String> {
    let body: ErrorBody = serde_json::from_slice(bytes).ok()?;
    match body.detail? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::String(_) | Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuizError;

    #[test]
    fn generate_request_uses_url_key() {
        let body = serde_json::to_string(&GenerateRequest {
            url: "Quantum Physics",
        })
        .unwrap();
        assert_eq!(body, r#"{"url":"Quantum Physics"}"#);
    }

    #[test]
    fn decodes_stored_quiz_with_question_text() {
        let quiz = decode_quiz(
            br#"{"id":2,"url":"https://en.wikipedia.org/wiki/Rust","title":"Rust","summary":"s",
                 "quiz":[{"id":1,"quiz_id":2,"question_text":"Who made it?","options":["Mozilla","IBM"],
                          "correct_answer":"Mozilla","explanation":"","difficulty":"hard"}],
                 "related_topics":[]}"#,
        )
        .unwrap();
        assert_eq!(quiz.questions()[0].prompt(), "Who made it?");
    }

    #[test]
    fn decodes_quiz_with_null_explanation() {
        let quiz = decode_quiz(
            br#"{"id":5,"url":"Jazz","title":"Jazz","summary":null,
                 "quiz":[{"question":"Born in?","options":["New Orleans","Oslo"],
                          "correct_answer":"New Orleans","difficulty":"easy/medium/hard",
                          "explanation":null}],
                 "related_topics":null}"#,
        )
        .unwrap();
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz.questions()[0].explanation(), "");
    }

    #[test]
    fn malformed_quiz_is_refused() {
        let err = decode_quiz(
            br#"{"id":2,"title":"t","url":"u","quiz":[{"question":"q","options":["a"],"correct_answer":"a"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            StorageError::Malformed(QuizError::Question { index: 0, .. })
        ));
        assert!(matches!(
            decode_quiz(b"<html>"),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn decodes_history_rows() {
        let rows = decode_history(
            br#"[{"id":2,"title":"B","url":"b","created_at":"2025-01-02T00:00:00"},
                 {"id":1,"title":"A","url":"a","created_at":"2025-01-01T00:00:00"}]"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "B");
    }

    #[test]
    fn extracts_error_detail() {
        assert_eq!(
            error_detail(br#"{"detail":"Invalid Wikipedia URL"}"#).as_deref(),
            Some("Invalid Wikipedia URL")
        );
        assert!(error_detail(br#"{"detail":[{"msg":"field required"}]}"#)
            .unwrap()
            .contains("field required"));
        assert_eq!(error_detail(b"Internal Server Error"), None);
        assert_eq!(error_detail(br#"{"detail":""}"#), None);
    }
}
