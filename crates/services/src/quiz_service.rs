use std::sync::Arc;

use log::{info, warn};
use quiz_core::model::QuizId;
use quiz_core::{LoadOutcome, QuizSession};
use storage::{HistoryRepository, QuizProvider, StorageError};

use crate::error::QuizServiceError;

pub const GENERIC_FAILURE: &str = "Failed to generate quiz";

/// Message shown to the user when fetching a quiz fails.
///
/// Prefers the backend's own explanation.
#[must_use]
pub fn user_message(err: &StorageError) -> String {
    if let Some(detail) = err.detail() {
        return detail.to_owned();
    }
    match err {
        StorageError::NotFound => "Quiz not found".to_owned(),
        StorageError::Malformed(inner) => format!("The generated quiz was unusable: {inner}"),
        StorageError::Network(_) => {
            format!("{GENERIC_FAILURE}: the quiz service could not be reached")
        }
        _ => GENERIC_FAILURE.to_owned(),
    }
}

/// Drives a `QuizSession` through fetches from the quiz source or history.
///
/// Fetch failures do not surface as `Err`: they move the session into
/// `Phase::Error` with a user-visible message and report `LoadOutcome::Failed`.
#[derive(Clone)]
pub struct QuizSessionService {
    provider: Arc<dyn QuizProvider>,
    history: Arc<dyn HistoryRepository>,
}

impl QuizSessionService {
    #[must_use]
    pub fn new(provider: Arc<dyn QuizProvider>, history: Arc<dyn HistoryRepository>) -> Self {
        Self { provider, history }
    }

    /// Generate a quiz for a topic or Wikipedia URL and load it.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::EmptySource` for a blank source and
    /// `QuizServiceError::Session` if the session is mid-attempt.
    pub async fn generate(
        &self,
        session: &mut QuizSession,
        source: &str,
    ) -> Result<LoadOutcome, QuizServiceError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(QuizServiceError::EmptySource);
        }
        let ticket = session.begin_loading()?;
        let outcome = match self.provider.generate(source).await {
            Ok(quiz) => session.finish_loading(ticket, quiz),
            Err(err) => {
                warn!("quiz generation for {source:?} failed: {err}");
                session.fail_loading(ticket, user_message(&err))
            }
        };
        Ok(outcome)
    }

    /// Load a stored quiz for another attempt.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Session` if the session is mid-attempt.
    pub async fn retake(
        &self,
        session: &mut QuizSession,
        id: QuizId,
    ) -> Result<LoadOutcome, QuizServiceError> {
        let ticket = session.begin_loading()?;
        let outcome = match self.history.get_quiz(id).await {
            Ok(quiz) => {
                info!("retaking quiz {id}");
                session.finish_loading(ticket, quiz)
            }
            Err(err) => {
                warn!("loading quiz {id} failed: {err}");
                session.fail_loading(ticket, user_message(&err))
            }
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_backend_detail() {
        let err = StorageError::Status {
            status: 400,
            detail: Some("Could not find a Wikipedia page".into()),
        };
        assert_eq!(user_message(&err), "Could not find a Wikipedia page");

        let err = StorageError::Status {
            status: 500,
            detail: None,
        };
        assert_eq!(user_message(&err), GENERIC_FAILURE);
        assert_eq!(user_message(&StorageError::NotFound), "Quiz not found");
    }
}
