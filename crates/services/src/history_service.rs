use std::sync::Arc;

use log::{info, warn};
use quiz_core::model::{HistoryEntry, Quiz, QuizId};
use storage::{HistoryRepository, StorageError};

use crate::error::HistoryServiceError;

/// Locally held copy of the history list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryList {
    entries: Vec<HistoryEntry>,
}

impl HistoryList {
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: QuizId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    fn remove(&mut self, id: QuizId) {
        self.entries.retain(|entry| entry.id != id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

#[derive(Clone)]
pub struct HistoryService {
    repo: Arc<dyn HistoryRepository>,
}

impl HistoryService {
    #[must_use]
    pub fn new(repo: Arc<dyn HistoryRepository>) -> Self {
        Self { repo }
    }

    /// Fetch the history list.
    ///
    /// # Errors
    ///
    /// Returns `HistoryServiceError` on storage failures.
    pub async fn load(&self) -> Result<HistoryList, HistoryServiceError> {
        let entries = self.repo.list_history().await?;
        Ok(HistoryList { entries })
    }

    /// Fetch one stored quiz in full.
    ///
    /// # Errors
    ///
    /// Returns `HistoryServiceError` if it is missing or cannot be fetched.
    pub async fn detail(&self, id: QuizId) -> Result<Quiz, HistoryServiceError> {
        Ok(self.repo.get_quiz(id).await?)
    }

    /// Delete a stored quiz, removing it from `list` only once the store confirms.
    ///
    /// A missing ID is reported as `DeleteOutcome::NotFound` and leaves `list` as is.
    ///
    /// # Errors
    ///
    /// Returns `HistoryServiceError` for any other failure; `list` is unchanged.
    pub async fn delete(
        &self,
        list: &mut HistoryList,
        id: QuizId,
    ) -> Result<DeleteOutcome, HistoryServiceError> {
        match self.repo.delete_quiz(id).await {
            Ok(()) => {
                info!("deleted quiz {id}");
                list.remove(id);
                Ok(DeleteOutcome::Deleted)
            }
            Err(StorageError::NotFound) => {
                warn!("quiz {id} was already gone");
                Ok(DeleteOutcome::NotFound)
            }
            Err(err) => Err(err.into()),
        }
    }
}
