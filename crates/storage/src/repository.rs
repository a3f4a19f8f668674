use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use quiz_core::Clock;
use quiz_core::model::{HistoryEntry, Quiz, QuizError, QuizId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by quiz sources and history stores.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("network error: {0}")]
    Network(String),

    #[error("request failed with status {status}")]
    Status { status: u16, detail: Option<String> },

    #[error("malformed quiz: {0}")]
    Malformed(#[from] QuizError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("connection error: {0}")]
    Connection(String),
}

impl StorageError {
    /// Server-supplied explanation, when the backend sent one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            StorageError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

/// Source of freshly generated quizzes.
#[async_trait]
pub trait QuizProvider: Send + Sync {
    /// Generate (or fetch the cached) quiz for a topic or Wikipedia URL.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Malformed` if the document fails validation,
    /// or transport errors.
    async fn generate(&self, source: &str) -> Result<Quiz, StorageError>;
}

/// Previously generated quizzes.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// List stored quizzes, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on transport failures.
    async fn list_history(&self) -> Result<Vec<HistoryEntry>, StorageError>;

    /// Fetch a stored quiz by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_quiz(&self, id: QuizId) -> Result<Quiz, StorageError>;

    /// Delete a stored quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no quiz has that ID.
    async fn delete_quiz(&self, id: QuizId) -> Result<(), StorageError>;
}

#[derive(Debug, Clone)]
struct StoredQuiz {
    quiz: Quiz,
    created_at: DateTime<Utc>,
}

/// In-memory quiz store for tests and offline runs.
///
/// `generate` only returns quizzes that were seeded for the same source,
/// like the backend returning the existing quiz for a known URL.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    clock: Clock,
    quizzes: Arc<Mutex<BTreeMap<QuizId, StoredQuiz>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Store a quiz stamped with the repository clock.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert(&self, quiz: Quiz) -> Result<(), StorageError> {
        self.insert_at(quiz, self.clock.now())
    }

    /// Store a quiz with an explicit creation time.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_at(&self, quiz: Quiz, created_at: DateTime<Utc>) -> Result<(), StorageError> {
        let mut guard = self
            .quizzes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(quiz.id(), StoredQuiz { quiz, created_at });
        Ok(())
    }
}

#[async_trait]
impl QuizProvider for InMemoryRepository {
    async fn generate(&self, source: &str) -> Result<Quiz, StorageError> {
        let guard = self
            .quizzes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let source = source.trim();
        guard
            .values()
            .find(|stored| stored.quiz.url() == source)
            .map(|stored| stored.quiz.clone())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl HistoryRepository for InMemoryRepository {
    async fn list_history(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        let guard = self
            .quizzes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut entries: Vec<HistoryEntry> = guard
            .values()
            .map(|stored| HistoryEntry {
                id: stored.quiz.id(),
                title: stored.quiz.title().to_owned(),
                url: stored.quiz.url().to_owned(),
                created_at: stored.created_at,
            })
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Quiz, StorageError> {
        let guard = self
            .quizzes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .get(&id)
            .map(|stored| stored.quiz.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn delete_quiz(&self, id: QuizId) -> Result<(), StorageError> {
        let mut guard = self
            .quizzes
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.remove(&id) {
            Some(_) => {
                debug!("deleted quiz {id}");
                Ok(())
            }
            None => Err(StorageError::NotFound),
        }
    }
}

/// Aggregates the quiz source and history store behind trait objects for
/// easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub provider: Arc<dyn QuizProvider>,
    pub history: Arc<dyn HistoryRepository>,
}

impl Storage {
    #[must_use]
    pub fn new(provider: Arc<dyn QuizProvider>, history: Arc<dyn HistoryRepository>) -> Self {
        Self { provider, history }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Use a single value as both provider and history store.
    #[must_use]
    pub fn from_repository<R>(repo: R) -> Self
    where
        R: QuizProvider + HistoryRepository + Clone + 'static,
    {
        let provider: Arc<dyn QuizProvider> = Arc::new(repo.clone());
        let history: Arc<dyn HistoryRepository> = Arc::new(repo);
        Self { provider, history }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::model::{Difficulty, Question};
    use quiz_core::time::fixed_now;

    fn build_quiz(id: u64, url: &str) -> Quiz {
        let question = Question::new(
            "Q",
            vec!["a".into(), "b".into()],
            "a",
            Difficulty::Easy,
            "",
        )
        .unwrap();
        Quiz::new(QuizId::new(id), format!("Quiz {id}"), url, vec![question]).unwrap()
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let repo = InMemoryRepository::new();
        repo.insert_at(build_quiz(1, "a"), fixed_now()).unwrap();
        repo.insert_at(build_quiz(2, "b"), fixed_now() + Duration::hours(1))
            .unwrap();

        let entries = repo.list_history().await.unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.id.value()).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(entries[0].url, "b");
    }

    #[tokio::test]
    async fn deleting_missing_quiz_reports_not_found() {
        let repo = InMemoryRepository::new().with_clock(Clock::fixed(fixed_now()));
        repo.insert(build_quiz(1, "a")).unwrap();

        let err = repo.delete_quiz(QuizId::new(99)).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
        assert_eq!(repo.list_history().await.unwrap().len(), 1);

        repo.delete_quiz(QuizId::new(1)).await.unwrap();
        assert!(matches!(
            repo.get_quiz(QuizId::new(1)).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn generate_returns_quiz_seeded_for_source() {
        let storage_repo = InMemoryRepository::new();
        storage_repo.insert(build_quiz(3, "Rust")).unwrap();
        let storage = Storage::from_repository(storage_repo);

        let quiz = storage.provider.generate(" Rust ").await.unwrap();
        assert_eq!(quiz.id(), QuizId::new(3));
        assert!(matches!(
            storage.provider.generate("Go").await,
            Err(StorageError::NotFound)
        ));
    }
}
