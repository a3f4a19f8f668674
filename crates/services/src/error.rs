//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::SessionError;
use storage::StorageError;

/// Errors raised while building an `ApiConfig`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiConfigError {
    #[error("invalid API base URL {raw:?}: {source}")]
    InvalidUrl {
        raw: String,
        #[source]
        source: url::ParseError,
    },
    #[error("API base URL must use http or https, got {scheme:?}")]
    UnsupportedScheme { scheme: String },
    #[error("invalid timeout {raw:?}")]
    InvalidTimeout { raw: String },
    #[error(transparent)]
    Client(#[from] reqwest::Error),
}

/// Errors emitted by `QuizSessionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("enter a topic or a Wikipedia URL")]
    EmptySource,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `HistoryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}
