#![forbid(unsafe_code)]

pub mod api;
pub mod error;
pub mod history_service;
pub mod loading;
pub mod quiz_service;

pub use api::{ApiClient, ApiConfig};
pub use error::{ApiConfigError, HistoryServiceError, QuizServiceError};
pub use history_service::{DeleteOutcome, HistoryList, HistoryService};
pub use loading::{LOADING_MESSAGES, LoadingMessages};
pub use quiz_service::{QuizSessionService, user_message};
