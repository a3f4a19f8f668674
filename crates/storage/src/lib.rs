#![forbid(unsafe_code)]

pub mod repository;

pub use repository::{HistoryRepository, InMemoryRepository, QuizProvider, Storage, StorageError};
