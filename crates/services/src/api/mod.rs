//! HTTP client for the quiz backend.

mod wire;

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use quiz_core::model::{HistoryEntry, Quiz, QuizId};
use reqwest::{Client, Response, StatusCode};
use storage::{HistoryRepository, QuizProvider, StorageError};
use url::Url;

use crate::error::ApiConfigError;

pub use wire::{decode_history, decode_quiz, error_detail};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
    timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    /// # Errors
    ///
    /// Returns `ApiConfigError` if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ApiConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Read `QUIZ_API_URL` and `QUIZ_API_TIMEOUT_SECS`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ApiConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ApiConfigError> {
        let mut config = match env::var("QUIZ_API_URL") {
            Ok(raw) if !raw.trim().is_empty() => Self::new(&raw)?,
            _ => Self::default(),
        };
        if let Ok(raw) = env::var("QUIZ_API_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ApiConfigError::InvalidTimeout { raw: raw.clone() })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL for an API path such as `quiz/3`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ApiConfigError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|source| ApiConfigError::InvalidUrl {
        raw: trimmed.to_owned(),
        source,
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiConfigError::UnsupportedScheme {
            scheme: parsed.scheme().to_owned(),
        });
    }
    Ok(parsed.as_str().trim_end_matches('/').to_owned())
}

/// REST client implementing the quiz source and history contracts.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns `ApiConfigError::Client` if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiConfigError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn body(response: Response) -> Result<Vec<u8>, StorageError> {
        let status = response.status();
        let bytes = response.bytes().await.map_err(network)?;
        if status.is_success() {
            return Ok(bytes.to_vec());
        }
        if status == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound);
        }
        let detail = error_detail(&bytes);
        warn!("backend answered {status}: {}", detail.as_deref().unwrap_or("-"));
        Err(StorageError::Status {
            status: status.as_u16(),
            detail,
        })
    }
}

fn network(err: reqwest::Error) -> StorageError {
    StorageError::Network(err.to_string())
}

#[async_trait]
impl QuizProvider for ApiClient {
    async fn generate(&self, source: &str) -> Result<Quiz, StorageError> {
        let url = self.config.endpoint("generate");
        info!("requesting quiz for {source:?}");
        let response = self
            .client
            .post(url)
            .json(&wire::GenerateRequest { url: source })
            .send()
            .await
            .map_err(network)?;
        let quiz = decode_quiz(&Self::body(response).await?)?;
        info!("received quiz {} ({} questions)", quiz.id(), quiz.len());
        Ok(quiz)
    }
}

#[async_trait]
impl HistoryRepository for ApiClient {
    async fn list_history(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        let response = self
            .client
            .get(self.config.endpoint("history"))
            .send()
            .await
            .map_err(network)?;
        decode_history(&Self::body(response).await?)
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Quiz, StorageError> {
        let response = self
            .client
            .get(self.config.endpoint(&format!("quiz/{id}")))
            .send()
            .await
            .map_err(network)?;
        decode_quiz(&Self::body(response).await?)
    }

    async fn delete_quiz(&self, id: QuizId) -> Result<(), StorageError> {
        let response = self
            .client
            .delete(self.config.endpoint(&format!("quizzes/{id}")))
            .send()
            .await
            .map_err(network)?;
        let body = Self::body(response).await?;
        debug!("delete {id}: {}", String::from_utf8_lossy(&body));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_keep_backend_paths() {
        let config = ApiConfig::new("http://localhost:8000/api/").unwrap();
        assert_eq!(config.endpoint("generate"), "http://localhost:8000/api/generate");
        assert_eq!(config.endpoint("history"), "http://localhost:8000/api/history");
        assert_eq!(
            config.endpoint(&format!("quiz/{}", QuizId::new(3))),
            "http://localhost:8000/api/quiz/3"
        );
        assert_eq!(
            config.endpoint("/quizzes/3"),
            "http://localhost:8000/api/quizzes/3"
        );
    }

    #[test]
    fn default_points_at_local_backend() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn rejects_bad_base_urls() {
        assert!(matches!(
            ApiConfig::new("not a url"),
            Err(ApiConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ApiConfig::new("ftp://example.com/api"),
            Err(ApiConfigError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn client_builds_from_config() {
        let config = ApiConfig::new("https://quiz.example.com/api")
            .unwrap()
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(ApiClient::new(config).is_ok());
    }
}
