//! Question sources: where the raw question document comes from.
//!
//! A source only fetches text; parsing and validation live in the repository,
//! so every source is held to the same record contract.

use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::LoadError;

/// Provider of the raw JSON question document.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Human-readable origin, used in logs.
    fn describe(&self) -> String;

    /// Fetch the whole document once.
    async fn fetch(&self) -> Result<String, LoadError>;
}

/// A JSON file on local disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuestionSource for FileSource {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    async fn fetch(&self) -> Result<String, LoadError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
        debug!(target: "quiz_backend", bytes = text.len(), "Read question file");
        Ok(text)
    }
}

/// A JSON document served over HTTP(S). Any non-2xx status is a load error.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LoadError> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| LoadError::Http { url: url.clone(), source })?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl QuestionSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    #[instrument(level = "debug", skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<String, LoadError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| LoadError::Http { url: self.url.clone(), source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let text = resp
            .text()
            .await
            .map_err(|source| LoadError::Http { url: self.url.clone(), source })?;
        debug!(target: "quiz_backend", bytes = text.len(), %status, "Fetched question document");
        Ok(text)
    }
}

/// An in-memory document (embedded constant, test fixture, ...).
#[derive(Debug, Clone)]
pub struct EmbeddedSource {
    text: String,
}

impl EmbeddedSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl QuestionSource for EmbeddedSource {
    fn describe(&self) -> String {
        format!("embedded ({} bytes)", self.text.len())
    }

    async fn fetch(&self) -> Result<String, LoadError> {
        Ok(self.text.clone())
    }
}
