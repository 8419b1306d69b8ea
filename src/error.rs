//! Error types for crawling and dataset production.

use thiserror::Error;

/// Errors that can occur while crawling a classification release.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Credential acquisition failed: {0}")]
    CredentialAcquisition(String),

    #[error("Request to {uri} failed: {source}")]
    RemoteFetch {
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {uri} returned status {status}")]
    RemoteStatus {
        uri: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed entity body from {uri}: {source}")]
    Malformed {
        uri: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Entity {uri} is missing required field '{field}'")]
    MissingField { uri: String, field: &'static str },

    #[error("Category {uri} encountered outside any chapter")]
    MissingChapterContext { uri: String },

    #[error("Crawl cancelled")]
    Cancelled,
}

impl CrawlError {
    /// True when the error is an operator-requested stop rather than a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
