//! HTTP access to the WHO ICD classification API.

mod auth;

pub use auth::{BearerToken, CredentialGate, CredentialProvider, TokenEndpoint, TOKEN_SCOPE};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::{ApiVersion, ClassificationVersion};
use crate::error::CrawlError;
use crate::models::EntityNode;

/// User agent sent with every API request.
pub const USER_AGENT: &str = concat!("icdacquire/", env!("CARGO_PKG_VERSION"));

/// Rewrite a `http://` entity URI to `https://`.
///
/// WHO entity documents embed `http://id.who.int/...` identifiers, but the
/// API itself is only served over TLS.
pub fn sanitize_uri(uri: &str) -> String {
    match uri.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => uri.to_string(),
    }
}

/// Where a crawl points: API origin, classification version, release,
/// and linearization.
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    /// API origin, e.g. `https://id.who.int`.
    pub base_url: String,
    /// ICD-10 or ICD-11.
    pub version: ClassificationVersion,
    /// Release id, or `latest` for discovery.
    pub release: String,
    /// Linearization name (ICD-11 only).
    pub linearization: String,
}

impl CrawlTarget {
    fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Whether the release must be discovered via `latestRelease`.
    pub fn wants_latest(&self) -> bool {
        self.release == "latest"
    }

    /// URI of the versionless entity that advertises `latestRelease`.
    pub fn discovery_uri(&self) -> String {
        match self.version {
            ClassificationVersion::Icd11 => {
                format!("{}/icd/release/11/{}", self.origin(), self.linearization)
            }
            ClassificationVersion::Icd10 => format!("{}/icd/release/10", self.origin()),
        }
    }

    /// Root URI for an explicitly named release.
    pub fn release_uri(&self) -> String {
        match self.version {
            ClassificationVersion::Icd11 => format!(
                "{}/icd/release/11/{}/{}",
                self.origin(),
                self.release,
                self.linearization
            ),
            ClassificationVersion::Icd10 => {
                format!("{}/icd/release/10/{}", self.origin(), self.release)
            }
        }
    }
}

/// Source of classification entities.
///
/// The walker depends only on this seam; tests substitute an in-memory
/// tree.
#[async_trait]
pub trait EntitySource: Send + Sync {
    /// Fetch one entity in the given language using the given bearer token.
    async fn fetch_entity(
        &self,
        uri: &str,
        language: &str,
        token: &str,
    ) -> Result<EntityNode, CrawlError>;
}

/// HTTP entity source backed by the WHO API.
#[derive(Clone)]
pub struct IcdClient {
    client: Client,
    api_version: ApiVersion,
    request_delay: Duration,
}

impl IcdClient {
    /// Create a new API client.
    pub fn new(api_version: ApiVersion, timeout: Duration, request_delay: Duration) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_version,
            request_delay,
        }
    }
}

#[async_trait]
impl EntitySource for IcdClient {
    async fn fetch_entity(
        &self,
        uri: &str,
        language: &str,
        token: &str,
    ) -> Result<EntityNode, CrawlError> {
        let url = sanitize_uri(uri);
        debug!("GET {} (lang: {})", url, language);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Accept", "application/json")
            .header("Accept-Language", language)
            .header("API-Version", self.api_version.as_str())
            .send()
            .await
            .map_err(|source| CrawlError::RemoteFetch {
                uri: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::RemoteStatus { uri: url, status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| CrawlError::RemoteFetch {
                uri: url.clone(),
                source,
            })?;

        let node = serde_json::from_slice(&body)
            .map_err(|source| CrawlError::Malformed { uri: url, source })?;

        if self.request_delay > Duration::ZERO {
            tokio::time::sleep(self.request_delay).await;
        }

        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_uri_rewrites_http() {
        assert_eq!(
            sanitize_uri("http://id.who.int/icd/entity/1"),
            "https://id.who.int/icd/entity/1"
        );
    }

    #[test]
    fn test_sanitize_uri_keeps_https() {
        assert_eq!(
            sanitize_uri("https://id.who.int/icd/entity/1"),
            "https://id.who.int/icd/entity/1"
        );
    }

    #[test]
    fn test_icd11_uris() {
        let target = CrawlTarget {
            base_url: "https://id.who.int/".to_string(),
            version: ClassificationVersion::Icd11,
            release: "2024-01".to_string(),
            linearization: "mms".to_string(),
        };
        assert!(!target.wants_latest());
        assert_eq!(
            target.discovery_uri(),
            "https://id.who.int/icd/release/11/mms"
        );
        assert_eq!(
            target.release_uri(),
            "https://id.who.int/icd/release/11/2024-01/mms"
        );
    }

    #[test]
    fn test_icd10_uris() {
        let target = CrawlTarget {
            base_url: "https://id.who.int".to_string(),
            version: ClassificationVersion::Icd10,
            release: "latest".to_string(),
            linearization: "mms".to_string(),
        };
        assert!(target.wants_latest());
        assert_eq!(target.discovery_uri(), "https://id.who.int/icd/release/10");
    }
}
