//! OAuth2 client-credentials token lifecycle.
//!
//! Tokens are issued by the WHO access-management endpoint and expire
//! server-side. The gate reissues a token once it reaches a configured age,
//! pausing briefly first so a burst of traffic never straddles an expiring
//! credential.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::CrawlError;

/// OAuth2 scope required by the classification API.
pub const TOKEN_SCOPE: &str = "icdapi_access";

/// Safety margin subtracted from a server-reported token lifetime.
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// A bearer token issued by the access-management endpoint.
///
/// The endpoint is treated as a black box; only the access token itself and
/// the optional lifetime are read from the response.
#[derive(Debug, Clone, Deserialize)]
pub struct BearerToken {
    /// Opaque token placed in the Authorization header.
    pub access_token: String,
    /// Server-reported lifetime in seconds, when present.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Source of bearer tokens.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Issue a fresh token.
    async fn issue(&self) -> Result<BearerToken, CrawlError>;
}

/// Production provider: POSTs client credentials to the token endpoint.
pub struct TokenEndpoint {
    client: reqwest::Client,
    endpoint: String,
    client_id: String,
    client_secret: String,
}

impl TokenEndpoint {
    /// Create a provider for the given endpoint and client credentials.
    pub fn new(
        endpoint: String,
        client_id: String,
        client_secret: String,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint,
            client_id,
            client_secret,
        }
    }
}

#[async_trait]
impl CredentialProvider for TokenEndpoint {
    async fn issue(&self) -> Result<BearerToken, CrawlError> {
        let params = [
            ("grant_type", "client_credentials"),
            ("scope", TOKEN_SCOPE),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| CrawlError::CredentialAcquisition(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::CredentialAcquisition(format!(
                "token endpoint returned status {status}"
            )));
        }

        let token: BearerToken = response
            .json()
            .await
            .map_err(|e| CrawlError::CredentialAcquisition(e.to_string()))?;

        debug!("Issued bearer token (expires_in: {:?})", token.expires_in);
        Ok(token)
    }
}

struct TokenState {
    token: BearerToken,
    issued_at: Instant,
    threshold: Duration,
}

/// Single-flight token cache with age-based refresh.
///
/// `acquire` returns the cached token while it is younger than the refresh
/// threshold. Once it ages out, the caller holding the lock sleeps through
/// the cooldown and reissues; concurrent callers wait on the same lock and
/// then see the fresh token.
pub struct CredentialGate<P> {
    provider: P,
    refresh_after: Duration,
    cooldown: Duration,
    state: Mutex<Option<TokenState>>,
}

impl<P: CredentialProvider> CredentialGate<P> {
    /// Create a gate around a provider.
    pub fn new(provider: P, refresh_after: Duration, cooldown: Duration) -> Self {
        Self {
            provider,
            refresh_after,
            cooldown,
            state: Mutex::new(None),
        }
    }

    fn threshold_for(&self, token: &BearerToken) -> Duration {
        match token.expires_in {
            Some(secs) => self
                .refresh_after
                .min(Duration::from_secs(secs).saturating_sub(EXPIRY_MARGIN)),
            None => self.refresh_after,
        }
    }

    /// Get a token valid for the next request, reissuing if aged out.
    pub async fn acquire(&self) -> Result<String, CrawlError> {
        let mut state = self.state.lock().await;

        match state.as_ref() {
            Some(current) if current.issued_at.elapsed() < current.threshold => {
                return Ok(current.token.access_token.clone());
            }
            Some(_) => {
                info!(
                    "Bearer token aged out, pausing {:?} before reissue",
                    self.cooldown
                );
                tokio::time::sleep(self.cooldown).await;
            }
            None => {}
        }

        let token = self.provider.issue().await?;
        let access_token = token.access_token.clone();
        *state = Some(TokenState {
            threshold: self.threshold_for(&token),
            token,
            issued_at: Instant::now(),
        });

        Ok(access_token)
    }
}
