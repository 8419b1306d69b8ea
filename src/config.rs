//! Configuration management for ICDAcquire.
//!
//! Settings resolve in three layers: built-in defaults, an optional TOML
//! file, then CLI flags. Client credentials come only from the environment
//! (`.env` files are honored at startup).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::client::CrawlTarget;

/// Config file consulted when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "icdacquire.toml";

/// Environment variable holding the OAuth2 client id.
pub const CLIENT_ID_VAR: &str = "ICD_CLIENT_ID";

/// Environment variable holding the OAuth2 client secret.
pub const CLIENT_SECRET_VAR: &str = "ICD_CLIENT_SECRET";

/// ICD classification version to crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum ClassificationVersion {
    #[serde(rename = "10")]
    #[value(name = "10")]
    Icd10,
    #[serde(rename = "11")]
    #[value(name = "11")]
    Icd11,
}

/// Value of the `API-Version` request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

/// API endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// API origin.
    pub base_url: String,
    /// OAuth2 token endpoint.
    pub token_endpoint: String,
    /// `API-Version` header value.
    pub api_version: ApiVersion,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Fixed delay after each entity fetch, in milliseconds.
    pub request_delay_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://id.who.int".to_string(),
            token_endpoint: "https://icdaccessmanagement.who.int/connect/token".to_string(),
            api_version: ApiVersion::V2,
            timeout_secs: 30,
            request_delay_ms: 0,
        }
    }
}

/// Crawl target settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlSettings {
    /// ICD-10 or ICD-11.
    pub classification_version: ClassificationVersion,
    /// Release id, or `latest` for discovery.
    pub release: String,
    /// Linearization name (ICD-11 only).
    pub linearization: String,
    /// `all`, or a comma-separated list of language codes.
    pub languages: String,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            classification_version: ClassificationVersion::Icd11,
            release: "latest".to_string(),
            linearization: "mms".to_string(),
            languages: "all".to_string(),
        }
    }
}

/// Token lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Token age threshold before reissue, in seconds.
    pub refresh_after_secs: u64,
    /// Pause before reissuing a token, in seconds.
    pub cooldown_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            refresh_after_secs: 180,
            cooldown_secs: 60,
        }
    }
}

/// Dataset output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Dataset output root directory.
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("datasets"),
        }
    }
}

/// Resolved application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub crawl: CrawlSettings,
    pub auth: AuthSettings,
    pub output: OutputSettings,
}

/// Which languages a crawl should cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageSelection {
    /// Every language the release advertises.
    All,
    /// An explicit list of language codes.
    Explicit(Vec<String>),
}

impl Settings {
    /// Load settings from a TOML file, or defaults when none exists.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.api.request_delay_ms)
    }

    pub fn refresh_after(&self) -> Duration {
        Duration::from_secs(self.auth.refresh_after_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.auth.cooldown_secs)
    }

    /// The crawl target described by these settings.
    pub fn target(&self) -> CrawlTarget {
        CrawlTarget {
            base_url: self.api.base_url.clone(),
            version: self.crawl.classification_version,
            release: self.crawl.release.clone(),
            linearization: self.crawl.linearization.clone(),
        }
    }

    /// Parse the configured language selection.
    pub fn language_selection(&self) -> LanguageSelection {
        parse_language_selection(&self.crawl.languages)
    }
}

/// Parse `all` or a comma-separated language list.
pub fn parse_language_selection(raw: &str) -> LanguageSelection {
    if raw.trim().eq_ignore_ascii_case("all") {
        return LanguageSelection::All;
    }
    let codes = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    LanguageSelection::Explicit(codes)
}

/// OAuth2 client credentials, read from the environment.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    /// Read credentials from `ICD_CLIENT_ID` / `ICD_CLIENT_SECRET`.
    pub fn from_env() -> anyhow::Result<Self> {
        let client_id = std::env::var(CLIENT_ID_VAR)
            .map_err(|_| anyhow::anyhow!("{CLIENT_ID_VAR} is not set"))?;
        let client_secret = std::env::var(CLIENT_SECRET_VAR)
            .map_err(|_| anyhow::anyhow!("{CLIENT_SECRET_VAR} is not set"))?;
        Ok(Self {
            client_id,
            client_secret,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api.base_url, "https://id.who.int");
        assert_eq!(settings.api.api_version, ApiVersion::V2);
        assert_eq!(
            settings.crawl.classification_version,
            ClassificationVersion::Icd11
        );
        assert_eq!(settings.crawl.release, "latest");
        assert_eq!(settings.crawl.linearization, "mms");
        assert_eq!(settings.auth.refresh_after_secs, 180);
        assert_eq!(settings.auth.cooldown_secs, 60);
        assert_eq!(settings.output.dir, PathBuf::from("datasets"));
    }

    #[test]
    fn test_partial_toml_overrides() {
        let settings: Settings = toml::from_str(
            r#"
            [crawl]
            classification_version = "10"
            release = "2019"

            [auth]
            cooldown_secs = 0
            "#,
        )
        .unwrap();
        assert_eq!(
            settings.crawl.classification_version,
            ClassificationVersion::Icd10
        );
        assert_eq!(settings.crawl.release, "2019");
        assert_eq!(settings.crawl.languages, "all");
        assert_eq!(settings.auth.cooldown_secs, 0);
        assert_eq!(settings.auth.refresh_after_secs, 180);
    }

    #[test]
    fn test_language_selection_all() {
        assert_eq!(parse_language_selection("all"), LanguageSelection::All);
        assert_eq!(parse_language_selection(" ALL "), LanguageSelection::All);
    }

    #[test]
    fn test_language_selection_explicit() {
        assert_eq!(
            parse_language_selection("en, es,ar"),
            LanguageSelection::Explicit(vec![
                "en".to_string(),
                "es".to_string(),
                "ar".to_string()
            ])
        );
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = Credentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("\"secret\""));
        assert!(debug.contains("<redacted>"));
    }
}
