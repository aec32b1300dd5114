//! Client configuration (layered: code > env > defaults).

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::auth::store::{CredentialStoreConfig, FileCredentialStore};
use crate::error::{FitplanError, Result};

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";

/// Request timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "FITPLAN_API_URL";
pub const ENV_CONFIG_DIR: &str = "FITPLAN_CONFIG_DIR";
pub const ENV_TIMEOUT_SECS: &str = "FITPLAN_TIMEOUT_SECS";

/// Settings shared by the session manager and the CLI.
#[derive(Debug, Clone)]
pub struct FitplanConfig {
    base_url: String,
    credential_dir: PathBuf,
    timeout: Duration,
    user_agent: String,
}

impl Default for FitplanConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FitplanConfig {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credential_dir: CredentialStoreConfig::default_dir(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("fitplan/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Load from environment variables (`FITPLAN_API_URL`,
    /// `FITPLAN_CONFIG_DIR`, `FITPLAN_TIMEOUT_SECS`), reading `.env` first.
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::new();

        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.trim().is_empty() {
                config = config.with_base_url(url);
            }
        }
        if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
            if !dir.trim().is_empty() {
                config = config.with_credential_dir(PathBuf::from(dir));
            }
        }
        if let Some(secs) = std::env::var(ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            config = config.with_timeout(Duration::from_secs(secs));
        }

        config
    }

    /// Set the API base URL. A trailing slash is added when missing so that
    /// relative endpoint paths resolve underneath it.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into().trim().to_string();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.base_url = url;
        self
    }

    pub fn with_credential_dir(mut self, dir: PathBuf) -> Self {
        self.credential_dir = dir;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Parsed base URL.
    pub fn parsed_base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url).map_err(|e| {
            FitplanError::Configuration(format!("invalid base URL {}: {e}", self.base_url))
        })
    }

    pub fn credential_dir(&self) -> &PathBuf {
        &self.credential_dir
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// File-backed credential store rooted at the configured directory.
    pub fn credential_store(&self) -> FileCredentialStore {
        FileCredentialStore::new(CredentialStoreConfig::new(self.credential_dir.clone()))
    }

    /// HTTP client honouring the configured timeout and user agent.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(|e| FitplanError::Configuration(format!("failed to build HTTP client: {e}")))
    }
}
