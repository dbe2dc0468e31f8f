//! Configuration for the GitHub client

use crate::error::{ApiError, ApiResult};
use apkbuilder_core::config::Config;
use apkbuilder_core::credential::Credential;
use apkbuilder_core::remote::RepoSlug;
use apkbuilder_core::retry::RetryConfig;
use std::time::Duration;

/// Default REST API root
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST API root, without trailing slash
    pub api_url: String,
    /// Repository every call is scoped to
    pub repo: RepoSlug,
    /// Bearer token
    pub token: Credential,
    /// Request timeout
    pub timeout: Duration,
    /// Retry configuration for idempotent requests
    pub retry: RetryConfig,
}

impl ClientConfig {
    /// Configuration for `repo` with default endpoint and timeouts
    pub fn new(repo: RepoSlug, token: Credential) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            repo,
            token,
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }

    /// Build from the loaded apkbuilder configuration
    pub fn from_config(config: &Config, token: Credential) -> apkbuilder_core::Result<Self> {
        let repo = config.repo_slug()?;
        Ok(Self::new(repo, token)
            .with_api_url(config.schema.github.api_url.clone())
            .with_timeout(Duration::from_secs(config.schema.github.timeout_secs)))
    }

    /// Builder-style method to set the API root
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{api}/repos/{owner}/{repo}`
    pub fn repo_url(&self) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_url, self.repo.owner, self.repo.name
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ApiError::config("api_url must start with http:// or https://"));
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        Ok(())
    }
}
