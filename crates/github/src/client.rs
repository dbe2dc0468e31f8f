//! GitHub REST client

use crate::config::ClientConfig;
use crate::endpoints::{ArtifactsApi, RunsApi};
use crate::error::{ApiError, ApiResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

/// GitHub REST API version header
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";

/// Correlates our log lines for one logical request across retries
const X_REQUEST_ID: &str = "X-Request-ID";

/// Bearer-authenticated client scoped to one repository
///
/// Wraps `reqwest` and adds retry with backoff for idempotent GETs.
#[derive(Clone)]
pub struct GithubClient {
    inner: Client,
    config: Arc<ClientConfig>,
}

impl GithubClient {
    /// Create a new client with specific configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        default_headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("apkbuilder/", env!("CARGO_PKG_VERSION"))),
        );

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token.expose()))
            .map_err(|_| ApiError::config("token contains characters not allowed in a header"))?;
        auth.set_sensitive(true);
        default_headers.insert(AUTHORIZATION, auth);

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Access workflow run endpoints
    #[must_use]
    pub fn runs(&self) -> RunsApi {
        RunsApi::new(self.clone())
    }

    /// Access artifact endpoints
    #[must_use]
    pub fn artifacts(&self) -> ArtifactsApi {
        ArtifactsApi::new(self.clone())
    }

    /// GET a path under `/repos/{owner}/{repo}/`
    #[instrument(skip(self), fields(repo = %self.config.repo.full_name()))]
    pub async fn get_repo<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = format!("{}/{}", self.config.repo_url(), path.trim_start_matches('/'));
        self.execute_with_retry(&url, query).await
    }

    /// Execute request with retry logic
    async fn execute_with_retry<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let request_id = Uuid::new_v4().to_string();
        let retry_config = &self.config.retry;
        let mut last_error: Option<ApiError> = None;

        for attempt in 0..retry_config.max_attempts {
            if attempt > 0 {
                let delay = retry_config.delay_for_attempt(attempt);
                debug!(
                    request_id = %request_id,
                    attempt = attempt,
                    delay_ms = delay.as_millis(),
                    "Retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();
            let result = self.execute_single_request(&request_id, url, query).await;
            let elapsed = start.elapsed();

            match result {
                Ok(value) => {
                    debug!(
                        request_id = %request_id,
                        attempt = attempt + 1,
                        elapsed_ms = elapsed.as_millis(),
                        "Request succeeded"
                    );
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt + 1 < retry_config.max_attempts => {
                    debug!(
                        request_id = %request_id,
                        attempt = attempt + 1,
                        error = %e,
                        "Request failed, will retry"
                    );
                    last_error = Some(e);
                }
                Err(e) => {
                    debug!(
                        request_id = %request_id,
                        attempt = attempt + 1,
                        error = %e,
                        "Request failed, not retrying"
                    );
                    return Err(e);
                }
            }
        }

        Err(ApiError::RetriesExhausted {
            attempts: retry_config.max_attempts,
            last_error: last_error.map_or_else(|| "Unknown error".to_string(), |e| e.to_string()),
        })
    }

    /// Execute a single request without retry
    async fn execute_single_request<T: DeserializeOwned>(
        &self,
        request_id: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let response = self
            .inner
            .get(url)
            .header(X_REQUEST_ID, request_id)
            .query(query)
            .send()
            .await?;
        handle_response(response).await
    }
}

/// Handle HTTP response and deserialize
async fn handle_response<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();

    if status.is_success() {
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Err(ApiError::Unauthorized {
            status: status.as_u16(),
        })
    } else {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(ApiError::api_response(status.as_u16(), message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apkbuilder_core::credential::Credential;
    use apkbuilder_core::remote::RepoSlug;

    fn config() -> ClientConfig {
        ClientConfig::new(
            RepoSlug::parse("https://github.com/acme/app").unwrap(),
            Credential::new("tok123").unwrap(),
        )
    }

    #[test]
    fn test_client_creation() {
        assert!(GithubClient::with_config(config()).is_ok());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = GithubClient::with_config(config().with_api_url("not-a-url"));
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[test]
    fn test_header_hostile_token_is_rejected() {
        let mut config = config();
        config.token = Credential::new("tok\n123").unwrap();
        assert!(GithubClient::with_config(config).is_err());
    }
}
