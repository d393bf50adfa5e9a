//! Runtime factory for Foundry agent clients.

use super::client::FoundryAgentClient;
use async_trait::async_trait;
use relay_application::{AccessToken, AgentClient, AgentRuntime, RuntimeError};
use reqwest::Url;
use std::time::Duration;

pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Transport options for the Agents REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundryOptions {
    pub api_version: String,
    /// Delay between run status polls.
    pub poll_interval: Duration,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
}

impl Default for FoundryOptions {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

/// Opens [`FoundryAgentClient`]s sharing one HTTP connection pool.
pub struct FoundryAgentRuntime {
    http: reqwest::Client,
    options: FoundryOptions,
}

impl FoundryAgentRuntime {
    pub fn new(options: FoundryOptions) -> Result<Self, RuntimeError> {
        let http = reqwest::Client::builder()
            .timeout(options.http_timeout)
            .build()
            .map_err(|e| RuntimeError::ConnectionError(e.to_string()))?;
        Ok(Self { http, options })
    }

    pub fn http_client(&self) -> reqwest::Client {
        self.http.clone()
    }
}

#[async_trait]
impl AgentRuntime for FoundryAgentRuntime {
    async fn connect(
        &self,
        endpoint: &str,
        token: &AccessToken,
    ) -> Result<Box<dyn AgentClient>, RuntimeError> {
        let trimmed = endpoint.trim().trim_end_matches('/');
        let base = Url::parse(trimmed)
            .ok()
            .filter(|url| matches!(url.scheme(), "https" | "http") && url.host().is_some())
            .ok_or_else(|| {
                RuntimeError::ConnectionError(format!(
                    "project endpoint is not an http(s) URL: {}",
                    trimmed
                ))
            })?;
        Ok(Box::new(FoundryAgentClient::new(
            self.http.clone(),
            base,
            token.secret(),
            self.options.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_non_url_endpoint() {
        let runtime = FoundryAgentRuntime::new(FoundryOptions::default()).unwrap();
        let token = AccessToken::new("t", None);
        for endpoint in ["my-project", "ftp://w.services.ai.azure.com/api/projects/demo"] {
            let err = runtime.connect(endpoint, &token).await.err().unwrap();
            assert!(matches!(err, RuntimeError::ConnectionError(_)));
        }
    }

    #[tokio::test]
    async fn test_connect_accepts_project_endpoint() {
        let runtime = FoundryAgentRuntime::new(FoundryOptions::default()).unwrap();
        let token = AccessToken::new("t", None);
        assert!(
            runtime
                .connect("https://w.services.ai.azure.com/api/projects/demo/", &token)
                .await
                .is_ok()
        );
    }
}
