//! Service principal credential (client secret flow).

use super::{read_token_response, seconds};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use relay_application::{AccessToken, CredentialError, CredentialProvider};
use tracing::debug;

const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

pub struct ClientSecretCredential {
    http: reqwest::Client,
    authority: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
}

impl ClientSecretCredential {
    pub fn new(
        http: reqwest::Client,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            authority: DEFAULT_AUTHORITY.to_string(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Reads `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and `AZURE_CLIENT_SECRET`
    /// (plus optional `AZURE_AUTHORITY_HOST`). `None` when any is missing.
    pub fn from_env(http: reqwest::Client) -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let mut credential = Self::new(
            http,
            var("AZURE_TENANT_ID")?,
            var("AZURE_CLIENT_ID")?,
            var("AZURE_CLIENT_SECRET")?,
        );
        if let Some(authority) = var("AZURE_AUTHORITY_HOST") {
            credential.authority = authority.trim_end_matches('/').to_string();
        }
        Some(credential)
    }

    fn token_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.authority, self.tenant_id)
    }
}

#[async_trait]
impl CredentialProvider for ClientSecretCredential {
    fn name(&self) -> &'static str {
        "environment"
    }

    async fn acquire(&self, scope: &str) -> Result<AccessToken, CredentialError> {
        debug!("Requesting client-credentials token for tenant {}", self.tenant_id);
        let response = self
            .http
            .post(self.token_url())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", scope),
            ])
            .send()
            .await
            .map_err(|e| CredentialError::RequestFailed(e.to_string()))?;

        let body = read_token_response(response).await?;
        let token = body
            .get("access_token")
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CredentialError::InvalidResponse("missing access_token".to_string()))?;
        let expires_on = body
            .get("expires_in")
            .and_then(seconds)
            .map(|secs| Utc::now() + Duration::seconds(secs));

        Ok(AccessToken::new(token, expires_on))
    }
}
