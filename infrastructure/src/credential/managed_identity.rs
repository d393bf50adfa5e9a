//! Managed identity credential.
//!
//! Uses the App Service identity endpoint when `IDENTITY_ENDPOINT` and
//! `IDENTITY_HEADER` are set, otherwise the VM instance metadata service.

use super::{epoch_seconds, read_token_response, scope_to_resource};
use async_trait::async_trait;
use relay_application::{AccessToken, CredentialError, CredentialProvider};
use std::time::Duration;
use tracing::debug;

const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";
const APP_SERVICE_API_VERSION: &str = "2019-08-01";
const IMDS_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Endpoint {
    AppService { url: String, header: String },
    Imds,
}

pub struct ManagedIdentityCredential {
    http: reqwest::Client,
    endpoint: Endpoint,
    client_id: Option<String>,
}

impl ManagedIdentityCredential {
    pub fn from_env(http: reqwest::Client) -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let endpoint = match (var("IDENTITY_ENDPOINT"), var("IDENTITY_HEADER")) {
            (Some(url), Some(header)) => Endpoint::AppService { url, header },
            _ => Endpoint::Imds,
        };
        Self {
            http,
            endpoint,
            client_id: var("AZURE_CLIENT_ID"),
        }
    }

    fn request(&self, resource: &str) -> reqwest::RequestBuilder {
        let mut query = vec![("resource", resource)];
        if let Some(client_id) = &self.client_id {
            query.push(("client_id", client_id.as_str()));
        }
        match &self.endpoint {
            Endpoint::AppService { url, header } => {
                query.push(("api-version", APP_SERVICE_API_VERSION));
                self.http
                    .get(url)
                    .query(&query)
                    .header("X-IDENTITY-HEADER", header)
            }
            Endpoint::Imds => {
                query.push(("api-version", IMDS_API_VERSION));
                self.http
                    .get(IMDS_ENDPOINT)
                    .query(&query)
                    .header("Metadata", "true")
                    .timeout(IMDS_PROBE_TIMEOUT)
            }
        }
    }
}

#[async_trait]
impl CredentialProvider for ManagedIdentityCredential {
    fn name(&self) -> &'static str {
        "managed_identity"
    }

    async fn acquire(&self, scope: &str) -> Result<AccessToken, CredentialError> {
        let resource = scope_to_resource(scope);
        debug!("Requesting managed identity token ({:?})", self.endpoint);

        let response = self.request(resource).send().await.map_err(|e| {
            if matches!(self.endpoint, Endpoint::Imds) && (e.is_connect() || e.is_timeout()) {
                CredentialError::Unavailable("no managed identity endpoint reachable".to_string())
            } else {
                CredentialError::RequestFailed(e.to_string())
            }
        })?;

        let body = read_token_response(response).await?;
        let token = body
            .get("access_token")
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CredentialError::InvalidResponse("missing access_token".to_string()))?;
        let expires_on = body.get("expires_on").and_then(epoch_seconds);

        Ok(AccessToken::new(token, expires_on))
    }
}
