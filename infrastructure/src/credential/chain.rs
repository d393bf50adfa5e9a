//! Credential chain: tries each provider in order.

use super::{AzureCliCredential, ClientSecretCredential, ManagedIdentityCredential};
use async_trait::async_trait;
use relay_application::{AccessToken, CredentialError, CredentialProvider};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ChainedCredential {
    providers: Vec<Arc<dyn CredentialProvider>>,
}

impl ChainedCredential {
    pub fn new(providers: Vec<Arc<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }

    /// Environment service principal (when configured), managed identity, Azure CLI.
    pub fn default_chain(http: reqwest::Client) -> Self {
        let mut providers: Vec<Arc<dyn CredentialProvider>> = Vec::new();
        if let Some(env) = ClientSecretCredential::from_env(http.clone()) {
            providers.push(Arc::new(env));
        }
        providers.push(Arc::new(ManagedIdentityCredential::from_env(http)));
        providers.push(Arc::new(AzureCliCredential::default()));
        Self::new(providers)
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

#[async_trait]
impl CredentialProvider for ChainedCredential {
    fn name(&self) -> &'static str {
        "default_chain"
    }

    async fn acquire(&self, scope: &str) -> Result<AccessToken, CredentialError> {
        let mut failures = Vec::new();
        for provider in &self.providers {
            match provider.acquire(scope).await {
                Ok(token) => {
                    info!("Acquired token via {}", provider.name());
                    return Ok(token);
                }
                Err(e) => {
                    debug!("Credential {} failed: {}", provider.name(), e);
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }
        Err(CredentialError::ChainExhausted(failures))
    }
}
