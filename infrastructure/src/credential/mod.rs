//! Credential adapters
//!
//! Implementations of [`CredentialProvider`] for the Azure identity sources
//! the relay supports:
//!
//! - [`AzureCliCredential`] - token from the signed-in `az` CLI
//! - [`ClientSecretCredential`] - service principal from `AZURE_*` variables
//! - [`ManagedIdentityCredential`] - App Service / IMDS managed identity
//! - [`ChainedCredential`] - first of the above that succeeds

mod azure_cli;
mod chain;
mod client_secret;
mod managed_identity;

pub use azure_cli::AzureCliCredential;
pub use chain::ChainedCredential;
pub use client_secret::ClientSecretCredential;
pub use managed_identity::ManagedIdentityCredential;

use chrono::{DateTime, Utc};
use relay_application::{CredentialError, CredentialProvider, CredentialStrategy};
use std::sync::Arc;

/// Build the provider selected by configuration.
pub fn credential_provider(
    strategy: CredentialStrategy,
    http: reqwest::Client,
) -> Arc<dyn CredentialProvider> {
    match strategy {
        CredentialStrategy::AzureCli => Arc::new(AzureCliCredential::default()),
        CredentialStrategy::DefaultChain => Arc::new(ChainedCredential::default_chain(http)),
    }
}

/// Resource URI for a `.default` scope (`https://ai.azure.com/.default` → `https://ai.azure.com`).
pub(crate) fn scope_to_resource(scope: &str) -> &str {
    scope.strip_suffix("/.default").unwrap_or(scope)
}

/// Token endpoints send second counts either as numbers or as strings.
pub(crate) fn seconds(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn epoch_seconds(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds(value)?, 0)
}

pub(crate) async fn read_token_response(
    response: reqwest::Response,
) -> Result<serde_json::Value, CredentialError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| CredentialError::RequestFailed(e.to_string()))?;
    if !status.is_success() {
        return Err(CredentialError::RequestFailed(format!(
            "status {}: {}",
            status.as_u16(),
            relay_domain::util::preview(&body, 300)
        )));
    }
    serde_json::from_str(&body).map_err(|e| CredentialError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_to_resource() {
        assert_eq!(
            scope_to_resource("https://ai.azure.com/.default"),
            "https://ai.azure.com"
        );
        assert_eq!(scope_to_resource("https://ai.azure.com"), "https://ai.azure.com");
    }

    #[test]
    fn test_epoch_seconds_accepts_both_forms() {
        let a = epoch_seconds(&serde_json::json!(1_700_000_000)).unwrap();
        let b = epoch_seconds(&serde_json::json!("1700000000")).unwrap();
        assert_eq!(a, b);
        assert!(epoch_seconds(&serde_json::json!("soon")).is_none());
    }
}
