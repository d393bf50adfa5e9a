//! Credential port
//!
//! Yields an access token for the agent service. One token is acquired per
//! request and dropped after the agent client has closed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Token scope of the Azure AI Foundry agent service.
pub const AGENT_SERVICE_SCOPE: &str = "https://ai.azure.com/.default";

/// Errors that can occur while acquiring a credential
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Credential unavailable: {0}")]
    Unavailable(String),

    #[error("Credential command failed: {0}")]
    CommandFailed(String),

    #[error("Token request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    #[error("No credential in the chain succeeded: {}", .0.join("; "))]
    ChainExhausted(Vec<String>),
}

/// A bearer token for the agent service.
#[derive(Clone)]
pub struct AccessToken {
    token: String,
    expires_on: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_on: Option<DateTime<Utc>>) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }

    pub fn secret(&self) -> &str {
        &self.token
    }

    pub fn expires_on(&self) -> Option<DateTime<Utc>> {
        self.expires_on
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Source of access tokens
///
/// Implementations (Azure CLI, default chain) live in the infrastructure layer.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Acquire a token for `scope`.
    async fn acquire(&self, scope: &str) -> Result<AccessToken, CredentialError>;
}
