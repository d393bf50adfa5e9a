//! Error taxonomy for chat requests.
//!
//! Every failure of a chat request ends up in one of three categories, which
//! the HTTP layer maps to a status code:
//!
//! | Category        | Cause                                  | HTTP |
//! |-----------------|----------------------------------------|------|
//! | `Client`        | empty message, malformed thread state  | 400  |
//! | `Configuration` | required setting absent                | 500  |
//! | `Service`       | credential or agent service failure    | 502  |

use crate::config::SettingKey;
use crate::ports::agent_runtime::RuntimeError;
use crate::ports::credential::CredentialError;
use relay_domain::DomainError;
use thiserror::Error;

/// Broad category of a chat failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Client,
    Configuration,
    Service,
}

/// Errors that can occur while serving a chat request.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("{0}")]
    InvalidRequest(#[from] DomainError),

    #[error(
        "Required environment variable '{}' is not set. Set the value before calling the chat API.",
        .0.env_name()
    )]
    MissingSetting(SettingKey),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("Agent service error: {0}")]
    Runtime(#[from] RuntimeError),
}

impl ChatError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChatError::InvalidRequest(_) => ErrorCategory::Client,
            ChatError::MissingSetting(_) => ErrorCategory::Configuration,
            ChatError::Credential(_) | ChatError::Runtime(_) => ErrorCategory::Service,
        }
    }
}
