//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("message is required")]
    EmptyMessage,

    #[error("Invalid thread state: {0}")]
    InvalidThreadState(String),
}

impl DomainError {
    /// Check if this error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DomainError::EmptyMessage | DomainError::InvalidThreadState(_)
        )
    }
}
