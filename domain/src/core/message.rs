//! User message value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// A chat message sent by the caller (Value Object)
///
/// The content is always trimmed and never empty, so anything holding a
/// `UserMessage` may go straight to the agent service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessage {
    content: String,
}

impl UserMessage {
    /// Validate raw request text.
    ///
    /// Surrounding whitespace is removed; an empty result is rejected.
    pub fn parse(raw: Option<&str>) -> Result<Self, DomainError> {
        let content = raw.unwrap_or_default().trim();
        if content.is_empty() {
            return Err(DomainError::EmptyMessage);
        }
        Ok(Self {
            content: content.to_string(),
        })
    }

    /// Get the message content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for UserMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}
