//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod resolve_agent;
pub mod run_chat;
pub mod run_pipeline;
pub(crate) mod shared;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

use crate::error::ChatError;
use async_trait::async_trait;
use types::{ChatInput, ChatOutput};

/// A chat endpoint implementation: one request in, one reply out.
///
/// Both the single-agent and the pipeline service implement this, so the
/// HTTP layer can serve either behind the same route.
#[async_trait]
pub trait ChatUseCase: Send + Sync {
    async fn execute(&self, input: ChatInput) -> Result<ChatOutput, ChatError>;
}
