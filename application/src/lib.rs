//! Application layer for foundry-relay
//!
//! This crate contains use cases, port definitions, and application settings.
//! It depends only on the domain layer.

pub mod config;
pub mod error;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{CredentialStrategy, RelaySettings, RoleSettings, SettingKey};
pub use error::{ChatError, ErrorCategory};
pub use ports::{
    agent_runtime::{AgentClient, AgentRuntime, RuntimeError, TurnOutcome},
    credential::{AGENT_SERVICE_SCOPE, AccessToken, CredentialError, CredentialProvider},
};
pub use use_cases::{
    ChatUseCase,
    resolve_agent::{AgentResolver, AgentSource},
    run_chat::RunChatUseCase,
    run_pipeline::RunPipelineUseCase,
    types::{ChatInput, ChatOutput},
};
