//! Infrastructure layer for foundry-relay
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, plus configuration loading and the
//! current-time tool.

pub mod config;
pub mod credential;
pub mod foundry;
pub mod tools;

// Re-export commonly used types
pub use config::{ConfigError, ConfigLoader, EnvConfig, ServerOptions};
pub use credential::{
    AzureCliCredential, ChainedCredential, ClientSecretCredential, ManagedIdentityCredential,
    credential_provider,
};
pub use foundry::{FoundryAgentClient, FoundryAgentRuntime, FoundryOptions};
pub use tools::current_time;
