//! Agent runtime port
//!
//! Defines how the use cases talk to the hosted agent service.
//!
//! ```text
//! AgentRuntime::connect ──► AgentClient ──► create_agent / run_turn / run_stage
//!                                      └──► close (deletes ephemeral agents)
//! ```
//!
//! A client is scoped to one request. Agents created with
//! [`Retention::Ephemeral`] are removed by [`AgentClient::close`]; agents
//! created with [`Retention::Retain`] survive it.

use crate::ports::credential::AccessToken;
use async_trait::async_trait;
use relay_domain::{
    AgentHandle, AgentSpec, ChatMessage, Retention, StageOutput, ThreadState, ToolDescriptor,
};
use thiserror::Error;

/// Errors that can occur during agent service operations
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Run {run_id} ended with status '{status}': {message}")]
    RunFailed {
        run_id: String,
        status: String,
        message: String,
    },

    #[error("Azure agent id was not assigned by the service")]
    MissingAgentId,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result of one single-agent turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub reply: String,
    /// The thread after the turn, bound to its service thread.
    pub thread: ThreadState,
}

/// Factory for request-scoped agent clients
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Open a client against the project endpoint with the given token.
    async fn connect(
        &self,
        endpoint: &str,
        token: &AccessToken,
    ) -> Result<Box<dyn AgentClient>, RuntimeError>;
}

/// A request-scoped connection to the agent service
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Create a new agent. The retention decides whether `close` removes it.
    async fn create_agent(
        &self,
        spec: &AgentSpec,
        retention: Retention,
    ) -> Result<AgentHandle, RuntimeError>;

    /// Run one conversational turn on a (possibly fresh) thread.
    ///
    /// The turn is stored in the service thread, so history accumulates
    /// across calls that pass back the returned thread.
    async fn run_turn(
        &self,
        agent: &AgentHandle,
        thread: ThreadState,
        message: &str,
        tool: Option<&ToolDescriptor>,
    ) -> Result<TurnOutcome, RuntimeError>;

    /// Run one pipeline stage: the agent takes a full turn over the
    /// conversation so far and returns what it produced.
    async fn run_stage(
        &self,
        agent: &AgentHandle,
        conversation: &[ChatMessage],
    ) -> Result<StageOutput, RuntimeError>;

    /// Release the scope, deleting agents created as ephemeral.
    async fn close(&self) -> Result<(), RuntimeError>;
}
