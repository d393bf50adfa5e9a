//! Input and output of the chat use cases.

use relay_domain::AgentId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A chat request as received from the caller.
///
/// Nothing is validated here; the use cases validate before any remote call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatInput {
    pub message: Option<String>,
    pub agent_id: Option<String>,
    #[serde(default)]
    pub thread: Option<Value>,
}

impl ChatInput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            agent_id: None,
            thread: None,
        }
    }

    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_thread(mut self, thread: Value) -> Self {
        self.thread = Some(thread);
        self
    }
}

/// The reply handed back to the caller.
///
/// `agent_id` and `thread` are what the caller sends with its next request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatOutput {
    pub reply: String,
    pub agent_id: AgentId,
    pub thread: Value,
}
