//! Remote tool descriptor

use serde::{Deserialize, Serialize};

/// Header name the tool host expects the function key in.
pub const FUNCTION_KEY_HEADER: &str = "x-functions-key";

/// A remote MCP tool server made available to one agent run.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Server label shown to the agent.
    pub name: String,
    /// MCP endpoint URL.
    pub endpoint: String,
    /// Function key sent as [`FUNCTION_KEY_HEADER`], when the host requires one.
    pub auth_key: Option<String>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            auth_key: None,
        }
    }

    /// Empty keys are dropped; public MCP servers need no header.
    pub fn with_auth_key(mut self, key: Option<impl Into<String>>) -> Self {
        self.auth_key = key.map(Into::into).filter(|k: &String| !k.is_empty());
        self
    }

    /// Headers to send to the tool host.
    pub fn headers(&self) -> Vec<(&'static str, &str)> {
        match &self.auth_key {
            Some(key) => vec![(FUNCTION_KEY_HEADER, key.as_str())],
            None => Vec::new(),
        }
    }
}

// Keeps the function key out of logs.
impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("auth_key", &self.auth_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
