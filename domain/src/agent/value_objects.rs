//! Agent value objects.
//!
//! # Identifiers
//! - [`AgentId`] - Opaque handle issued by the agent service
//!
//! # Creation
//! - [`AgentSpec`] - Name, instructions and model for a new agent
//! - [`Retention`] - Whether a created agent outlives the client scope
//!
//! # Handles
//! - [`AgentHandle`] - An agent usable within one client scope

use serde::{Deserialize, Serialize};

/// Opaque identifier issued by the agent service when an agent is created.
///
/// Callers round-trip it between requests to keep talking to the same agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Creates an AgentId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Accepts an id only when it carries something besides whitespace.
    pub fn try_new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Into<String>> From<T> for AgentId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happens to a created agent when its client scope closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retention {
    /// Keep the agent so follow-up requests can address it by id.
    Retain,
    /// Delete the agent when the client scope closes.
    Ephemeral,
}

/// Everything the agent service needs to create an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub instructions: Option<String>,
    pub model: String,
}

impl AgentSpec {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: None,
            model: model.into(),
        }
    }

    /// Empty instruction text is treated as "no instructions".
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        let instructions = instructions.into();
        self.instructions = if instructions.is_empty() {
            None
        } else {
            Some(instructions)
        };
        self
    }
}

/// An agent that can be run within the client scope that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentHandle {
    pub id: AgentId,
    pub name: String,
    pub retention: Retention,
    /// True when this scope created the agent (as opposed to attaching to it).
    pub created: bool,
}

impl AgentHandle {
    /// Handle for an agent that already exists in the service.
    pub fn attached(id: AgentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            retention: Retention::Retain,
            created: false,
        }
    }

    /// Handle for an agent this scope just created.
    pub fn created(id: AgentId, name: impl Into<String>, retention: Retention) -> Self {
        Self {
            id,
            name: name.into(),
            retention,
            created: true,
        }
    }

    /// Whether closing the client scope should delete this agent.
    pub fn is_disposable(&self) -> bool {
        self.created && self.retention == Retention::Ephemeral
    }
}
