//! Agent resolution: reuse an existing agent or create a new one.
//!
//! Precedence, highest first:
//!
//! 1. `agentId` from the request
//! 2. `WORKSHOP_AGENT_ID`, when agent creation is disabled
//! 3. a newly created agent, retained after the request
//!
//! Source selection is pure and happens before any remote call, so a
//! missing fallback id fails fast as a configuration error.

use crate::config::{RelaySettings, SettingKey};
use crate::error::ChatError;
use crate::ports::agent_runtime::{AgentClient, RuntimeError};
use relay_domain::{AgentHandle, AgentId, Retention};
use tracing::{debug, info};

/// Where the agent for this request comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentSource {
    /// Id supplied by the caller.
    Incoming(AgentId),
    /// Fallback id from configuration.
    Configured(AgentId),
    /// Create a fresh agent.
    Create,
}

/// Resolves the primary agent of a request.
pub struct AgentResolver<'a> {
    settings: &'a RelaySettings,
}

impl<'a> AgentResolver<'a> {
    pub fn new(settings: &'a RelaySettings) -> Self {
        Self { settings }
    }

    /// Decide where the agent comes from. No remote calls.
    pub fn source(&self, incoming: Option<&str>) -> Result<AgentSource, ChatError> {
        if let Some(id) = incoming.and_then(AgentId::try_new) {
            return Ok(AgentSource::Incoming(id));
        }
        if !self.settings.create_new_agent {
            let id = self.settings.require(SettingKey::DefaultAgentId)?;
            return Ok(AgentSource::Configured(AgentId::new(id)));
        }
        Ok(AgentSource::Create)
    }

    /// Produce a usable handle for the chosen source.
    pub async fn resolve(
        &self,
        client: &dyn AgentClient,
        source: AgentSource,
        model: &str,
    ) -> Result<AgentHandle, ChatError> {
        let name = &self.settings.agent_name;
        match source {
            AgentSource::Incoming(id) | AgentSource::Configured(id) => {
                debug!("Reusing agent {}", id);
                Ok(AgentHandle::attached(id, name))
            }
            AgentSource::Create => {
                let spec = self.settings.primary_spec(model);
                let agent = client.create_agent(&spec, Retention::Retain).await?;
                ensure_assigned(&agent)?;
                info!("Created agent {} ({})", agent.id, agent.name);
                Ok(agent)
            }
        }
    }
}

/// A created agent must come back with an id.
pub(crate) fn ensure_assigned(agent: &AgentHandle) -> Result<(), ChatError> {
    if agent.id.as_str().trim().is_empty() {
        return Err(RuntimeError::MissingAgentId.into());
    }
    Ok(())
}
