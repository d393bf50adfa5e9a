//! Run Chat use case.
//!
//! One conversational turn with a single agent:
//!
//! 1. Validate the message and thread state (no remote calls yet)
//! 2. Acquire a credential and connect a client
//! 3. Resolve the agent (reuse or create-and-retain)
//! 4. Run the turn on the restored or fresh thread, with the remote tool if configured
//! 5. Close the client, drop the credential
//! 6. Return reply, agent id and the serialized thread

use crate::config::RelaySettings;
use crate::error::ChatError;
use crate::ports::agent_runtime::{AgentClient, AgentRuntime, RuntimeError};
use crate::ports::credential::{AGENT_SERVICE_SCOPE, CredentialProvider};
use crate::use_cases::ChatUseCase;
use crate::use_cases::resolve_agent::{AgentResolver, AgentSource};
use crate::use_cases::shared::{Connection, finish_scope};
use crate::use_cases::types::{ChatInput, ChatOutput};
use async_trait::async_trait;
use relay_domain::util::preview;
use relay_domain::{ThreadState, ToolDescriptor, UserMessage};
use std::sync::Arc;
use tracing::{debug, info};

/// Use case for the single-agent chat service.
#[derive(Clone)]
pub struct RunChatUseCase {
    settings: Arc<RelaySettings>,
    credentials: Arc<dyn CredentialProvider>,
    runtime: Arc<dyn AgentRuntime>,
}

impl RunChatUseCase {
    pub fn new(
        settings: Arc<RelaySettings>,
        credentials: Arc<dyn CredentialProvider>,
        runtime: Arc<dyn AgentRuntime>,
    ) -> Self {
        Self {
            settings,
            credentials,
            runtime,
        }
    }

    async fn turn(
        &self,
        client: &dyn AgentClient,
        source: AgentSource,
        model: &str,
        message: &UserMessage,
        thread: ThreadState,
        tool: Option<&ToolDescriptor>,
    ) -> Result<ChatOutput, ChatError> {
        let resolver = AgentResolver::new(&self.settings);
        let agent = resolver.resolve(client, source, model).await?;

        debug!(
            "Running turn on agent {} (thread: {})",
            agent.id,
            thread.service_thread_id().unwrap_or("new")
        );
        let outcome = client
            .run_turn(&agent, thread, message.content(), tool)
            .await?;

        if agent.id.is_empty() {
            return Err(RuntimeError::MissingAgentId.into());
        }

        Ok(ChatOutput {
            reply: outcome.reply,
            agent_id: agent.id,
            thread: outcome.thread.to_value(),
        })
    }
}

#[async_trait]
impl ChatUseCase for RunChatUseCase {
    async fn execute(&self, input: ChatInput) -> Result<ChatOutput, ChatError> {
        let message = UserMessage::parse(input.message.as_deref())?;
        let thread = match &input.thread {
            Some(value) => ThreadState::restore(value)?,
            None => None,
        };
        let connection = Connection::from_settings(&self.settings)?;
        let source = AgentResolver::new(&self.settings).source(input.agent_id.as_deref())?;
        let tool = self.settings.tool_descriptor();

        info!(
            "Chat request: {} (agent: {:?}, tool: {})",
            preview(message.content(), 80),
            source,
            tool.as_ref().map(|t| t.name.as_str()).unwrap_or("none")
        );

        let token = self.credentials.acquire(AGENT_SERVICE_SCOPE).await?;
        let client = self.runtime.connect(connection.endpoint, &token).await?;

        let outcome = self
            .turn(
                client.as_ref(),
                source,
                connection.model,
                &message,
                thread.unwrap_or_default(),
                tool.as_ref(),
            )
            .await;

        // Client scope ends before the credential scope.
        let closed = client.close().await;
        drop(client);
        drop(token);

        let output = finish_scope(outcome, closed)?;
        info!("Chat reply from agent {}: {}", output.agent_id, preview(&output.reply, 80));
        Ok(output)
    }
}
