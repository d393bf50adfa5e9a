//! Run Pipeline use case.
//!
//! Runs the fixed review pipeline for one message:
//!
//! ```text
//! agent_0 researcher ─► agent_1 writer ─► agent_2 reviewer ─►
//! agent_3 writer ─► agent_4 reviewer ─► agent_5 writer ─► reply
//! ```
//!
//! Each stage is a full agent turn over the whole conversation so far; its
//! output is appended before the next stage starts. Stages never overlap and
//! the first failing stage aborts the run. The writer and reviewer agents are
//! ephemeral and removed when the client closes; the researcher follows the
//! normal resolution rules and survives for follow-up requests.

use crate::config::RelaySettings;
use crate::error::ChatError;
use crate::ports::agent_runtime::{AgentClient, AgentRuntime};
use crate::ports::credential::{AGENT_SERVICE_SCOPE, CredentialProvider};
use crate::use_cases::ChatUseCase;
use crate::use_cases::resolve_agent::{AgentResolver, AgentSource, ensure_assigned};
use crate::use_cases::shared::{Connection, finish_scope};
use crate::use_cases::types::{ChatInput, ChatOutput};
use async_trait::async_trait;
use relay_domain::util::preview;
use relay_domain::{
    AgentHandle, AgentSpec, ChatMessage, PipelinePlan, PipelineRun, Retention, StageRecord,
    UserMessage,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Use case for the multi-agent pipeline service.
#[derive(Clone)]
pub struct RunPipelineUseCase {
    settings: Arc<RelaySettings>,
    credentials: Arc<dyn CredentialProvider>,
    runtime: Arc<dyn AgentRuntime>,
}

impl RunPipelineUseCase {
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

    /// Resolve the researcher and create the helper agents.
    async fn assemble(
        &self,
        client: &dyn AgentClient,
        source: AgentSource,
        model: &str,
    ) -> Result<PipelinePlan, ChatError> {
        let researcher = AgentResolver::new(&self.settings)
            .resolve(client, source, model)
            .await?;
        let writer = create_helper(client, &self.settings.writer_spec(model)).await?;
        let reviewer = create_helper(client, &self.settings.reviewer_spec(model)).await?;
        Ok(PipelinePlan::assemble(researcher, writer, reviewer))
    }

    async fn run(
        &self,
        client: &dyn AgentClient,
        source: AgentSource,
        model: &str,
        message: &UserMessage,
    ) -> Result<ChatOutput, ChatError> {
        let plan = self.assemble(client, source, model).await?;
        let researcher = plan.stages()[0].agent.clone();

        let run = execute_plan(client, &plan, message).await?;

        Ok(ChatOutput {
            reply: run.final_reply(),
            agent_id: researcher.id,
            thread: Value::String(String::new()),
        })
    }
}

async fn create_helper(client: &dyn AgentClient, spec: &AgentSpec) -> Result<AgentHandle, ChatError> {
    let agent = client.create_agent(spec, Retention::Ephemeral).await?;
    ensure_assigned(&agent)?;
    debug!("Created helper agent {} ({})", agent.id, agent.name);
    Ok(agent)
}

/// Run every stage of `plan` in order, feeding each the conversation so far.
pub async fn execute_plan(
    client: &dyn AgentClient,
    plan: &PipelinePlan,
    message: &UserMessage,
) -> Result<PipelineRun, ChatError> {
    let mut conversation = vec![ChatMessage::user(message.content())];
    let mut run = PipelineRun::new();

    for stage in plan.stages() {
        debug!(
            "Stage {} ({}, {}) over {} messages",
            stage.id,
            stage.role,
            stage.agent.name,
            conversation.len()
        );
        let output = client.run_stage(&stage.agent, &conversation).await?;
        info!(
            "Stage {} finished: {}",
            stage.id,
            preview(output.reply_text().unwrap_or(""), 60)
        );

        conversation.extend(output.clone().into_messages(&stage.agent.name));
        run.push(StageRecord {
            stage: stage.id.clone(),
            agent_name: stage.agent.name.clone(),
            output,
        });
    }

    Ok(run)
}

#[async_trait]
impl ChatUseCase for RunPipelineUseCase {
    async fn execute(&self, input: ChatInput) -> Result<ChatOutput, ChatError> {
        let message = UserMessage::parse(input.message.as_deref())?;
        let connection = Connection::from_settings(&self.settings)?;
        let source = AgentResolver::new(&self.settings).source(input.agent_id.as_deref())?;

        info!(
            "Pipeline request: {} (agent: {:?})",
            preview(message.content(), 80),
            source
        );

        let token = self.credentials.acquire(AGENT_SERVICE_SCOPE).await?;
        let client = self.runtime.connect(connection.endpoint, &token).await?;

        let outcome = self
            .run(client.as_ref(), source, connection.model, &message)
            .await;

        // Client scope ends before the credential scope.
        let closed = client.close().await;
        drop(client);
        drop(token);

        let output = finish_scope(outcome, closed)?;
        info!("Pipeline reply: {}", preview(&output.reply, 80));
        Ok(output)
    }
}
