//! Relay settings: what the use cases need to talk to the agent service.
//!
//! Required values (endpoint, model deployment) are kept optional here and
//! checked per request, so a misconfigured deployment still starts and
//! answers every chat call with a 500 naming the missing variable.

use crate::error::ChatError;
use relay_domain::{AgentSpec, ToolDescriptor};
use serde::{Deserialize, Serialize};

pub const DEFAULT_AGENT_NAME: &str = "WorkshopAssistant";
pub const DEFAULT_AGENT_INSTRUCTIONS: &str =
    "You are a helpful Japanese-speaking AI assistant for an Azure AI Foundry workshop.";
pub const DEFAULT_WRITER_NAME: &str = "WorkshopWriter";
pub const DEFAULT_REVIEWER_NAME: &str = "WorkshopReviewer";
pub const DEFAULT_TOOL_LABEL: &str = "current_time_mcp";

pub const DEFAULT_WRITER_INSTRUCTIONS: &str = concat!(
    "最新の調査結果とレビューコメントを統合して、日本語で非専門家にも分かりやすいレポートを作成してください。",
    "構成は必ず『概要』『最新動向』『課題』『推奨事項』の見出しを含め、最新情報の出典や根拠を簡潔に明記します。",
    "レビューの指摘がある場合は必ず内容に反映し、明瞭で論理的な文章に整えてください。",
);

pub const DEFAULT_REVIEWER_INSTRUCTIONS: &str = concat!(
    "レポート案の論理性、最新性、非専門家への分かりやすさを検証してください。",
    "不足している重要ポイントや曖昧な表現があれば指摘し、改善のための箇条書きフィードバックを簡潔に提示します。",
    "指摘は敬意を持った日本語で記述し、Writerが修正しやすい具体的な提案を含めてください。",
);

/// Settings that may be required at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    ProjectEndpoint,
    ModelDeployment,
    DefaultAgentId,
}

impl SettingKey {
    /// Environment variable the operator sets.
    pub fn env_name(&self) -> &'static str {
        match self {
            SettingKey::ProjectEndpoint => "AZURE_AI_PROJECT_ENDPOINT",
            SettingKey::ModelDeployment => "AZURE_AI_MODEL_DEPLOYMENT_NAME",
            SettingKey::DefaultAgentId => "WORKSHOP_AGENT_ID",
        }
    }
}

/// How the per-request credential is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStrategy {
    /// Token from the locally signed-in Azure CLI.
    #[default]
    AzureCli,
    /// Environment secret, then managed identity, then Azure CLI.
    DefaultChain,
}

/// Name and instructions of a pipeline helper agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSettings {
    pub name: String,
    pub instructions: String,
}

/// Everything the chat and pipeline use cases read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelaySettings {
    pub project_endpoint: Option<String>,
    pub model_deployment: Option<String>,
    pub agent_name: String,
    pub agent_instructions: String,
    /// Allow creating a new agent when the request carries no id.
    pub create_new_agent: bool,
    /// Fallback agent when creation is disabled.
    pub default_agent_id: Option<String>,
    pub writer: RoleSettings,
    pub reviewer: RoleSettings,
    pub tool_endpoint: Option<String>,
    #[serde(skip_serializing)]
    pub tool_key: Option<String>,
    pub tool_label: String,
    pub credential: CredentialStrategy,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            project_endpoint: None,
            model_deployment: None,
            agent_name: DEFAULT_AGENT_NAME.to_string(),
            agent_instructions: DEFAULT_AGENT_INSTRUCTIONS.to_string(),
            create_new_agent: true,
            default_agent_id: None,
            writer: RoleSettings {
                name: DEFAULT_WRITER_NAME.to_string(),
                instructions: DEFAULT_WRITER_INSTRUCTIONS.to_string(),
            },
            reviewer: RoleSettings {
                name: DEFAULT_REVIEWER_NAME.to_string(),
                instructions: DEFAULT_REVIEWER_INSTRUCTIONS.to_string(),
            },
            tool_endpoint: None,
            tool_key: None,
            tool_label: DEFAULT_TOOL_LABEL.to_string(),
            credential: CredentialStrategy::default(),
        }
    }
}

impl RelaySettings {
    // ==================== Builder Methods ====================

    pub fn with_project_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.project_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_model_deployment(mut self, model: impl Into<String>) -> Self {
        self.model_deployment = Some(model.into());
        self
    }

    pub fn with_create_new_agent(mut self, allow: bool) -> Self {
        self.create_new_agent = allow;
        self
    }

    pub fn with_default_agent_id(mut self, id: impl Into<String>) -> Self {
        self.default_agent_id = Some(id.into());
        self
    }

    pub fn with_tool(mut self, endpoint: impl Into<String>, key: Option<String>) -> Self {
        self.tool_endpoint = Some(endpoint.into());
        self.tool_key = key;
        self
    }

    // ==================== Request-time Accessors ====================

    /// Value of a required setting, or a configuration error naming it.
    pub fn require(&self, key: SettingKey) -> Result<&str, ChatError> {
        let value = match key {
            SettingKey::ProjectEndpoint => self.project_endpoint.as_deref(),
            SettingKey::ModelDeployment => self.model_deployment.as_deref(),
            SettingKey::DefaultAgentId => self.default_agent_id.as_deref(),
        };
        value
            .filter(|v| !v.trim().is_empty())
            .ok_or(ChatError::MissingSetting(key))
    }

    /// Spec for the caller-visible primary agent.
    pub fn primary_spec(&self, model: &str) -> AgentSpec {
        AgentSpec::new(&self.agent_name, model).with_instructions(&self.agent_instructions)
    }

    pub fn writer_spec(&self, model: &str) -> AgentSpec {
        AgentSpec::new(&self.writer.name, model).with_instructions(&self.writer.instructions)
    }

    pub fn reviewer_spec(&self, model: &str) -> AgentSpec {
        AgentSpec::new(&self.reviewer.name, model).with_instructions(&self.reviewer.instructions)
    }

    /// The remote tool to attach to single-agent turns, if one is configured.
    pub fn tool_descriptor(&self) -> Option<ToolDescriptor> {
        let endpoint = self.tool_endpoint.as_deref().filter(|e| !e.is_empty())?;
        Some(ToolDescriptor::new(&self.tool_label, endpoint).with_auth_key(self.tool_key.clone()))
    }
}
