//! Wire types for the Agents REST API and their mapping to domain messages.

use relay_domain::{ChatMessage, ContentPart, Role, ToolDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==================== Requests ====================

#[derive(Debug, Serialize)]
pub struct CreateAgentRequest<'a> {
    pub model: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<&'a str>,
}

#[derive(Debug, Default, Serialize)]
pub struct CreateThreadRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<MessageInput>,
}

impl CreateThreadRequest {
    /// Seed a thread with a conversation. Messages without prose are skipped;
    /// the service accepts only user and assistant roles.
    pub fn seeded(conversation: &[ChatMessage]) -> Self {
        let messages = conversation
            .iter()
            .filter_map(|m| {
                let content = m.full_text();
                if content.is_empty() {
                    return None;
                }
                let role = match m.role {
                    Role::Assistant => "assistant",
                    _ => "user",
                };
                Some(MessageInput { role, content })
            })
            .collect();
        Self { messages }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageInput {
    pub role: &'static str,
    pub content: String,
}

impl MessageInput {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateRunRequest<'a> {
    pub assistant_id: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<ToolResources>,
}

impl<'a> CreateRunRequest<'a> {
    pub fn new(assistant_id: &'a str) -> Self {
        Self {
            assistant_id,
            tools: Vec::new(),
            tool_resources: None,
        }
    }

    /// Attach a remote MCP server, approved to run without confirmation.
    pub fn with_mcp_tool(mut self, tool: &ToolDescriptor) -> Self {
        self.tools.push(ToolDefinition::Mcp {
            server_label: tool.name.clone(),
            server_url: tool.endpoint.clone(),
        });
        let headers = tool
            .headers()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.tool_resources
            .get_or_insert_with(ToolResources::default)
            .mcp
            .push(McpToolResource {
                server_label: tool.name.clone(),
                headers,
                require_approval: "never",
            });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolDefinition {
    Mcp {
        server_label: String,
        server_url: String,
    },
}

#[derive(Debug, Default, Serialize)]
pub struct ToolResources {
    pub mcp: Vec<McpToolResource>,
}

#[derive(Debug, Serialize)]
pub struct McpToolResource {
    pub server_label: String,
    pub headers: BTreeMap<String, String>,
    pub require_approval: &'static str,
}

// ==================== Responses ====================

#[derive(Debug, Deserialize)]
pub struct AgentObject {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ThreadObject {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunObject {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Where a run stands after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Pending,
    Completed,
    Failed,
}

impl RunObject {
    pub fn phase(&self) -> RunPhase {
        match self.status.as_str() {
            "queued" | "in_progress" | "cancelling" => RunPhase::Pending,
            "completed" => RunPhase::Completed,
            // failed, cancelled, expired, incomplete, requires_action
            _ => RunPhase::Failed,
        }
    }

    pub fn failure_message(&self) -> String {
        match &self.last_error {
            Some(RunError {
                message: Some(message),
                ..
            }) => message.clone(),
            Some(RunError {
                code: Some(code), ..
            }) => code.clone(),
            _ => format!("run ended with status {}", self.status),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessageList {
    #[serde(default)]
    pub data: Vec<MessageObject>,
}

#[derive(Debug, Deserialize)]
pub struct MessageObject {
    pub role: String,
    #[serde(default)]
    pub content: Vec<serde_json::Value>,
}

impl MessageObject {
    pub fn into_chat_message(self) -> ChatMessage {
        let role = match self.role.as_str() {
            "user" => Role::User,
            _ => Role::Assistant,
        };
        ChatMessage {
            role,
            author_name: None,
            text: None,
            contents: self.content.iter().map(content_part).collect(),
        }
    }
}

/// `{"type":"text","text":{"value":"..."}}` becomes a text part; other kinds
/// are kept by name only.
pub fn content_part(value: &serde_json::Value) -> ContentPart {
    let kind = value
        .get("type")
        .and_then(|t| t.as_str())
        .unwrap_or("unknown");
    if kind == "text" {
        let text = value
            .pointer("/text/value")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        ContentPart::text(text)
    } else {
        ContentPart::Other {
            kind: kind.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Human-readable message from an error response body.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error:
                ErrorDetail {
                    message: Some(message),
                    ..
                },
        }) => message,
        Ok(ErrorBody {
            error: ErrorDetail {
                code: Some(code), ..
            },
        }) => code,
        _ => relay_domain::util::preview(body.trim(), 300),
    }
}
