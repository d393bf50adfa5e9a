//! Flat, environment-shaped configuration and its mapping to settings.

use crate::foundry::FoundryOptions;
use relay_application::{CredentialStrategy, RelaySettings, RoleSettings};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;

/// Errors raised while turning raw configuration into typed options
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

/// HTTP server options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOptions {
    pub port: u16,
    /// Directory holding `index.html` and the browser assets.
    pub static_dir: PathBuf,
}

/// One field per recognised environment variable (lowercased).
///
/// Every value is kept as text and interpreted by the accessor methods, so
/// `CREATE_NEW_AGENT=1`, `=yes` and `=true` all behave the same whichever
/// source they came from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvConfig {
    #[serde(default, deserialize_with = "lenient_string")]
    pub azure_ai_project_endpoint: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub azure_ai_model_deployment_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub workshop_agent_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub workshop_agent_instructions: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub create_new_agent: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub workshop_agent_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub workshop_writer_agent_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub workshop_writer_instructions: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub workshop_reviewer_agent_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub workshop_reviewer_instructions: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mcp_function_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing)]
    pub mcp_function_key: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mcp_tool_label: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub use_azure_cli_credential: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub port: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub static_dir: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub foundry_api_version: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub foundry_poll_interval_ms: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub foundry_http_timeout_secs: Option<String>,
}

impl EnvConfig {
    /// Settings read by the chat and pipeline use cases.
    pub fn relay_settings(&self) -> RelaySettings {
        let defaults = RelaySettings::default();
        RelaySettings {
            project_endpoint: non_blank(&self.azure_ai_project_endpoint),
            model_deployment: non_blank(&self.azure_ai_model_deployment_name),
            agent_name: self
                .workshop_agent_name
                .clone()
                .unwrap_or(defaults.agent_name),
            // Present-but-empty instructions mean "create without instructions".
            agent_instructions: self
                .workshop_agent_instructions
                .clone()
                .unwrap_or(defaults.agent_instructions),
            create_new_agent: parse_flag(self.create_new_agent.as_deref(), true),
            default_agent_id: non_blank(&self.workshop_agent_id),
            writer: RoleSettings {
                name: self
                    .workshop_writer_agent_name
                    .clone()
                    .unwrap_or(defaults.writer.name),
                instructions: self
                    .workshop_writer_instructions
                    .clone()
                    .unwrap_or(defaults.writer.instructions),
            },
            reviewer: RoleSettings {
                name: self
                    .workshop_reviewer_agent_name
                    .clone()
                    .unwrap_or(defaults.reviewer.name),
                instructions: self
                    .workshop_reviewer_instructions
                    .clone()
                    .unwrap_or(defaults.reviewer.instructions),
            },
            tool_endpoint: non_blank(&self.mcp_function_url),
            tool_key: non_blank(&self.mcp_function_key),
            tool_label: non_blank(&self.mcp_tool_label).unwrap_or(defaults.tool_label),
            credential: if parse_flag(self.use_azure_cli_credential.as_deref(), true) {
                CredentialStrategy::AzureCli
            } else {
                CredentialStrategy::DefaultChain
            },
        }
    }

    pub fn server_options(&self) -> Result<ServerOptions, ConfigError> {
        let port = parse_number(&self.port, "PORT")?.unwrap_or(DEFAULT_PORT);
        let static_dir = non_blank(&self.static_dir)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("static"));
        Ok(ServerOptions { port, static_dir })
    }

    pub fn foundry_options(&self) -> Result<FoundryOptions, ConfigError> {
        let mut options = FoundryOptions::default();
        if let Some(version) = non_blank(&self.foundry_api_version) {
            options.api_version = version;
        }
        if let Some(ms) = parse_number::<u64>(&self.foundry_poll_interval_ms, "FOUNDRY_POLL_INTERVAL_MS")? {
            options.poll_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(secs) =
            parse_number::<u64>(&self.foundry_http_timeout_secs, "FOUNDRY_HTTP_TIMEOUT_SECS")?
        {
            options.http_timeout = Duration::from_secs(secs);
        }
        Ok(options)
    }
}

/// `1`, `true`, `yes` and `on` (any case) are true; anything else set is false.
pub fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value {
        Some(v) => matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        None => default,
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_number<T: std::str::FromStr>(
    value: &Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match non_blank(value) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(None),
    }
}

// Environment values arrive typed (`PORT=5000` is a number, `CREATE_NEW_AGENT=true`
// a bool); keep them all as text.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
