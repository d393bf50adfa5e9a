//! Azure CLI credential
//!
//! Runs `az account get-access-token` and parses its JSON output. Requires a
//! prior `az login` on the host.

use super::{epoch_seconds, scope_to_resource};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use relay_application::{AccessToken, CredentialError, CredentialProvider};
use serde::Deserialize;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

const DEFAULT_PROGRAM: &str = "az";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliTokenOutput {
    access_token: String,
    /// Local time, e.g. `2025-01-31 10:20:30.000000`.
    #[serde(default)]
    expires_on: Option<String>,
    /// Unix seconds; only emitted by newer CLI versions.
    #[serde(default, rename = "expires_on")]
    expires_on_epoch: Option<serde_json::Value>,
}

pub struct AzureCliCredential {
    program: String,
    timeout: Duration,
}

impl Default for AzureCliCredential {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl AzureCliCredential {
    /// Use a different executable (e.g. `az.cmd`).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl CredentialProvider for AzureCliCredential {
    fn name(&self) -> &'static str {
        "azure_cli"
    }

    async fn acquire(&self, scope: &str) -> Result<AccessToken, CredentialError> {
        let resource = scope_to_resource(scope);
        debug!("Requesting token from Azure CLI for {}", resource);

        let mut command = Command::new(&self.program);
        command
            .args(["account", "get-access-token", "--output", "json", "--resource"])
            .arg(resource)
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(CredentialError::Unavailable(format!(
                    "'{}' was not found on PATH",
                    self.program
                )));
            }
            Ok(Err(e)) => return Err(CredentialError::CommandFailed(e.to_string())),
            Err(_) => {
                return Err(CredentialError::CommandFailed(format!(
                    "'{}' did not answer within {}s",
                    self.program,
                    self.timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr.trim();
            if message.contains("az login") {
                return Err(CredentialError::Unavailable(message.to_string()));
            }
            return Err(CredentialError::CommandFailed(message.to_string()));
        }

        parse_cli_token(&output.stdout)
    }
}

/// Parse the JSON printed by `az account get-access-token`.
pub(crate) fn parse_cli_token(stdout: &[u8]) -> Result<AccessToken, CredentialError> {
    let parsed: CliTokenOutput = serde_json::from_slice(stdout)
        .map_err(|e| CredentialError::InvalidResponse(e.to_string()))?;
    if parsed.access_token.is_empty() {
        return Err(CredentialError::InvalidResponse(
            "accessToken is empty".to_string(),
        ));
    }

    let expires_on = parsed
        .expires_on_epoch
        .as_ref()
        .and_then(epoch_seconds)
        .or_else(|| parsed.expires_on.as_deref().and_then(parse_local_time));

    Ok(AccessToken::new(parsed.access_token, expires_on))
}

fn parse_local_time(value: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_token_prefers_epoch() {
        let stdout = br#"{
            "accessToken": "eyJ0",
            "expiresOn": "2030-01-01 00:00:00.000000",
            "expires_on": 1700000000,
            "tokenType": "Bearer"
        }"#;
        let token = parse_cli_token(stdout).unwrap();
        assert_eq!(token.secret(), "eyJ0");
        assert_eq!(token.expires_on().unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_parse_cli_token_local_expiry() {
        let stdout = br#"{"accessToken": "eyJ0", "expiresOn": "2030-01-01 00:00:00.000000"}"#;
        let token = parse_cli_token(stdout).unwrap();
        assert!(token.expires_on().is_some());
    }

    #[test]
    fn test_parse_cli_token_rejects_garbage() {
        assert!(matches!(
            parse_cli_token(b"ERROR: Please run 'az login'"),
            Err(CredentialError::InvalidResponse(_))
        ));
        assert!(parse_cli_token(br#"{"accessToken": ""}"#).is_err());
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let credential = AzureCliCredential::default().with_program("az-definitely-not-installed");
        let err = credential
            .acquire("https://ai.azure.com/.default")
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::Unavailable(_)));
    }
}
