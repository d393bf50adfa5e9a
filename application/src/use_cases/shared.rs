//! Helpers shared by the chat use cases.

use crate::config::{RelaySettings, SettingKey};
use crate::error::ChatError;
use crate::ports::agent_runtime::RuntimeError;
use tracing::warn;

/// Project endpoint and model deployment, both required before any remote call.
pub(crate) struct Connection<'a> {
    pub endpoint: &'a str,
    pub model: &'a str,
}

impl<'a> Connection<'a> {
    pub fn from_settings(settings: &'a RelaySettings) -> Result<Self, ChatError> {
        Ok(Self {
            endpoint: settings.require(SettingKey::ProjectEndpoint)?,
            model: settings.require(SettingKey::ModelDeployment)?,
        })
    }
}

/// Combine the work result with the outcome of closing the client.
///
/// A failed close never hides the work error. After successful work it is
/// only logged: the reply and retained agent are already valid, and the
/// leftovers are ephemeral agents the service can garbage-collect.
pub(crate) fn finish_scope<T>(
    outcome: Result<T, ChatError>,
    closed: Result<(), RuntimeError>,
) -> Result<T, ChatError> {
    if let Err(e) = closed {
        warn!("Failed to close agent client cleanly: {}", e);
    }
    outcome
}
