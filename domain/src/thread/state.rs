//! Caller-held thread state.
//!
//! The service stores the conversation history; the caller only keeps a
//! reference to it between HTTP requests. The JSON form is:
//!
//! ```json
//! { "type": "agent_thread_state", "serviceThreadId": "thread_abc123" }
//! ```

use crate::core::error::DomainError;
use serde_json::{Map, Value, json};

const STATE_TYPE: &str = "agent_thread_state";

/// Serializable reference to a service-hosted conversation thread.
///
/// A fresh state has no service thread yet; the agent client binds one on
/// the first turn. The state belongs to exactly one agent, which is not
/// checked here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadState {
    service_thread_id: Option<String>,
}

impl ThreadState {
    /// A thread that has not been sent to the service yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A thread bound to an existing service thread.
    pub fn bound(service_thread_id: impl Into<String>) -> Self {
        Self {
            service_thread_id: Some(service_thread_id.into()),
        }
    }

    pub fn service_thread_id(&self) -> Option<&str> {
        self.service_thread_id.as_deref()
    }

    pub fn is_fresh(&self) -> bool {
        self.service_thread_id.is_none()
    }

    /// Restore a state from the value the caller sent back.
    ///
    /// `null`, `""` and `{}` mean "no thread yet" and yield `None`.
    pub fn restore(value: &Value) -> Result<Option<Self>, DomainError> {
        let object = match value {
            Value::Null => return Ok(None),
            Value::String(s) if s.is_empty() => return Ok(None),
            Value::Object(map) if map.is_empty() => return Ok(None),
            Value::Object(map) => map,
            other => {
                return Err(DomainError::InvalidThreadState(format!(
                    "expected an object, got {}",
                    json_kind(other)
                )));
            }
        };

        if let Some(kind) = object.get("type") {
            if kind.as_str() != Some(STATE_TYPE) {
                return Err(DomainError::InvalidThreadState(format!(
                    "unsupported state type {}",
                    kind
                )));
            }
        }

        let service_thread_id = match object.get("serviceThreadId") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) if id.is_empty() => None,
            Some(Value::String(id)) if is_path_safe(id) => Some(id.clone()),
            Some(Value::String(id)) => {
                return Err(DomainError::InvalidThreadState(format!(
                    "serviceThreadId contains characters not allowed in a thread id: {:?}",
                    id
                )));
            }
            Some(other) => {
                return Err(DomainError::InvalidThreadState(format!(
                    "serviceThreadId must be a string, got {}",
                    json_kind(other)
                )));
            }
        };

        Ok(Some(Self { service_thread_id }))
    }

    /// Serialize to the opaque form handed back to the caller.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".to_string(), json!(STATE_TYPE));
        if let Some(id) = &self.service_thread_id {
            map.insert("serviceThreadId".to_string(), json!(id));
        }
        Value::Object(map)
    }
}

// Thread ids end up in REST paths; anything that could change the path is refused.
fn is_path_safe(id: &str) -> bool {
    !id.contains("..")
        && !id
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_whitespace() || c.is_control())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
