//! current_time: the current wall-clock time in an IANA timezone.
//!
//! Every outcome, including bad input, is a JSON payload. Errors look like
//! `{"error": "<code>", "message": "..."}`.

use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde_json::{Value, json};
use tracing::{info, warn};

/// Tool name constants
pub const CURRENT_TIME: &str = "current_time";
pub const DESCRIPTION: &str = "Return the current time for the requested IANA timezone.";
pub const TIMEZONE_DESCRIPTION: &str =
    "IANA timezone identifier such as 'Asia/Tokyo' or 'America/New_York'.";

const NOTE: &str = "Time generated with chrono-tz based on the bundled IANA tzdata.";

/// JSON schema of the tool arguments.
pub fn input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "timezone": {
                "type": "string",
                "description": TIMEZONE_DESCRIPTION,
            }
        },
        "required": ["timezone"],
    })
}

/// Why a call could not produce a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeToolError {
    MissingContext,
    InvalidContext,
    MissingTimezone,
    UnknownTimezone(String),
}

impl TimeToolError {
    pub fn code(&self) -> &'static str {
        match self {
            TimeToolError::MissingContext => "missing_context",
            TimeToolError::InvalidContext => "invalid_context",
            TimeToolError::MissingTimezone => "missing_timezone",
            TimeToolError::UnknownTimezone(_) => "unknown_timezone",
        }
    }

    pub fn message(&self) -> String {
        match self {
            TimeToolError::MissingContext => "Trigger context payload was empty.".to_string(),
            TimeToolError::InvalidContext => "Trigger context must be valid JSON.".to_string(),
            TimeToolError::MissingTimezone => {
                "Provide the 'timezone' argument using an IANA timezone like 'Asia/Tokyo'."
                    .to_string()
            }
            TimeToolError::UnknownTimezone(name) => format!(
                "Timezone '{}' is not recognized. Use a valid IANA timezone identifier.",
                name
            ),
        }
    }

    fn to_payload(&self) -> Value {
        json!({"error": self.code(), "message": self.message()})
    }
}

/// Run the tool against a trigger context such as
/// `{"arguments": {"timezone": "Asia/Tokyo"}}`.
pub fn handle_context(context: &str) -> String {
    handle_context_at(context, Utc::now())
}

/// Same as [`handle_context`] with an explicit clock.
pub fn handle_context_at(context: &str, now: DateTime<Utc>) -> String {
    let payload = match current_time(context, now) {
        Ok(payload) => payload,
        Err(e) => e.to_payload(),
    };
    payload.to_string()
}

fn current_time(context: &str, now: DateTime<Utc>) -> Result<Value, TimeToolError> {
    if context.trim().is_empty() {
        return Err(TimeToolError::MissingContext);
    }

    let payload: Value = serde_json::from_str(context).map_err(|_| {
        warn!("Received malformed tool context: {}", context);
        TimeToolError::InvalidContext
    })?;

    let timezone = payload
        .get("arguments")
        .and_then(|args| args.get("timezone"))
        .and_then(Value::as_str)
        .filter(|tz| !tz.is_empty())
        .ok_or(TimeToolError::MissingTimezone)?;

    let tz: Tz = timezone.parse().map_err(|_| {
        info!("Timezone not found: {}", timezone);
        TimeToolError::UnknownTimezone(timezone.to_string())
    })?;

    let local = now.with_timezone(&tz);
    Ok(json!({
        "timezone": timezone,
        "currentTimeIso": local.to_rfc3339_opts(SecondsFormat::Micros, false),
        "currentTimeDisplay": local.format("%Y-%m-%d %H:%M:%S %Z").to_string(),
        "note": NOTE,
    }))
}
