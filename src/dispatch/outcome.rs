use serde_json::Value;

use crate::api::ApiResponse;
use crate::dispatch::{ActionKind, Location, Notification, Severity};
use crate::error::ClientError;

const POLL_COMPLETE: &str = "Poll complete";
const BRIEFING_GENERATED: &str = "Briefing generated";
const NO_BRIEFING_ITEMS: &str = "No items for briefing";
const RECLASSIFIED: &str = "Reclassified";

/// Interpreted result of one action's response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success {
        message: String,
        redirect: Option<Location>,
    },
    /// Well-formed answer without the expected data. Not an error.
    Empty { message: String },
    /// Transport failure, unreadable body, or a rejected status.
    Failure,
}

impl Outcome {
    pub fn notification(&self, kind: ActionKind) -> Notification {
        match self {
            Self::Success { message, .. } | Self::Empty { message } => Notification {
                text: message.clone(),
                severity: Severity::Info,
            },
            Self::Failure => Notification {
                text: kind.failure_message().to_string(),
                severity: Severity::Error,
            },
        }
    }

    pub fn redirect(&self) -> Option<&Location> {
        match self {
            Self::Success { redirect, .. } => redirect.as_ref(),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

// The body must be JSON; `null` counts as unreadable since nothing can be
// looked up in it.
fn json_body(response: Result<ApiResponse, ClientError>) -> Option<Value> {
    let response = response.ok()?;
    match serde_json::from_str::<Value>(&response.body) {
        Ok(Value::Null) | Err(_) => None,
        Ok(value) => Some(value),
    }
}

fn message_field(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

// The server sends an integer id; a non-empty string is accepted too.
fn briefing_id_field(body: &Value) -> Option<String> {
    match body.get("briefing_id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        // Zero is not a briefing id.
        Value::Number(id) if id.as_f64() != Some(0.0) => Some(id.to_string()),
        _ => None,
    }
}

/// Status is not inspected; any JSON body counts as an answer.
pub fn interpret_poll(response: Result<ApiResponse, ClientError>) -> Outcome {
    match json_body(response) {
        Some(body) => Outcome::Success {
            message: message_field(&body).unwrap_or_else(|| POLL_COMPLETE.to_string()),
            redirect: None,
        },
        None => Outcome::Failure,
    }
}

pub fn interpret_briefing(response: Result<ApiResponse, ClientError>) -> Outcome {
    let Some(body) = json_body(response) else {
        return Outcome::Failure;
    };
    match briefing_id_field(&body) {
        Some(id) => Outcome::Success {
            message: BRIEFING_GENERATED.to_string(),
            redirect: Some(Location::BriefingDetail(id)),
        },
        None => Outcome::Empty {
            message: message_field(&body).unwrap_or_else(|| NO_BRIEFING_ITEMS.to_string()),
        },
    }
}

/// Only the status matters; the body is ignored.
pub fn interpret_reclassify(response: Result<ApiResponse, ClientError>) -> Outcome {
    match response {
        Ok(response) if response.is_success() => Outcome::Success {
            message: RECLASSIFIED.to_string(),
            redirect: None,
        },
        _ => Outcome::Failure,
    }
}
