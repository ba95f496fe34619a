// crates/role-reactor-core/src/core/message.rs
// ============================================================================
// Module: Command Message Model
// Description: Decoding and one-shot schema validation of inbound commands.
// Purpose: Produce immutable command messages or enumerated validation failures.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Inbound queue bodies are JSON objects. [`decode_body`] parses the raw
//! text and [`CommandMessage::from_object`] validates it against the fixed
//! schema: `command`, `account`, `role_name`, and `respond_channel` are
//! required non-null strings; `respond_user`, `requestor`, `reason`, and
//! `selection` are optional strings. Unknown keys are ignored.
//! Invariants:
//! - Validation happens exactly once, at decode time.
//! - A message failing schema validation never reaches a handler.
//! - Constructed messages are immutable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Message Errors
// ============================================================================

/// Errors produced while decoding or validating a command message.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `Invalid` enumerates every schema problem found, not just the first.
#[derive(Debug, Error)]
pub enum MessageError {
    /// Body text could not be parsed as JSON.
    #[error("body is not valid JSON: {0}")]
    Parse(String),
    /// Body parsed but is not a JSON object.
    #[error("body is not a JSON object")]
    NotObject,
    /// Body is an object but violates the message schema.
    #[error("{}", problems.join("; "))]
    Invalid {
        /// Every schema problem found, in field order.
        problems: Vec<String>,
    },
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Decodes a raw queue body into a JSON object.
///
/// # Errors
///
/// Returns [`MessageError::Parse`] for unparsable text and
/// [`MessageError::NotObject`] for non-object JSON.
pub fn decode_body(body: &str) -> Result<Map<String, Value>, MessageError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| MessageError::Parse(err.to_string()))?;
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(MessageError::NotObject),
    }
}

// ============================================================================
// SECTION: Command Message
// ============================================================================

/// Validated inbound command message.
///
/// # Invariants
/// - All fields passed schema validation at construction.
/// - Values are snapshots; the reactor never mutates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMessage {
    /// Handler name to invoke.
    pub command: String,
    /// Account owning the target role.
    pub account: String,
    /// Target role name within the account.
    pub role_name: String,
    /// Destination channel for the reply.
    pub respond_channel: String,
    /// Optional user mentioned in the reply text.
    pub respond_user: Option<String>,
    /// Optional requestor; required by opt-out.
    pub requestor: Option<String>,
    /// Optional reason; required by opt-out.
    pub reason: Option<String>,
    /// Optional policy version selection; required by rollback.
    pub selection: Option<String>,
}

impl CommandMessage {
    /// Validates a decoded object against the message schema.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Invalid`] enumerating every missing required
    /// field and every non-string field value.
    pub fn from_object(object: &Map<String, Value>) -> Result<Self, MessageError> {
        let mut problems = Vec::new();
        let command = required_string(object, "command", &mut problems);
        let account = required_string(object, "account", &mut problems);
        let role_name = required_string(object, "role_name", &mut problems);
        let respond_channel = required_string(object, "respond_channel", &mut problems);
        let respond_user = optional_string(object, "respond_user", &mut problems);
        let requestor = optional_string(object, "requestor", &mut problems);
        let reason = optional_string(object, "reason", &mut problems);
        let selection = optional_string(object, "selection", &mut problems);

        match (command, account, role_name, respond_channel) {
            (Some(command), Some(account), Some(role_name), Some(respond_channel))
                if problems.is_empty() =>
            {
                Ok(Self {
                    command,
                    account,
                    role_name,
                    respond_channel,
                    respond_user,
                    requestor,
                    reason,
                    selection,
                })
            }
            _ => Err(MessageError::Invalid {
                problems,
            }),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts a required string field, recording problems for missing or
/// non-string values.
fn required_string(
    object: &Map<String, Value>,
    name: &str,
    problems: &mut Vec<String>,
) -> Option<String> {
    match object.get(name) {
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            problems.push(format!("field '{name}' must be a string"));
            None
        }
        None => {
            problems.push(format!("missing required field '{name}'"));
            None
        }
    }
}

/// Extracts an optional string field, recording a problem for non-string
/// values.
fn optional_string(
    object: &Map<String, Value>,
    name: &str,
    problems: &mut Vec<String>,
) -> Option<String> {
    match object.get(name) {
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            problems.push(format!("field '{name}' must be a string"));
            None
        }
        None => None,
    }
}
