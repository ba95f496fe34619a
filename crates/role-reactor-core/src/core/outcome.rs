// crates/role-reactor-core/src/core/outcome.rs
// ============================================================================
// Module: Dispatch Outcomes and Notifications
// Description: Handler results, response addressing, and the reply payload.
// Purpose: Carry human-readable results from handlers to the notify sink.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every dispatch produces a [`DispatchOutcome`]: a success flag paired with
//! human-readable text suitable for direct display. Outcomes are turned into
//! [`Notification`] payloads addressed by a [`ResponseAddress`].
//! Invariants:
//! - Outcome text is never a structured error object.
//! - Exactly one notification is published per addressable message.
//! - Titles are one of two literal values signaling success or failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::message::CommandMessage;

// ============================================================================
// SECTION: Dispatch Outcome
// ============================================================================

/// Result of dispatching one command message.
///
/// # Invariants
/// - `text` is human-readable and complete; callers display it verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Whether the command succeeded.
    pub success: bool,
    /// Human-readable result text.
    pub text: String,
}

impl DispatchOutcome {
    /// Creates a successful outcome.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            success: true,
            text: text.into(),
        }
    }

    /// Creates a failed outcome.
    #[must_use]
    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            success: false,
            text: text.into(),
        }
    }

    /// Returns the title matching this outcome.
    #[must_use]
    pub const fn title(&self) -> ResponseTitle {
        if self.success {
            ResponseTitle::Success
        } else {
            ResponseTitle::Failure
        }
    }
}

// ============================================================================
// SECTION: Response Title
// ============================================================================

/// Reply title signaling success or failure.
///
/// # Invariants
/// - Wire values are stable literals consumed by chat-ops integrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseTitle {
    /// Command completed successfully.
    Success,
    /// Command failed or could not be dispatched.
    Failure,
}

impl ResponseTitle {
    /// Returns the stable wire literal for the title.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Role Reactor Success",
            Self::Failure => "Role Reactor Failure",
        }
    }
}

// ============================================================================
// SECTION: Response Address
// ============================================================================

/// Destination of a reply: channel plus an optional mentioned user.
///
/// # Invariants
/// - `channel` is always present; unaddressable messages never construct
///   an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseAddress {
    /// Destination channel for the reply.
    pub channel: String,
    /// User mentioned in the reply text, when known.
    pub user: Option<String>,
}

impl ResponseAddress {
    /// Builds the address from a validated command message.
    #[must_use]
    pub fn from_message(message: &CommandMessage) -> Self {
        Self {
            channel: message.respond_channel.clone(),
            user: message.respond_user.clone(),
        }
    }

    /// Salvages an address from a decoded-but-unvalidated message object.
    ///
    /// Returns `None` when no string `respond_channel` is recoverable; such
    /// messages cannot be replied to and are dropped by the loop.
    #[must_use]
    pub fn salvage(object: &Map<String, Value>) -> Option<Self> {
        let channel = match object.get("respond_channel") {
            Some(Value::String(channel)) => channel.clone(),
            _ => return None,
        };
        let user = match object.get("respond_user") {
            Some(Value::String(user)) => Some(user.clone()),
            _ => None,
        };
        Some(Self {
            channel,
            user,
        })
    }
}

// ============================================================================
// SECTION: Notification
// ============================================================================

/// Outbound reply payload published to the notification channel.
///
/// # Invariants
/// - `message` mentions the responding user when one was supplied.
/// - `title` corresponds to the outcome that produced the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Reply text, prefixed with `@user` when a user is addressed.
    pub message: String,
    /// Destination channel.
    pub channel: String,
    /// Success or failure title literal.
    pub title: String,
}

impl Notification {
    /// Builds the notification for an outcome addressed to `address`.
    #[must_use]
    pub fn new(address: &ResponseAddress, outcome: &DispatchOutcome) -> Self {
        let message = address.user.as_ref().map_or_else(
            || outcome.text.clone(),
            |user| format!("@{user} {}", outcome.text),
        );
        Self {
            message,
            channel: address.channel.clone(),
            title: outcome.title().as_str().to_string(),
        }
    }
}
