// crates/role-reactor-transport/src/sink/webhook.rs
// ============================================================================
// Module: Webhook Notifier
// Description: Notify sink posting reply payloads to an HTTP endpoint.
// Purpose: Deliver notifications to chat-ops webhook integrations.
// Dependencies: role-reactor-core, reqwest
// ============================================================================

//! ## Overview
//! [`WebhookNotifier`] POSTs each notification as JSON to a configured
//! endpoint using a blocking client with a bounded request timeout.
//! Invariants:
//! - Non-success HTTP statuses are delivery failures.
//! - Requests never block longer than the configured timeout.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::blocking::Client;
use role_reactor_core::Notification;
use role_reactor_core::NotifyError;
use role_reactor_core::NotifySink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default request timeout for webhook deliveries.
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// SECTION: Webhook Notifier
// ============================================================================

/// Notify sink posting JSON payloads to an HTTP endpoint.
pub struct WebhookNotifier {
    /// Blocking HTTP client with a bounded timeout.
    client: Client,
    /// Webhook endpoint URL.
    url: String,
}

impl WebhookNotifier {
    /// Creates a notifier for `url` with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Publish`] when the HTTP client cannot be
    /// constructed.
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        Self::with_timeout(url, DEFAULT_WEBHOOK_TIMEOUT)
    }

    /// Creates a notifier for `url` with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Publish`] when the HTTP client cannot be
    /// constructed.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| NotifyError::Publish(format!("webhook client build failed: {err}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl NotifySink for WebhookNotifier {
    fn publish(&self, notification: &Notification) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(notification)
            .send()
            .map_err(|err| NotifyError::Publish(format!("webhook post failed: {err}")))?;
        response
            .error_for_status()
            .map_err(|err| NotifyError::Publish(format!("webhook rejected reply: {err}")))?;
        Ok(())
    }
}
