// crates/role-reactor-transport/src/sink/log.rs
// ============================================================================
// Module: Log Notifier
// Description: Notify sink that emits replies into the tracing stream.
// Purpose: Provide a zero-dependency reply channel for local deployments.
// Dependencies: role-reactor-core, tracing
// ============================================================================

//! ## Overview
//! [`LogNotifier`] publishes notifications as structured log events. Useful
//! for development and as a fallback when no webhook is configured.

// ============================================================================
// SECTION: Imports
// ============================================================================

use role_reactor_core::Notification;
use role_reactor_core::NotifyError;
use role_reactor_core::NotifySink;
use tracing::info;

// ============================================================================
// SECTION: Log Notifier
// ============================================================================

/// Notify sink writing to the tracing stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl LogNotifier {
    /// Creates a new log notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl NotifySink for LogNotifier {
    fn publish(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(
            channel = %notification.channel,
            title = %notification.title,
            message = %notification.message,
            "notification published"
        );
        Ok(())
    }
}
