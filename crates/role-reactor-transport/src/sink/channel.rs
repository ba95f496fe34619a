// crates/role-reactor-transport/src/sink/channel.rs
// ============================================================================
// Module: Channel Notifier
// Description: Notify sink forwarding replies over a standard mpsc channel.
// Purpose: Let embedding hosts and tests observe published notifications.
// Dependencies: role-reactor-core, std
// ============================================================================

//! ## Overview
//! [`ChannelNotifier`] forwards each notification into an in-process channel.
//! Delivery fails closed when the receiver is gone.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::mpsc;

use role_reactor_core::Notification;
use role_reactor_core::NotifyError;
use role_reactor_core::NotifySink;

// ============================================================================
// SECTION: Channel Notifier
// ============================================================================

/// Notify sink backed by a standard mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    /// Producer side of the channel.
    tx: mpsc::Sender<Notification>,
}

impl ChannelNotifier {
    /// Creates a notifier over an existing sender.
    #[must_use]
    pub const fn new(tx: mpsc::Sender<Notification>) -> Self {
        Self {
            tx,
        }
    }

    /// Creates a connected notifier/receiver pair.
    #[must_use]
    pub fn pair() -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(tx), rx)
    }
}

impl NotifySink for ChannelNotifier {
    fn publish(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.tx
            .send(notification.clone())
            .map_err(|_| NotifyError::Publish("notification receiver dropped".to_string()))
    }
}
