// crates/role-reactor-transport/src/sink/callback.rs
// ============================================================================
// Module: Callback Notifier
// Description: Notify sink delegating delivery to a host-provided closure.
// Purpose: Integrate bespoke notification channels without a new sink type.
// Dependencies: role-reactor-core
// ============================================================================

//! ## Overview
//! [`CallbackNotifier`] wraps a closure so embedding hosts can route replies
//! anywhere. The closure's error is returned unchanged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use role_reactor_core::Notification;
use role_reactor_core::NotifyError;
use role_reactor_core::NotifySink;

// ============================================================================
// SECTION: Callback Notifier
// ============================================================================

/// Boxed delivery closure.
type Callback = Box<dyn Fn(&Notification) -> Result<(), NotifyError> + Send + Sync>;

/// Notify sink delegating to a host-provided closure.
pub struct CallbackNotifier {
    /// Delivery closure.
    callback: Callback,
}

impl CallbackNotifier {
    /// Creates a notifier from a delivery closure.
    pub fn new(
        callback: impl Fn(&Notification) -> Result<(), NotifyError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl NotifySink for CallbackNotifier {
    fn publish(&self, notification: &Notification) -> Result<(), NotifyError> {
        (self.callback)(notification)
    }
}
