// crates/role-reactor-transport/src/sink/mod.rs
// ============================================================================
// Module: Notify Sinks
// Description: Reference implementations of the outbound reply channel.
// Purpose: Deliver reply notifications to operators.
// Dependencies: role-reactor-core
// ============================================================================

//! ## Overview
//! Sinks implement [`role_reactor_core::NotifySink`]. Implementations must
//! fail closed: success is reported only after complete delivery, so the
//! reactor can leave the triggering message unacknowledged on failure.

// ============================================================================
// SECTION: Implementations
// ============================================================================

pub mod callback;
pub mod channel;
pub mod log;
pub mod webhook;

pub use callback::CallbackNotifier;
pub use channel::ChannelNotifier;
pub use log::LogNotifier;
pub use webhook::WebhookNotifier;
