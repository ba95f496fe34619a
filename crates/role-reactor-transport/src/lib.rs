// crates/role-reactor-transport/src/lib.rs
// ============================================================================
// Module: Role Reactor Transport Library
// Description: Reference queue sources and notify sinks for the reactor.
// Purpose: Move command messages and reply notifications across processes.
// Dependencies: role-reactor-core, cap-std, reqwest, tracing
// ============================================================================

//! ## Overview
//! Role Reactor Transport provides ready-made [`role_reactor_core::QueueSource`]
//! and [`role_reactor_core::NotifySink`] implementations.
//! Invariants:
//! - Sources redeliver messages until they are deleted (at-least-once).
//! - Sinks report success only after complete delivery.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod sink;
pub mod source;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use sink::CallbackNotifier;
pub use sink::ChannelNotifier;
pub use sink::LogNotifier;
pub use sink::WebhookNotifier;
pub use source::ChannelQueue;
pub use source::ChannelQueueSender;
pub use source::EnqueueError;
pub use source::SpoolQueue;
