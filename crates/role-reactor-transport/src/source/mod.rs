// crates/role-reactor-transport/src/source/mod.rs
// ============================================================================
// Module: Queue Sources
// Description: Reference implementations of the inbound command queue.
// Purpose: Deliver raw message bodies to the reactor loop, at least once.
// Dependencies: role-reactor-core, thiserror
// ============================================================================

//! ## Overview
//! Sources implement [`role_reactor_core::QueueSource`]: a bounded long-poll
//! receive plus receipt-based deletion. Both implementations redeliver
//! undeleted messages, so the reactor's at-least-once guarantee holds across
//! faults.
//! Invariants:
//! - Receipt handles are transport-scoped and validated before use.
//! - Deletion of an unknown receipt fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Enqueue Errors
// ============================================================================

/// Errors raised by producer-side enqueue operations.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum EnqueueError {
    /// Queue can no longer accept messages.
    #[error("queue enqueue failed: {0}")]
    Closed(String),
    /// Spool directory write failed.
    #[error("spool write failed: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: Implementations
// ============================================================================

pub mod channel;
pub mod spool;

pub use channel::ChannelQueue;
pub use channel::ChannelQueueSender;
pub use spool::SpoolQueue;
