// crates/role-reactor-core/src/interfaces/mod.rs
// ============================================================================
// Module: Role Reactor Interfaces
// Description: Backend-agnostic interfaces for storage, transport, and rollback.
// Purpose: Define the contract surfaces the reactor loop and handlers consume.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the reactor integrates with external systems without
//! embedding backend-specific details. All operations are synchronous and
//! strongly consistent from the core's point of view; implementations must
//! fail closed on missing or invalid data.
//! Invariants:
//! - Interface errors are infrastructure faults; handlers never convert them
//!   into dispatch outcomes.
//! - Business-rule failures travel as values, not through these error types.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use thiserror::Error;

use crate::core::outcome::Notification;
use crate::core::role::RoleField;
use crate::core::role::RoleFieldValue;
use crate::core::role::RoleId;

// ============================================================================
// SECTION: Role Store
// ============================================================================

/// Role store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RoleStoreError {
    /// Store I/O error.
    #[error("role store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("role store corruption: {0}")]
    Corrupt(String),
    /// Store reported an error.
    #[error("role store error: {0}")]
    Store(String),
}

/// Narrow gateway over the external role store.
///
/// Operations are synchronous and strongly consistent; the core adds no
/// caching layer.
pub trait RoleStore: Send + Sync {
    /// Finds a role's identifier by account and role name.
    ///
    /// # Errors
    ///
    /// Returns [`RoleStoreError`] when the store is unavailable.
    fn find_role_id(
        &self,
        account: &str,
        role_name: &str,
    ) -> Result<Option<RoleId>, RoleStoreError>;

    /// Reads the named fields of a role record.
    ///
    /// Absent fields are omitted from the returned map.
    ///
    /// # Errors
    ///
    /// Returns [`RoleStoreError`] when the store is unavailable or the
    /// stored data cannot be decoded.
    fn get_fields(
        &self,
        role_id: &RoleId,
        fields: &[RoleField],
    ) -> Result<BTreeMap<RoleField, RoleFieldValue>, RoleStoreError>;

    /// Writes the named fields of a role record.
    ///
    /// # Errors
    ///
    /// Returns [`RoleStoreError`] when the store is unavailable or rejects
    /// the write.
    fn set_fields(
        &self,
        role_id: &RoleId,
        updates: BTreeMap<RoleField, RoleFieldValue>,
    ) -> Result<(), RoleStoreError>;
}

// ============================================================================
// SECTION: Queue Source
// ============================================================================

/// Opaque receipt handle required to acknowledge a delivery.
///
/// # Invariants
/// - Values are transport-scoped and never parsed by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptHandle(String);

impl ReceiptHandle {
    /// Creates a receipt handle from a transport-provided value.
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Returns the handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One received queue entry.
///
/// # Invariants
/// - A delivery without a receipt handle can be processed but never
///   acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueDelivery {
    /// Raw message body text.
    pub body: String,
    /// Receipt handle for acknowledgment, when the transport supplied one.
    pub receipt: Option<ReceiptHandle>,
}

/// Queue transport errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Receive call failed.
    #[error("queue receive failed: {0}")]
    Receive(String),
    /// Delete call failed.
    #[error("queue delete failed: {0}")]
    Delete(String),
}

/// Inbound command queue consumed by the reactor loop.
pub trait QueueSource: Send + Sync {
    /// Long-polls for at most one message, blocking up to `max_wait`.
    ///
    /// Returns `Ok(None)` when no message arrived within the wait bound.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the transport is unreachable.
    fn receive(&self, max_wait: Duration) -> Result<Option<QueueDelivery>, QueueError>;

    /// Deletes a delivery, signaling the transport need not redeliver it.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] when the transport is unreachable.
    fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError>;
}

// ============================================================================
// SECTION: Notify Sink
// ============================================================================

/// Notification sink errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Publish call failed.
    #[error("notification publish failed: {0}")]
    Publish(String),
}

/// Outbound notification channel for command replies.
pub trait NotifySink: Send + Sync {
    /// Publishes one reply notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when delivery fails; implementations must not
    /// report success on partial delivery.
    fn publish(&self, notification: &Notification) -> Result<(), NotifyError>;
}

// ============================================================================
// SECTION: Rollback Engine
// ============================================================================

/// Rollback request handed to the external engine.
///
/// # Invariants
/// - `selection` names a policy version index; parsing it is the engine's
///   concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollbackRequest<'a> {
    /// Account owning the target role.
    pub account: &'a str,
    /// Target role name within the account.
    pub role_name: &'a str,
    /// Policy version selection supplied by the operator.
    pub selection: &'a str,
    /// Whether the engine should apply the restore or only plan it.
    pub commit: bool,
}

/// Errors reported by a completed rollback run.
///
/// # Invariants
/// - `errors` holds human-readable strings suitable for direct display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackReport {
    /// Engine-reported errors; empty when the rollback succeeded.
    pub errors: Vec<String>,
}

impl RollbackReport {
    /// Returns true when the engine reported no errors.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Rollback engine faults.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RollbackEngineError {
    /// Engine could not run at all.
    #[error("rollback engine failure: {0}")]
    Engine(String),
    /// Engine hit a role store fault.
    #[error(transparent)]
    Store(#[from] RoleStoreError),
}

/// External engine restoring a role's policy to a recorded version.
pub trait RollbackEngine: Send + Sync {
    /// Runs a rollback against the provided store.
    ///
    /// Anticipated problems (bad selection, missing role) are reported inside
    /// the [`RollbackReport`]; only infrastructure faults use the error path.
    ///
    /// # Errors
    ///
    /// Returns [`RollbackEngineError`] when the engine or store is
    /// unavailable.
    fn rollback(
        &self,
        store: &dyn RoleStore,
        request: &RollbackRequest<'_>,
    ) -> Result<RollbackReport, RollbackEngineError>;
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Wall-clock access supplied by the host.
///
/// The core never reads system time directly; opt-out expiries derive from
/// this interface so handlers stay independently testable.
pub trait Clock: Send + Sync {
    /// Returns the current time in epoch seconds.
    fn now_epoch_secs(&self) -> i64;
}
