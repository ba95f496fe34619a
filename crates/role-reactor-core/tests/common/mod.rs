// crates/role-reactor-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Doubles
// Description: In-memory collaborators shared by core integration tests.
// Purpose: Exercise handlers and the reactor loop without real backends.
// Dependencies: role-reactor-core
// ============================================================================

//! ## Overview
//! Test doubles share state through `Arc` so tests keep a handle for
//! assertions after handing a clone to the reactor.

#![allow(
    dead_code,
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Shared test doubles; each test binary uses a subset."
)]

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use role_reactor_core::Clock;
use role_reactor_core::Notification;
use role_reactor_core::NotifyError;
use role_reactor_core::NotifySink;
use role_reactor_core::QueueDelivery;
use role_reactor_core::QueueError;
use role_reactor_core::QueueSource;
use role_reactor_core::ReceiptHandle;
use role_reactor_core::RollbackEngine;
use role_reactor_core::RollbackEngineError;
use role_reactor_core::RollbackReport;
use role_reactor_core::RollbackRequest;
use role_reactor_core::RoleField;
use role_reactor_core::RoleFieldValue;
use role_reactor_core::RoleId;
use role_reactor_core::RoleStore;
use role_reactor_core::RoleStoreError;

// ============================================================================
// SECTION: Memory Role Store
// ============================================================================

/// One stored role row.
type RoleRow = (RoleId, BTreeMap<RoleField, RoleFieldValue>);

/// In-memory role store keyed by `(account, role_name)`.
#[derive(Debug, Clone, Default)]
pub struct MemoryRoleStore {
    /// Shared rows; clones observe the same state.
    rows: Arc<Mutex<BTreeMap<(String, String), RoleRow>>>,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a role with the provided fields.
    pub fn insert_role(
        &self,
        account: &str,
        role_name: &str,
        fields: BTreeMap<RoleField, RoleFieldValue>,
    ) {
        let role_id = RoleId::new(format!("{account}/{role_name}"));
        self.rows
            .lock()
            .unwrap()
            .insert((account.to_string(), role_name.to_string()), (role_id, fields));
    }

    /// Returns a stored field value for assertions.
    pub fn field(
        &self,
        account: &str,
        role_name: &str,
        field: RoleField,
    ) -> Option<RoleFieldValue> {
        self.rows
            .lock()
            .unwrap()
            .get(&(account.to_string(), role_name.to_string()))
            .and_then(|(_, fields)| fields.get(&field).cloned())
    }
}

impl RoleStore for MemoryRoleStore {
    fn find_role_id(
        &self,
        account: &str,
        role_name: &str,
    ) -> Result<Option<RoleId>, RoleStoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&(account.to_string(), role_name.to_string()))
            .map(|(role_id, _)| role_id.clone()))
    }

    fn get_fields(
        &self,
        role_id: &RoleId,
        fields: &[RoleField],
    ) -> Result<BTreeMap<RoleField, RoleFieldValue>, RoleStoreError> {
        let rows = self.rows.lock().unwrap();
        let row = rows
            .values()
            .find(|(id, _)| id == role_id)
            .ok_or_else(|| RoleStoreError::Store(format!("unknown role id {role_id}")))?;
        Ok(fields
            .iter()
            .filter_map(|field| row.1.get(field).map(|value| (*field, value.clone())))
            .collect())
    }

    fn set_fields(
        &self,
        role_id: &RoleId,
        updates: BTreeMap<RoleField, RoleFieldValue>,
    ) -> Result<(), RoleStoreError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .values_mut()
            .find(|(id, _)| id == role_id)
            .ok_or_else(|| RoleStoreError::Store(format!("unknown role id {role_id}")))?;
        for (field, value) in updates {
            row.1.insert(field, value);
        }
        Ok(())
    }
}

/// Role store that faults on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultyRoleStore;

impl RoleStore for FaultyRoleStore {
    fn find_role_id(&self, _: &str, _: &str) -> Result<Option<RoleId>, RoleStoreError> {
        Err(RoleStoreError::Io("store offline".to_string()))
    }

    fn get_fields(
        &self,
        _: &RoleId,
        _: &[RoleField],
    ) -> Result<BTreeMap<RoleField, RoleFieldValue>, RoleStoreError> {
        Err(RoleStoreError::Io("store offline".to_string()))
    }

    fn set_fields(
        &self,
        _: &RoleId,
        _: BTreeMap<RoleField, RoleFieldValue>,
    ) -> Result<(), RoleStoreError> {
        Err(RoleStoreError::Io("store offline".to_string()))
    }
}

// ============================================================================
// SECTION: Scripted Queue
// ============================================================================

/// Queue source serving a scripted sequence of deliveries.
#[derive(Debug, Clone, Default)]
pub struct ScriptedQueue {
    /// Pending deliveries, oldest first.
    pending: Arc<Mutex<VecDeque<QueueDelivery>>>,
    /// Receipt handles deleted so far.
    deleted: Arc<Mutex<Vec<String>>>,
}

impl ScriptedQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a body with a receipt handle.
    pub fn push(&self, body: &str, receipt: &str) {
        self.pending.lock().unwrap().push_back(QueueDelivery {
            body: body.to_string(),
            receipt: Some(ReceiptHandle::new(receipt)),
        });
    }

    /// Enqueues a body without a receipt handle.
    pub fn push_without_receipt(&self, body: &str) {
        self.pending.lock().unwrap().push_back(QueueDelivery {
            body: body.to_string(),
            receipt: None,
        });
    }

    /// Returns the receipt handles deleted so far.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

impl QueueSource for ScriptedQueue {
    fn receive(&self, _max_wait: Duration) -> Result<Option<QueueDelivery>, QueueError> {
        Ok(self.pending.lock().unwrap().pop_front())
    }

    fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        self.deleted.lock().unwrap().push(receipt.as_str().to_string());
        Ok(())
    }
}

// ============================================================================
// SECTION: Recording Sink
// ============================================================================

/// Notify sink that records every published notification.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Published notifications, in order.
    published: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the notifications published so far.
    pub fn published(&self) -> Vec<Notification> {
        self.published.lock().unwrap().clone()
    }
}

impl NotifySink for RecordingSink {
    fn publish(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.published.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

// ============================================================================
// SECTION: Clock and Rollback Doubles
// ============================================================================

/// Clock pinned to a fixed epoch second.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

/// One recorded rollback invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackCall {
    pub account: String,
    pub role_name: String,
    pub selection: String,
    pub commit: bool,
}

/// Rollback engine double returning scripted error lists.
#[derive(Debug, Clone, Default)]
pub struct StubRollback {
    /// Errors the next report will carry.
    errors: Arc<Mutex<Vec<String>>>,
    /// Recorded invocations.
    calls: Arc<Mutex<Vec<RollbackCall>>>,
}

impl StubRollback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the errors returned by subsequent rollbacks.
    pub fn fail_with(&self, errors: &[&str]) {
        *self.errors.lock().unwrap() = errors.iter().map(ToString::to_string).collect();
    }

    /// Returns the recorded invocations.
    pub fn calls(&self) -> Vec<RollbackCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl RollbackEngine for StubRollback {
    fn rollback(
        &self,
        _store: &dyn RoleStore,
        request: &RollbackRequest<'_>,
    ) -> Result<RollbackReport, RollbackEngineError> {
        self.calls.lock().unwrap().push(RollbackCall {
            account: request.account.to_string(),
            role_name: request.role_name.to_string(),
            selection: request.selection.to_string(),
            commit: request.commit,
        });
        Ok(RollbackReport {
            errors: self.errors.lock().unwrap().clone(),
        })
    }
}
