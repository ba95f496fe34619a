// crates/role-reactor-core/src/lib.rs
// ============================================================================
// Module: Role Reactor Core Library
// Description: Message model, interfaces, command handlers, and reactor loop.
// Purpose: Turn queued operator commands into role-store operations and replies.
// Dependencies: serde, serde_json, thiserror, time, tracing
// ============================================================================

//! ## Overview
//! Role Reactor Core defines the command [`CommandMessage`] model, the
//! backend-agnostic interfaces ([`RoleStore`], [`QueueSource`], [`NotifySink`],
//! [`RollbackEngine`], [`Clock`]), the per-command business rules, and the
//! [`Reactor`] loop that wires them together.
//! Invariants:
//! - Messages are validated once, at decode time; invalid messages never
//!   reach a handler.
//! - Business-rule failures are dispatch outcomes, never faults.
//! - The core never reads wall-clock time directly; hosts supply a [`Clock`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::message::CommandMessage;
pub use crate::core::message::MessageError;
pub use crate::core::message::decode_body;
pub use crate::core::outcome::DispatchOutcome;
pub use crate::core::outcome::Notification;
pub use crate::core::outcome::ResponseAddress;
pub use crate::core::outcome::ResponseTitle;
pub use crate::core::role::OptOutRecord;
pub use crate::core::role::PolicyVersion;
pub use crate::core::role::RoleField;
pub use crate::core::role::RoleFieldValue;
pub use crate::core::role::RoleId;
pub use crate::core::time::expiry_epoch;
pub use crate::core::time::format_expiry_date;
pub use interfaces::Clock;
pub use interfaces::NotifyError;
pub use interfaces::NotifySink;
pub use interfaces::QueueDelivery;
pub use interfaces::QueueError;
pub use interfaces::QueueSource;
pub use interfaces::ReceiptHandle;
pub use interfaces::RollbackEngine;
pub use interfaces::RollbackEngineError;
pub use interfaces::RollbackReport;
pub use interfaces::RollbackRequest;
pub use interfaces::RoleStore;
pub use interfaces::RoleStoreError;
pub use runtime::command::CommandKind;
pub use runtime::handlers::DispatchConfig;
pub use runtime::handlers::HandlerDeps;
pub use runtime::handlers::HandlerFault;
pub use runtime::handlers::dispatch;
pub use runtime::reactor::Cycle;
pub use runtime::reactor::Reactor;
pub use runtime::reactor::ReactorBuildError;
pub use runtime::reactor::ReactorBuilder;
pub use runtime::reactor::ReactorError;
