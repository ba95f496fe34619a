// crates/role-reactor-service/src/lib.rs
// ============================================================================
// Module: Role Reactor Service Library
// Description: Host-side collaborators for the reactor daemon.
// Purpose: Provide the system clock and the stored-policy rollback engine.
// Dependencies: role-reactor-core, time
// ============================================================================

//! ## Overview
//! `role-reactor-service` supplies the pieces the daemon wires into the
//! reactor loop: a wall-clock [`role_reactor_core::Clock`] and a
//! [`role_reactor_core::RollbackEngine`] that restores policy versions
//! recorded in the role store.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod clock;
pub mod rollback;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use clock::SystemClock;
pub use rollback::StoredPolicyRollback;
