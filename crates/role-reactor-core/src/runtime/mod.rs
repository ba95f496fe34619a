// crates/role-reactor-core/src/runtime/mod.rs
// ============================================================================
// Module: Role Reactor Runtime
// Description: Command dispatch and the long-running reactor loop.
// Purpose: Resolve commands to handlers and drive the processing cycle.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The runtime owns control flow: [`command`] defines the closed command
//! set, [`handlers`] implements per-command business rules, and [`reactor`]
//! runs the receive/decode/validate/dispatch/respond/acknowledge cycle.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod command;
pub mod handlers;
pub mod reactor;
