// crates/role-reactor-core/src/core/mod.rs
// ============================================================================
// Module: Role Reactor Core Types
// Description: Message, role record, outcome, and time models.
// Purpose: Provide the canonical data types shared by handlers and the loop.
// Dependencies: serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! Core types are plain data carriers. Validation happens at construction
//! boundaries; constructed values are immutable by convention.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod message;
pub mod outcome;
pub mod role;
pub mod time;
