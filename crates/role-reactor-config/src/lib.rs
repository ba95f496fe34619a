// crates/role-reactor-config/src/lib.rs
// ============================================================================
// Module: Role Reactor Config Library
// Description: Canonical config model and validation for the reactor service.
// Purpose: Single source of truth for role-reactor.toml semantics.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! `role-reactor-config` defines the configuration model for the reactor
//! service. Loading is strict and fail-closed: size and path limits are
//! enforced before parsing, and invalid settings reject the whole file.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
