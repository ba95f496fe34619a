// crates/role-reactor-store-sqlite/src/lib.rs
// ============================================================================
// Module: Role Reactor SQLite Store Library
// Description: Durable RoleStore implementation backed by SQLite WAL.
// Purpose: Persist role records and their reactor-visible fields.
// Dependencies: role-reactor-core, rusqlite
// ============================================================================

//! ## Overview
//! `role-reactor-store-sqlite` implements [`role_reactor_core::RoleStore`]
//! over a local `SQLite` database. Field values are stored as JSON columns;
//! loads fail closed on undecodable data.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteRoleStore;
pub use store::SqliteRoleStoreConfig;
pub use store::SqliteRoleStoreError;
