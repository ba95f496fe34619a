// crates/role-reactor-core/src/core/role.rs
// ============================================================================
// Module: Role Record Types
// Description: Identifiers and named fields of store-owned role records.
// Purpose: Provide typed views over the fields the reactor reads and writes.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The role store owns role records; the reactor only touches three named
//! fields: `RepoableServices`, `Policies`, and `OptOut`. Field values are
//! carried as tagged variants so handlers never see untyped store rows.
//! Invariants:
//! - `Policies` preserves store order exactly; the core never re-sorts it.
//! - A cleared opt-out is represented as [`RoleFieldValue::OptOut`] holding
//!   `None`, mirroring an empty record in the store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Role Identifier
// ============================================================================

/// Opaque role identifier assigned by the role store.
///
/// # Invariants
/// - Values are store-scoped and never parsed by the core.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
    /// Creates a role identifier from a store-provided value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Named Fields
// ============================================================================

/// Named role-record fields the reactor reads and writes.
///
/// # Invariants
/// - `as_str` values match the store's column/attribute names exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoleField {
    /// Services the repository engine may remove from the role.
    RepoableServices,
    /// Ordered history of recorded policy versions.
    Policies,
    /// Time-bounded opt-out flag.
    OptOut,
}

impl RoleField {
    /// Returns the store-facing field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RepoableServices => "RepoableServices",
            Self::Policies => "Policies",
            Self::OptOut => "OptOut",
        }
    }
}

impl fmt::Display for RoleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Field Values
// ============================================================================

/// One recorded policy version inside the `Policies` field.
///
/// # Invariants
/// - `discovered` and `source` are opaque store-provided strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyVersion {
    /// Policy body as recorded by the store.
    #[serde(rename = "Policy")]
    pub policy: Value,
    /// Discovery timestamp string.
    #[serde(rename = "Discovered")]
    pub discovered: String,
    /// Source that recorded this version.
    #[serde(rename = "Source")]
    pub source: String,
}

impl PolicyVersion {
    /// Returns the serialized policy body length in bytes.
    #[must_use]
    pub fn policy_len(&self) -> usize {
        serde_json::to_vec(&self.policy).map_or(0, |bytes| bytes.len())
    }
}

/// Opt-out record stored under the `OptOut` field.
///
/// # Invariants
/// - `expire` is epoch seconds; expiry enforcement is the repository
///   engine's concern, not the reactor's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptOutRecord {
    /// Requestor that opted the role out.
    pub owner: String,
    /// Free-form reason supplied by the requestor.
    pub reason: String,
    /// Expiry in epoch seconds.
    pub expire: i64,
}

/// Typed value for a named role-record field.
///
/// # Invariants
/// - Each variant corresponds 1:1 to a [`RoleField`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleFieldValue {
    /// Value of [`RoleField::RepoableServices`].
    RepoableServices(Vec<String>),
    /// Value of [`RoleField::Policies`], in store order.
    Policies(Vec<PolicyVersion>),
    /// Value of [`RoleField::OptOut`]; `None` models a cleared record.
    OptOut(Option<OptOutRecord>),
}

impl RoleFieldValue {
    /// Returns the field this value belongs to.
    #[must_use]
    pub const fn field(&self) -> RoleField {
        match self {
            Self::RepoableServices(_) => RoleField::RepoableServices,
            Self::Policies(_) => RoleField::Policies,
            Self::OptOut(_) => RoleField::OptOut,
        }
    }
}
