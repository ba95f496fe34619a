// crates/role-reactor-service/tests/common/mod.rs
// ============================================================================
// Module: Shared Service Test Helpers
// Description: Fixed clock and store seeding used across test binaries.
// Purpose: Keep service tests deterministic and compact.
// ============================================================================

//! ## Overview
//! Deterministic helpers shared by the service test binaries.

#![allow(
    dead_code,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "Shared test helpers; each test binary uses a subset."
)]

use std::collections::BTreeMap;

use role_reactor_core::Clock;
use role_reactor_core::PolicyVersion;
use role_reactor_core::RoleField;
use role_reactor_core::RoleFieldValue;
use role_reactor_core::RoleId;
use role_reactor_core::RoleStore;
use role_reactor_store_sqlite::SqliteRoleStore;

/// Clock pinned to a fixed epoch second.
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

/// Two recorded policy versions in store order.
pub fn sample_policies() -> Vec<PolicyVersion> {
    vec![
        PolicyVersion {
            policy: serde_json::json!({"Statement": []}),
            discovered: "2024-01-01T00:00:00Z".to_string(),
            source: "Scan".to_string(),
        },
        PolicyVersion {
            policy: serde_json::json!({"Statement": [{"Action": "s3:GetObject"}]}),
            discovered: "2024-02-01T00:00:00Z".to_string(),
            source: "Repo".to_string(),
        },
    ]
}

/// Seeds a role with the sample policy history and returns its identifier.
pub fn seed_role_with_policies(store: &SqliteRoleStore, account: &str, role_name: &str) -> RoleId {
    let role_id = store.put_role(account, role_name).expect("put role");
    let mut updates = BTreeMap::new();
    updates.insert(RoleField::Policies, RoleFieldValue::Policies(sample_policies()));
    store.set_fields(&role_id, updates).expect("seed policies");
    role_id
}
