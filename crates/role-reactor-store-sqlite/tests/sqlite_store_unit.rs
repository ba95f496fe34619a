// crates/role-reactor-store-sqlite/tests/sqlite_store_unit.rs
// ============================================================================
// Module: SQLite Role Store Unit Tests
// Description: Targeted tests for the SQLite role store.
// Purpose: Validate lookup, field round-trips, durability, and fail-closed
//          handling of bad paths and undecodable data.
// ============================================================================

//! ## Overview
//! Unit-level tests for `SQLite` role store invariants:
//! - `(account, role_name)` lookup and idempotent role creation
//! - Field round-trips with store-order preservation for policies
//! - NULL columns modeling absent and cleared fields
//! - Durability across reopen and rejection of corrupt JSON

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeMap;
use std::path::Path;

use role_reactor_core::OptOutRecord;
use role_reactor_core::PolicyVersion;
use role_reactor_core::RoleField;
use role_reactor_core::RoleFieldValue;
use role_reactor_core::RoleStore;
use role_reactor_store_sqlite::SqliteRoleStore;
use role_reactor_store_sqlite::SqliteRoleStoreConfig;
use rusqlite::Connection;
use rusqlite::params;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn sample_policies() -> Vec<PolicyVersion> {
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

fn open_at(dir: &TempDir) -> SqliteRoleStore {
    let config = SqliteRoleStoreConfig::new(dir.path().join("roles.db"));
    SqliteRoleStore::open(&config).expect("open store")
}

// ============================================================================
// SECTION: Lookup and Creation
// ============================================================================

#[test]
fn find_role_id_returns_none_for_unknown_role() {
    let store = SqliteRoleStore::open_in_memory().unwrap();
    assert!(store.find_role_id("123456789012", "missing").unwrap().is_none());
}

#[test]
fn put_role_is_idempotent() {
    let store = SqliteRoleStore::open_in_memory().unwrap();
    let first = store.put_role("123456789012", "app-role").unwrap();
    let second = store.put_role("123456789012", "app-role").unwrap();
    assert_eq!(first, second);

    let found = store.find_role_id("123456789012", "app-role").unwrap().expect("role id");
    assert_eq!(found, first);
}

#[test]
fn roles_are_scoped_by_account() {
    let store = SqliteRoleStore::open_in_memory().unwrap();
    let one = store.put_role("111111111111", "app-role").unwrap();
    let two = store.put_role("222222222222", "app-role").unwrap();
    assert_ne!(one, two);
}

// ============================================================================
// SECTION: Field Round-Trips
// ============================================================================

#[test]
fn new_role_has_no_fields() {
    let store = SqliteRoleStore::open_in_memory().unwrap();
    let role_id = store.put_role("123456789012", "app-role").unwrap();
    let fields = store
        .get_fields(&role_id, &[RoleField::RepoableServices, RoleField::Policies, RoleField::OptOut])
        .unwrap();
    assert!(fields.is_empty());
}

#[test]
fn repoable_services_round_trip() {
    let store = SqliteRoleStore::open_in_memory().unwrap();
    let role_id = store.put_role("123456789012", "app-role").unwrap();
    let services = vec!["ec2".to_string(), "s3".to_string()];
    let mut updates = BTreeMap::new();
    updates.insert(
        RoleField::RepoableServices,
        RoleFieldValue::RepoableServices(services.clone()),
    );
    store.set_fields(&role_id, updates).unwrap();

    let fields = store.get_fields(&role_id, &[RoleField::RepoableServices]).unwrap();
    assert_eq!(
        fields.get(&RoleField::RepoableServices),
        Some(&RoleFieldValue::RepoableServices(services))
    );
}

#[test]
fn policies_preserve_store_order() {
    let store = SqliteRoleStore::open_in_memory().unwrap();
    let role_id = store.put_role("123456789012", "app-role").unwrap();
    let policies = sample_policies();
    let mut updates = BTreeMap::new();
    updates.insert(RoleField::Policies, RoleFieldValue::Policies(policies.clone()));
    store.set_fields(&role_id, updates).unwrap();

    let fields = store.get_fields(&role_id, &[RoleField::Policies]).unwrap();
    assert_eq!(fields.get(&RoleField::Policies), Some(&RoleFieldValue::Policies(policies)));
}

#[test]
fn requesting_a_subset_returns_only_that_subset() {
    let store = SqliteRoleStore::open_in_memory().unwrap();
    let role_id = store.put_role("123456789012", "app-role").unwrap();
    let mut updates = BTreeMap::new();
    updates.insert(
        RoleField::RepoableServices,
        RoleFieldValue::RepoableServices(vec!["iam".to_string()]),
    );
    updates.insert(RoleField::Policies, RoleFieldValue::Policies(sample_policies()));
    store.set_fields(&role_id, updates).unwrap();

    let fields = store.get_fields(&role_id, &[RoleField::Policies]).unwrap();
    assert_eq!(fields.len(), 1);
    assert!(fields.contains_key(&RoleField::Policies));
}

#[test]
fn opt_out_set_and_clear_round_trip() {
    let store = SqliteRoleStore::open_in_memory().unwrap();
    let role_id = store.put_role("123456789012", "app-role").unwrap();
    let record = OptOutRecord {
        owner: "alice".to_string(),
        reason: "migration".to_string(),
        expire: 7_776_000,
    };
    let mut updates = BTreeMap::new();
    updates.insert(RoleField::OptOut, RoleFieldValue::OptOut(Some(record.clone())));
    store.set_fields(&role_id, updates).unwrap();

    let fields = store.get_fields(&role_id, &[RoleField::OptOut]).unwrap();
    assert_eq!(fields.get(&RoleField::OptOut), Some(&RoleFieldValue::OptOut(Some(record))));

    let mut clear = BTreeMap::new();
    clear.insert(RoleField::OptOut, RoleFieldValue::OptOut(None));
    store.set_fields(&role_id, clear).unwrap();

    let fields = store.get_fields(&role_id, &[RoleField::OptOut]).unwrap();
    assert!(fields.is_empty());
}

// ============================================================================
// SECTION: Fail-Closed Behavior
// ============================================================================

#[test]
fn get_fields_rejects_unknown_role_id() {
    let store = SqliteRoleStore::open_in_memory().unwrap();
    let missing = role_reactor_core::RoleId::new("999999999999/ghost");
    assert!(store.get_fields(&missing, &[RoleField::Policies]).is_err());
}

#[test]
fn set_fields_rejects_unknown_role_id() {
    let store = SqliteRoleStore::open_in_memory().unwrap();
    let missing = role_reactor_core::RoleId::new("999999999999/ghost");
    let mut updates = BTreeMap::new();
    updates.insert(RoleField::OptOut, RoleFieldValue::OptOut(None));
    assert!(store.set_fields(&missing, updates).is_err());
}

#[test]
fn get_fields_rejects_undecodable_json() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("roles.db");
    let store = SqliteRoleStore::open(&SqliteRoleStoreConfig::new(&db_path)).unwrap();
    let role_id = store.put_role("123456789012", "app-role").unwrap();
    drop(store);

    let connection = Connection::open(&db_path).unwrap();
    connection
        .execute(
            "UPDATE roles SET policies = ?1 WHERE role_id = ?2",
            params!["not json", role_id.as_str()],
        )
        .unwrap();
    drop(connection);

    let reopened = SqliteRoleStore::open(&SqliteRoleStoreConfig::new(&db_path)).unwrap();
    assert!(reopened.get_fields(&role_id, &[RoleField::Policies]).is_err());
}

#[test]
fn open_rejects_directory_path() {
    let dir = TempDir::new().unwrap();
    let config = SqliteRoleStoreConfig::new(dir.path());
    assert!(SqliteRoleStore::open(&config).is_err());
}

#[test]
fn open_rejects_overlong_path() {
    let long = "a".repeat(5_000);
    let config = SqliteRoleStoreConfig::new(Path::new(&long).join("roles.db"));
    assert!(SqliteRoleStore::open(&config).is_err());
}

// ============================================================================
// SECTION: Durability
// ============================================================================

#[test]
fn fields_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let role_id = {
        let store = open_at(&dir);
        let role_id = store.put_role("123456789012", "app-role").unwrap();
        let mut updates = BTreeMap::new();
        updates.insert(RoleField::Policies, RoleFieldValue::Policies(sample_policies()));
        store.set_fields(&role_id, updates).unwrap();
        role_id
    };

    let reopened = open_at(&dir);
    let found = reopened.find_role_id("123456789012", "app-role").unwrap().expect("role id");
    assert_eq!(found, role_id);
    let fields = reopened.get_fields(&role_id, &[RoleField::Policies]).unwrap();
    assert_eq!(
        fields.get(&RoleField::Policies),
        Some(&RoleFieldValue::Policies(sample_policies()))
    );
}
