// crates/role-reactor-core/tests/reactor_unit_tests.rs
// ============================================================================
// Module: Reactor Loop Unit Tests
// Description: Cycle behavior for receive, respond, and acknowledge states.
// Purpose: Validate delivery, idempotency, and fault guarantees of the loop.
// Dependencies: role-reactor-core, serde_json
// ============================================================================

//! ## Overview
//! Exercises [`role_reactor_core::Reactor`] cycles end to end with scripted
//! transports and in-memory collaborators.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::collections::BTreeMap;

use common::FaultyRoleStore;
use common::FixedClock;
use common::MemoryRoleStore;
use common::RecordingSink;
use common::ScriptedQueue;
use common::StubRollback;
use role_reactor_core::Cycle;
use role_reactor_core::DispatchConfig;
use role_reactor_core::Reactor;
use role_reactor_core::ReactorBuildError;
use role_reactor_core::RoleField;
use role_reactor_core::RoleFieldValue;

// ============================================================================
// SECTION: Helper Functions
// ============================================================================

fn reactor_with(
    store: MemoryRoleStore,
    queue: ScriptedQueue,
    sink: RecordingSink,
) -> Reactor {
    Reactor::builder()
        .store(store)
        .source(queue)
        .sink(sink)
        .rollback(StubRollback::new())
        .clock(FixedClock(0))
        .config(DispatchConfig {
            opt_out_period_days: 90,
        })
        .build()
        .unwrap()
}

fn list_body() -> String {
    r#"{"command": "list_repoable_services", "account": "123", "role_name": "abc", "respond_channel": "c"}"#
        .to_string()
}

// ============================================================================
// SECTION: Builder Tests
// ============================================================================

/// Tests the builder fails without a store.
#[test]
fn builder_fails_without_store() {
    let result = Reactor::builder()
        .source(ScriptedQueue::new())
        .sink(RecordingSink::new())
        .rollback(StubRollback::new())
        .clock(FixedClock(0))
        .build();

    match result {
        Err(ReactorBuildError::MissingStore) => {}
        Err(other) => panic!("expected MissingStore, got: {other}"),
        Ok(_) => panic!("expected error, got Ok"),
    }
}

/// Tests the builder fails without a queue source.
#[test]
fn builder_fails_without_source() {
    let result = Reactor::builder()
        .store(MemoryRoleStore::new())
        .sink(RecordingSink::new())
        .rollback(StubRollback::new())
        .clock(FixedClock(0))
        .build();

    assert!(matches!(result, Err(ReactorBuildError::MissingSource)));
}

// ============================================================================
// SECTION: Cycle Tests
// ============================================================================

/// Tests an empty queue yields an idle cycle.
#[test]
fn empty_queue_is_idle() {
    let reactor =
        reactor_with(MemoryRoleStore::new(), ScriptedQueue::new(), RecordingSink::new());

    let cycle = reactor.run_once().unwrap();

    assert_eq!(cycle, Cycle::Idle);
}

/// Tests a valid command is dispatched, answered, and acknowledged.
#[test]
fn valid_command_is_answered_and_acknowledged() {
    let store = MemoryRoleStore::new();
    let mut fields = BTreeMap::new();
    fields.insert(
        RoleField::RepoableServices,
        RoleFieldValue::RepoableServices(vec!["s3:GetObject".to_string()]),
    );
    store.insert_role("123", "abc", fields);
    let queue = ScriptedQueue::new();
    queue.push(&list_body(), "r-1");
    let sink = RecordingSink::new();
    let reactor = reactor_with(store, queue.clone(), sink.clone());

    let cycle = reactor.run_once().unwrap();

    match cycle {
        Cycle::Completed {
            outcome,
            responded,
            acknowledged,
        } => {
            assert!(outcome.success);
            assert!(responded);
            assert!(acknowledged);
        }
        Cycle::Idle => panic!("expected a completed cycle"),
    }
    let published = sink.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].channel, "c");
    assert_eq!(published[0].title, "Role Reactor Success");
    assert_eq!(
        published[0].message,
        "Repoable services from role abc in account 123: ['s3:GetObject']"
    );
    assert_eq!(queue.deleted(), vec!["r-1".to_string()]);
}

/// Tests the reply mentions the responding user when present.
#[test]
fn reply_mentions_respond_user() {
    let queue = ScriptedQueue::new();
    queue.push(
        r#"{"command": "list_repoable_services", "account": "123", "role_name": "abc", "respond_channel": "c", "respond_user": "bob"}"#,
        "r-1",
    );
    let sink = RecordingSink::new();
    let reactor = reactor_with(MemoryRoleStore::new(), queue, sink.clone());

    reactor.run_once().unwrap();

    let published = sink.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].title, "Role Reactor Failure");
    assert_eq!(published[0].message, "@bob Unable to find role abc in account 123");
}

/// Tests unknown commands are answered as failures and acknowledged.
#[test]
fn unknown_command_is_answered_and_acknowledged() {
    let queue = ScriptedQueue::new();
    queue.push(
        r#"{"command": "make_coffee", "account": "123", "role_name": "abc", "respond_channel": "c"}"#,
        "r-1",
    );
    let sink = RecordingSink::new();
    let reactor = reactor_with(MemoryRoleStore::new(), queue.clone(), sink.clone());

    reactor.run_once().unwrap();

    let published = sink.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].title, "Role Reactor Failure");
    assert!(published[0].message.contains("make_coffee"));
    assert_eq!(queue.deleted(), vec!["r-1".to_string()]);
}

/// Tests schema failures reply to the salvaged channel and acknowledge.
#[test]
fn invalid_schema_replies_to_salvaged_channel() {
    let queue = ScriptedQueue::new();
    queue.push(r#"{"respond_channel": "c", "respond_user": "bob"}"#, "r-1");
    let sink = RecordingSink::new();
    let reactor = reactor_with(MemoryRoleStore::new(), queue.clone(), sink.clone());

    let cycle = reactor.run_once().unwrap();

    match cycle {
        Cycle::Completed {
            outcome,
            responded,
            acknowledged,
        } => {
            assert!(!outcome.success);
            assert!(responded);
            assert!(acknowledged);
        }
        Cycle::Idle => panic!("expected a completed cycle"),
    }
    let published = sink.published();
    assert_eq!(published.len(), 1);
    assert!(published[0].message.starts_with("@bob Malformed message: "));
    assert!(published[0].message.contains("missing required field 'command'"));
    assert_eq!(queue.deleted(), vec!["r-1".to_string()]);
}

/// Tests unaddressable malformed bodies are dropped but acknowledged.
#[test]
fn unaddressable_body_is_dropped_and_acknowledged() {
    let queue = ScriptedQueue::new();
    queue.push("this is not json", "r-1");
    let sink = RecordingSink::new();
    let reactor = reactor_with(MemoryRoleStore::new(), queue.clone(), sink.clone());

    let cycle = reactor.run_once().unwrap();

    match cycle {
        Cycle::Completed {
            outcome,
            responded,
            acknowledged,
        } => {
            assert!(!outcome.success);
            assert_eq!(outcome.text, "Received malformed queue message");
            assert!(!responded);
            assert!(acknowledged);
        }
        Cycle::Idle => panic!("expected a completed cycle"),
    }
    assert!(sink.published().is_empty());
    assert_eq!(queue.deleted(), vec!["r-1".to_string()]);
}

/// Tests deliveries without a receipt handle are never acknowledged.
#[test]
fn missing_receipt_skips_acknowledgment() {
    let queue = ScriptedQueue::new();
    queue.push_without_receipt(&list_body());
    let sink = RecordingSink::new();
    let reactor = reactor_with(MemoryRoleStore::new(), queue.clone(), sink.clone());

    let cycle = reactor.run_once().unwrap();

    match cycle {
        Cycle::Completed {
            acknowledged, ..
        } => assert!(!acknowledged),
        Cycle::Idle => panic!("expected a completed cycle"),
    }
    assert_eq!(sink.published().len(), 1);
    assert!(queue.deleted().is_empty());
}

/// Tests store faults abort the cycle before acknowledgment.
#[test]
fn store_fault_leaves_delivery_unacknowledged() {
    let queue = ScriptedQueue::new();
    queue.push(&list_body(), "r-1");
    let sink = RecordingSink::new();
    let reactor = Reactor::builder()
        .store(FaultyRoleStore)
        .source(queue.clone())
        .sink(sink.clone())
        .rollback(StubRollback::new())
        .clock(FixedClock(0))
        .build()
        .unwrap();

    let result = reactor.run_once();

    assert!(result.is_err());
    assert!(sink.published().is_empty());
    assert!(queue.deleted().is_empty());
}
