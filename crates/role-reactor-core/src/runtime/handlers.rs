// crates/role-reactor-core/src/runtime/handlers.rs
// ============================================================================
// Module: Command Handlers
// Description: Per-command business rules over the role store gateway.
// Purpose: Turn validated messages into dispatch outcomes.
// Dependencies: crate::core, crate::interfaces, thiserror
// ============================================================================

//! ## Overview
//! Each handler shares one contract: dependencies plus a validated
//! [`CommandMessage`] in, a [`DispatchOutcome`] out. Anticipated failures
//! (role not found, already opted out, missing fields) are outcomes; only
//! store and engine faults use the error path.
//! Invariants:
//! - `opt_out` never overwrites an existing opt-out record.
//! - `rollback_role` without a selection touches neither store nor engine.
//! - Policy version order from the store is preserved exactly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::message::CommandMessage;
use crate::core::outcome::DispatchOutcome;
use crate::core::role::OptOutRecord;
use crate::core::role::RoleField;
use crate::core::role::RoleFieldValue;
use crate::core::role::RoleId;
use crate::core::time::expiry_epoch;
use crate::core::time::format_expiry_date;
use crate::interfaces::Clock;
use crate::interfaces::RollbackEngine;
use crate::interfaces::RollbackEngineError;
use crate::interfaces::RollbackRequest;
use crate::interfaces::RoleStore;
use crate::interfaces::RoleStoreError;
use crate::runtime::command::CommandKind;

// ============================================================================
// SECTION: Dispatch Configuration
// ============================================================================

/// Default opt-out period in days.
pub const DEFAULT_OPT_OUT_PERIOD_DAYS: u32 = 90;

/// Configuration consumed by the handlers.
///
/// # Invariants
/// - Values are passed explicitly at construction time, never read from
///   ambient process state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Opt-out duration in days.
    pub opt_out_period_days: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            opt_out_period_days: DEFAULT_OPT_OUT_PERIOD_DAYS,
        }
    }
}

// ============================================================================
// SECTION: Handler Dependencies
// ============================================================================

/// Dependencies shared by every handler.
pub struct HandlerDeps<'a> {
    /// Role store gateway.
    pub store: &'a dyn RoleStore,
    /// External rollback engine.
    pub rollback: &'a dyn RollbackEngine,
    /// Host-supplied clock.
    pub clock: &'a dyn Clock,
    /// Dispatch configuration.
    pub config: &'a DispatchConfig,
}

/// Infrastructure faults raised by handlers.
///
/// # Invariants
/// - Business-rule failures never use these variants; they are outcomes.
#[derive(Debug, Error)]
pub enum HandlerFault {
    /// Role store fault.
    #[error(transparent)]
    Store(#[from] RoleStoreError),
    /// Rollback engine fault.
    #[error(transparent)]
    Rollback(#[from] RollbackEngineError),
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Resolves and invokes the handler for a validated message.
///
/// Unknown command names yield a failed outcome, never an error.
///
/// # Errors
///
/// Returns [`HandlerFault`] when the store or rollback engine is
/// unavailable.
pub fn dispatch(
    deps: &HandlerDeps<'_>,
    message: &CommandMessage,
) -> Result<DispatchOutcome, HandlerFault> {
    let Some(kind) = CommandKind::parse(&message.command) else {
        return Ok(DispatchOutcome::failure(format!("Unknown function {}", message.command)));
    };
    match kind {
        CommandKind::ListRepoableServices => list_repoable_services(deps, message),
        CommandKind::ListRoleRollbacks => list_role_rollbacks(deps, message),
        CommandKind::OptOut => opt_out(deps, message),
        CommandKind::RemoveOptOut => remove_opt_out(deps, message),
        CommandKind::RollbackRole => rollback_role(deps, message),
    }
}

// ============================================================================
// SECTION: Read-Only Handlers
// ============================================================================

/// Lists the repoable services recorded for a role.
fn list_repoable_services(
    deps: &HandlerDeps<'_>,
    message: &CommandMessage,
) -> Result<DispatchOutcome, HandlerFault> {
    let Some(role_id) = find_role(deps.store, message)? else {
        return Ok(role_not_found(message));
    };
    let fields = deps.store.get_fields(&role_id, &[RoleField::RepoableServices])?;
    let services = match fields.get(&RoleField::RepoableServices) {
        Some(RoleFieldValue::RepoableServices(services)) => services.clone(),
        _ => Vec::new(),
    };
    Ok(DispatchOutcome::success(format!(
        "Repoable services from role {} in account {}: {}",
        message.role_name,
        message.account,
        quoted_list(&services)
    )))
}

/// Lists the restorable policy versions recorded for a role.
fn list_role_rollbacks(
    deps: &HandlerDeps<'_>,
    message: &CommandMessage,
) -> Result<DispatchOutcome, HandlerFault> {
    let Some(role_id) = find_role(deps.store, message)? else {
        return Ok(role_not_found(message));
    };
    let fields = deps.store.get_fields(&role_id, &[RoleField::Policies])?;
    let policies = match fields.get(&RoleField::Policies) {
        Some(RoleFieldValue::Policies(policies)) => policies.clone(),
        _ => Vec::new(),
    };
    let mut text = format!(
        "Restorable versions for role {} in account {}\n",
        message.role_name, message.account
    );
    // Indexes follow store order; selections in rollback_role refer to them.
    for (index, version) in policies.iter().enumerate() {
        text.push_str(&format!(
            "({index:>3}):  {:<5}     {:<15}  {}\n",
            version.policy_len(),
            version.discovered,
            version.source
        ));
    }
    Ok(DispatchOutcome::success(text))
}

// ============================================================================
// SECTION: Opt-Out Handlers
// ============================================================================

/// Opts a role out of automated repository actions.
fn opt_out(
    deps: &HandlerDeps<'_>,
    message: &CommandMessage,
) -> Result<DispatchOutcome, HandlerFault> {
    let reason = message.reason.as_deref().unwrap_or_default();
    let requestor = message.requestor.as_deref().unwrap_or_default();
    if reason.is_empty() || requestor.is_empty() {
        return Ok(DispatchOutcome::failure("Reason and requestor must be specified"));
    }
    let Some(role_id) = find_role(deps.store, message)? else {
        return Ok(role_not_found(message));
    };
    let fields = deps.store.get_fields(&role_id, &[RoleField::OptOut])?;
    if let Some(RoleFieldValue::OptOut(Some(existing))) = fields.get(&RoleField::OptOut) {
        return Ok(DispatchOutcome::failure(format!(
            "Role {} in account {} is already opted out by {} for reason {} until {}",
            message.role_name,
            message.account,
            existing.owner,
            existing.reason,
            format_expiry_date(existing.expire)
        )));
    }
    let expire = expiry_epoch(deps.clock.now_epoch_secs(), deps.config.opt_out_period_days);
    let record = OptOutRecord {
        owner: requestor.to_string(),
        reason: reason.to_string(),
        expire,
    };
    let mut updates = BTreeMap::new();
    updates.insert(RoleField::OptOut, RoleFieldValue::OptOut(Some(record)));
    deps.store.set_fields(&role_id, updates)?;
    Ok(DispatchOutcome::success(format!(
        "Role {} in account {} opted-out until {}",
        message.role_name,
        message.account,
        format_expiry_date(expire)
    )))
}

/// Cancels an existing opt-out.
fn remove_opt_out(
    deps: &HandlerDeps<'_>,
    message: &CommandMessage,
) -> Result<DispatchOutcome, HandlerFault> {
    let Some(role_id) = find_role(deps.store, message)? else {
        return Ok(role_not_found(message));
    };
    let fields = deps.store.get_fields(&role_id, &[RoleField::OptOut])?;
    match fields.get(&RoleField::OptOut) {
        Some(RoleFieldValue::OptOut(Some(_))) => {
            let mut updates = BTreeMap::new();
            updates.insert(RoleField::OptOut, RoleFieldValue::OptOut(None));
            deps.store.set_fields(&role_id, updates)?;
            Ok(DispatchOutcome::success(format!(
                "Cancelled opt-out for role {} in account {}",
                message.role_name, message.account
            )))
        }
        _ => Ok(DispatchOutcome::failure(format!(
            "Role {} in account {} wasn't opted out",
            message.role_name, message.account
        ))),
    }
}

// ============================================================================
// SECTION: Rollback Handler
// ============================================================================

/// Delegates a policy rollback to the external engine.
fn rollback_role(
    deps: &HandlerDeps<'_>,
    message: &CommandMessage,
) -> Result<DispatchOutcome, HandlerFault> {
    let selection = message.selection.as_deref().unwrap_or_default();
    if selection.is_empty() {
        return Ok(DispatchOutcome::failure("Rollback must contain a selection number"));
    }
    let request = RollbackRequest {
        account: &message.account,
        role_name: &message.role_name,
        selection,
        commit: true,
    };
    let report = deps.rollback.rollback(deps.store, &request)?;
    if report.is_clean() {
        Ok(DispatchOutcome::success(format!(
            "Successfully rolled back role {} in account {}",
            message.role_name, message.account
        )))
    } else {
        Ok(DispatchOutcome::failure(format!(
            "Errors during rollback: {}",
            report.errors.join("; ")
        )))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Looks up the target role of a message.
fn find_role(
    store: &dyn RoleStore,
    message: &CommandMessage,
) -> Result<Option<RoleId>, HandlerFault> {
    Ok(store.find_role_id(&message.account, &message.role_name)?)
}

/// Builds the shared role-not-found failure outcome.
fn role_not_found(message: &CommandMessage) -> DispatchOutcome {
    DispatchOutcome::failure(format!(
        "Unable to find role {} in account {}",
        message.role_name, message.account
    ))
}

/// Renders services as a bracketed, single-quoted list.
fn quoted_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| format!("'{item}'")).collect();
    format!("[{}]", quoted.join(", "))
}
