// crates/role-reactor-service/src/rollback.rs
// ============================================================================
// Module: Stored-Policy Rollback Engine
// Description: Restores a recorded policy version from the role store.
// Purpose: Back the rollback_role command with store-recorded history.
// Dependencies: role-reactor-core, time
// ============================================================================

//! ## Overview
//! [`StoredPolicyRollback`] restores a role's policy to a version recorded in
//! the store's `Policies` history. A restore appends a new version rather
//! than rewriting history, so every rollback is itself recorded and
//! selectable later.
//! Invariants:
//! - Anticipated problems (unknown role, bad selection) are reported in the
//!   [`RollbackReport`]; only store faults use the error path.
//! - Plan-only requests (`commit == false`) never write to the store.
//! - Selections index the `Policies` history in store order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use role_reactor_core::Clock;
use role_reactor_core::PolicyVersion;
use role_reactor_core::RoleField;
use role_reactor_core::RoleFieldValue;
use role_reactor_core::RollbackEngine;
use role_reactor_core::RollbackEngineError;
use role_reactor_core::RollbackReport;
use role_reactor_core::RollbackRequest;
use role_reactor_core::RoleStore;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Source label recorded on restored policy versions.
const ROLLBACK_SOURCE: &str = "Rollback";

// ============================================================================
// SECTION: Rollback Engine
// ============================================================================

/// Rollback engine restoring policy versions recorded in the role store.
pub struct StoredPolicyRollback {
    /// Clock used to stamp restored versions.
    clock: Arc<dyn Clock>,
}

impl StoredPolicyRollback {
    /// Creates an engine stamping restores with the provided clock.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
        }
    }

    /// Returns the discovery timestamp for a restored version.
    fn discovered_stamp(&self) -> String {
        let epoch = self.clock.now_epoch_secs();
        OffsetDateTime::from_unix_timestamp(epoch)
            .ok()
            .and_then(|moment| moment.format(&Rfc3339).ok())
            .unwrap_or_else(|| format!("epoch {epoch}"))
    }
}

impl RollbackEngine for StoredPolicyRollback {
    fn rollback(
        &self,
        store: &dyn RoleStore,
        request: &RollbackRequest<'_>,
    ) -> Result<RollbackReport, RollbackEngineError> {
        let mut report = RollbackReport::default();

        let Some(role_id) = store.find_role_id(request.account, request.role_name)? else {
            report.errors.push(format!(
                "Unable to find role {} in account {}",
                request.role_name, request.account
            ));
            return Ok(report);
        };

        let Ok(index) = request.selection.trim().parse::<usize>() else {
            report.errors.push(format!("selection {} is not a number", request.selection));
            return Ok(report);
        };

        let fields = store.get_fields(&role_id, &[RoleField::Policies])?;
        let mut policies = match fields.get(&RoleField::Policies) {
            Some(RoleFieldValue::Policies(policies)) => policies.clone(),
            _ => Vec::new(),
        };
        if policies.is_empty() {
            report.errors.push(format!(
                "role {} has no recorded policy versions",
                request.role_name
            ));
            return Ok(report);
        }

        let Some(selected) = policies.get(index) else {
            report.errors.push(format!("selection {index} is out of range"));
            return Ok(report);
        };

        if request.commit {
            let restored = PolicyVersion {
                policy: selected.policy.clone(),
                discovered: self.discovered_stamp(),
                source: ROLLBACK_SOURCE.to_string(),
            };
            policies.push(restored);
            let mut updates = BTreeMap::new();
            updates.insert(RoleField::Policies, RoleFieldValue::Policies(policies));
            store.set_fields(&role_id, updates)?;
        }

        Ok(report)
    }
}
