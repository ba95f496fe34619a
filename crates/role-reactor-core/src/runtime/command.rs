// crates/role-reactor-core/src/runtime/command.rs
// ============================================================================
// Module: Command Kinds
// Description: Closed enumeration of supported command names.
// Purpose: Keep the set of valid commands closed and checkable at compile time.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Commands are resolved by exact, case-sensitive string match into a closed
//! enum. Unknown names are handled by the dispatcher as failed outcomes, not
//! by this module.
//! Invariants:
//! - `parse` and `as_str` round-trip for every variant.

// ============================================================================
// SECTION: Command Kind
// ============================================================================

/// Supported command names.
///
/// # Invariants
/// - Wire names are stable; chat-ops integrations depend on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// List the services the repository engine may remove from a role.
    ListRepoableServices,
    /// List a role's restorable policy versions.
    ListRoleRollbacks,
    /// Opt a role out of automated repository actions.
    OptOut,
    /// Cancel an existing opt-out.
    RemoveOptOut,
    /// Restore a role's policy to a recorded version.
    RollbackRole,
}

/// Every supported command, in dispatch-table order.
pub const ALL_COMMANDS: [CommandKind; 5] = [
    CommandKind::ListRepoableServices,
    CommandKind::ListRoleRollbacks,
    CommandKind::OptOut,
    CommandKind::RemoveOptOut,
    CommandKind::RollbackRole,
];

impl CommandKind {
    /// Resolves a command name by exact, case-sensitive match.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "list_repoable_services" => Some(Self::ListRepoableServices),
            "list_role_rollbacks" => Some(Self::ListRoleRollbacks),
            "opt_out" => Some(Self::OptOut),
            "remove_opt_out" => Some(Self::RemoveOptOut),
            "rollback_role" => Some(Self::RollbackRole),
            _ => None,
        }
    }

    /// Returns the stable wire name for the command.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListRepoableServices => "list_repoable_services",
            Self::ListRoleRollbacks => "list_role_rollbacks",
            Self::OptOut => "opt_out",
            Self::RemoveOptOut => "remove_opt_out",
            Self::RollbackRole => "rollback_role",
        }
    }
}
