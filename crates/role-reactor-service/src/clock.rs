// crates/role-reactor-service/src/clock.rs
// ============================================================================
// Module: System Clock
// Description: Wall-clock implementation of the reactor clock interface.
// Purpose: Supply real time to handlers; the core never reads it directly.
// Dependencies: role-reactor-core, std
// ============================================================================

//! ## Overview
//! [`SystemClock`] reads the process wall clock. Times before the unix epoch
//! clamp to zero.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use role_reactor_core::Clock;

// ============================================================================
// SECTION: System Clock
// ============================================================================

/// Clock backed by the process wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        i64::try_from(now.as_secs()).unwrap_or(i64::MAX)
    }
}
