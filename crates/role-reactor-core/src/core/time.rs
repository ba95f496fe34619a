// crates/role-reactor-core/src/core/time.rs
// ============================================================================
// Module: Opt-Out Time Arithmetic
// Description: Epoch-second day arithmetic and calendar expiry rendering.
// Purpose: Compute and format opt-out expiries deterministically.
// Dependencies: time
// ============================================================================

//! ## Overview
//! The core never reads wall-clock time directly; hosts supply epoch seconds
//! through the [`crate::interfaces::Clock`] interface. This module holds the
//! pure arithmetic and rendering used by the opt-out handlers.
//! Invariants:
//! - Day arithmetic is UTC-based: one day is exactly 86 400 seconds.
//! - Rendering never panics; unrepresentable epochs fall back to a raw form.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;
use time::macros::format_description;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Seconds per UTC day.
const SECONDS_PER_DAY: i64 = 86_400;

// ============================================================================
// SECTION: Arithmetic
// ============================================================================

/// Computes an opt-out expiry: `now` plus the configured period in days.
#[must_use]
pub const fn expiry_epoch(now_epoch_secs: i64, period_days: u32) -> i64 {
    now_epoch_secs + period_days as i64 * SECONDS_PER_DAY
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Formats an epoch-second expiry as a `MM/DD/YY` calendar date (UTC).
///
/// Unrepresentable epochs render as `epoch {value}` instead of panicking.
#[must_use]
pub fn format_expiry_date(expire_epoch: i64) -> String {
    let format = format_description!("[month]/[day]/[year repr:last_two]");
    OffsetDateTime::from_unix_timestamp(expire_epoch)
        .ok()
        .and_then(|date| date.format(format).ok())
        .unwrap_or_else(|| format!("epoch {expire_epoch}"))
}
