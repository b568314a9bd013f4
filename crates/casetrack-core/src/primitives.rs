//! # Rule Primitives
//!
//! Default constants for the milestone calendar rules.
//!
//! These are the values the office has always scheduled with. They seed
//! [`ScheduleRules::default`](crate::scheduler::ScheduleRules), which is the
//! only place they are read from at runtime.
//!
//! ## Rules
//!
//! 1. **Sign-difference**: plain calendar days after the contract.
//! 2. **Seal**: calendar months after the contract, then moved to a Wed/Fri.
//! 3. **Tax payment**: weeks after the seal, depending on the case kind.
//! 4. **Handover**: searched inside a window of days after the tax payment.

/// Days between the contract and the sign-difference date.
///
/// Weekends are NOT skipped for this rule.
pub const SIGN_DIFF_DAYS: u32 = 3;

/// Calendar months between the contract and the (unadjusted) seal date.
pub const SEAL_OFFSET_MONTHS: u32 = 2;

/// Weeks between the seal and the tax payment for a standard case.
pub const STANDARD_TAX_WEEKS: u32 = 2;

/// Weeks between the seal and the tax payment for a self-use case.
pub const SELF_USE_TAX_WEEKS: u32 = 3;

/// First day (inclusive) of the handover search window, counted from the tax payment.
pub const HANDOVER_WINDOW_START_DAYS: u32 = 7;

/// Last day (inclusive) of the handover search window, counted from the tax payment.
pub const HANDOVER_WINDOW_END_DAYS: u32 = 14;

/// Days after the tax payment used as the handover target when the window has no candidate.
pub const HANDOVER_FALLBACK_DAYS: u32 = 10;

// =============================================================================
// INPUT LIMITS
// =============================================================================

/// Canonical interchange format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Maximum number of case records accepted from a single JSON document.
///
/// Larger documents are rejected before classification.
pub const MAX_RECORDS: usize = 100_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handover_window_is_ordered() {
        assert!(HANDOVER_WINDOW_START_DAYS <= HANDOVER_WINDOW_END_DAYS);
        assert!(HANDOVER_FALLBACK_DAYS >= HANDOVER_WINDOW_START_DAYS);
        assert!(HANDOVER_FALLBACK_DAYS <= HANDOVER_WINDOW_END_DAYS);
    }

    #[test]
    fn self_use_waits_longer() {
        assert!(SELF_USE_TAX_WEEKS > STANDARD_TAX_WEEKS);
    }
}
