//! # Milestone Scheduler
//!
//! Computes downstream target dates from a contract date.
//!
//! Rules run in sequence, each starting from the previous result:
//!
//! 1. `sign_diff_date` = contract + 3 days (weekends NOT skipped)
//! 2. `seal_date` = contract + 2 months, moved forward to a Wed/Fri
//! 3. `tax_payment_date` = seal + 2 weeks (standard) or 3 weeks (self-use), moved forward to a Wed/Fri
//! 4. `handover_date` = searched in `[tax + 7, tax + 14]`:
//!    weekdays that are a Friday or the day before month end qualify,
//!    a Friday is preferred, otherwise the earliest candidate.
//!    With no candidate, `tax + 10` walked backward to a weekday.
//!
//! The scheduler never reads the clock and never computes a redemption date.

use crate::calendar;
use crate::primitives::{
    HANDOVER_FALLBACK_DAYS, HANDOVER_WINDOW_END_DAYS, HANDOVER_WINDOW_START_DAYS,
    SEAL_OFFSET_MONTHS, SELF_USE_TAX_WEEKS, SIGN_DIFF_DAYS, STANDARD_TAX_WEEKS,
};
use crate::{CaseKind, CasetrackError, ScheduledMilestones};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

// =============================================================================
// RULE SET
// =============================================================================

/// Tunable offsets for the scheduling rules.
///
/// `Default` reproduces the office rules exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleRules {
    pub sign_diff_days: u32,
    pub seal_offset_months: u32,
    pub standard_tax_weeks: u32,
    pub self_use_tax_weeks: u32,
    pub handover_window_start_days: u32,
    pub handover_window_end_days: u32,
    pub handover_fallback_days: u32,
}

impl Default for ScheduleRules {
    fn default() -> Self {
        Self {
            sign_diff_days: SIGN_DIFF_DAYS,
            seal_offset_months: SEAL_OFFSET_MONTHS,
            standard_tax_weeks: STANDARD_TAX_WEEKS,
            self_use_tax_weeks: SELF_USE_TAX_WEEKS,
            handover_window_start_days: HANDOVER_WINDOW_START_DAYS,
            handover_window_end_days: HANDOVER_WINDOW_END_DAYS,
            handover_fallback_days: HANDOVER_FALLBACK_DAYS,
        }
    }
}

impl ScheduleRules {
    /// Check internal consistency.
    ///
    /// The handover must land after the tax payment, the window must not be
    /// inverted, and a self-use case never pays tax before a standard one.
    pub fn validate(&self) -> Result<(), CasetrackError> {
        if self.handover_window_start_days == 0 {
            return Err(CasetrackError::InvalidRules(
                "handover_window_start_days must be at least 1".to_string(),
            ));
        }
        if self.handover_window_start_days > self.handover_window_end_days {
            return Err(CasetrackError::InvalidRules(format!(
                "handover window is inverted: {} > {}",
                self.handover_window_start_days, self.handover_window_end_days
            )));
        }
        if self.handover_fallback_days == 0 {
            return Err(CasetrackError::InvalidRules(
                "handover_fallback_days must be at least 1".to_string(),
            ));
        }
        if self.self_use_tax_weeks < self.standard_tax_weeks {
            return Err(CasetrackError::InvalidRules(format!(
                "self_use_tax_weeks ({}) is shorter than standard_tax_weeks ({})",
                self.self_use_tax_weeks, self.standard_tax_weeks
            )));
        }
        Ok(())
    }

    /// Seal → tax gap for a case kind.
    #[must_use]
    pub fn tax_weeks(&self, kind: CaseKind) -> u32 {
        match kind {
            CaseKind::Standard => self.standard_tax_weeks,
            CaseKind::SelfUse => self.self_use_tax_weeks,
        }
    }
}

// =============================================================================
// SCHEDULER
// =============================================================================

/// Milestone Scheduler - pure date arithmetic over a rule set.
#[derive(Debug, Clone, Default)]
pub struct MilestoneScheduler {
    rules: ScheduleRules,
}

impl MilestoneScheduler {
    /// Create a scheduler with the default rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scheduler with custom rules.
    pub fn with_rules(rules: ScheduleRules) -> Result<Self, CasetrackError> {
        rules.validate()?;
        Ok(Self { rules })
    }

    #[must_use]
    pub fn rules(&self) -> &ScheduleRules {
        &self.rules
    }

    /// Compute every milestone from a contract date.
    ///
    /// Fails only when the arithmetic leaves chrono's date range.
    pub fn schedule(
        &self,
        contract_date: NaiveDate,
        kind: CaseKind,
    ) -> Result<ScheduledMilestones, CasetrackError> {
        let sign_diff_date = calendar::add_days(contract_date, self.rules.sign_diff_days)?;
        let seal_date = self.seal_date(contract_date)?;
        let tax_payment_date = self.tax_payment_date(seal_date, kind)?;
        let handover_date = self.handover_date(tax_payment_date)?;

        tracing::debug!(
            contract = %contract_date,
            %kind,
            seal = %seal_date,
            tax = %tax_payment_date,
            handover = %handover_date,
            "scheduled milestones"
        );

        Ok(ScheduledMilestones {
            sign_diff_date,
            seal_date,
            tax_payment_date,
            handover_date,
            redemption_date: None,
        })
    }

    /// Compute every milestone from contract date text.
    ///
    /// Returns `InvalidDate` without partial output when the text is not a date.
    pub fn schedule_str(
        &self,
        contract_date: &str,
        kind: CaseKind,
    ) -> Result<ScheduledMilestones, CasetrackError> {
        let contract_date = calendar::parse_date(contract_date)?;
        self.schedule(contract_date, kind)
    }

    /// Rule 2.
    pub fn seal_date(&self, contract_date: NaiveDate) -> Result<NaiveDate, CasetrackError> {
        let base = calendar::add_months(contract_date, self.rules.seal_offset_months)?;
        calendar::next_wednesday_or_friday(base)
    }

    /// Rule 3.
    pub fn tax_payment_date(
        &self,
        seal_date: NaiveDate,
        kind: CaseKind,
    ) -> Result<NaiveDate, CasetrackError> {
        let base = calendar::add_weeks(seal_date, self.rules.tax_weeks(kind))?;
        calendar::next_wednesday_or_friday(base)
    }

    /// Rule 4: window search, then fallback.
    pub fn handover_date(&self, tax_payment_date: NaiveDate) -> Result<NaiveDate, CasetrackError> {
        let candidates = self.handover_candidates(tax_payment_date)?;
        match pick_handover(&candidates) {
            Some(date) => Ok(date),
            None => {
                tracing::debug!(tax = %tax_payment_date, "no handover candidate in window, using fallback");
                self.fallback_handover(tax_payment_date)
            }
        }
    }

    /// Rule 4a-b: qualifying days in the handover window, ascending.
    pub fn handover_candidates(
        &self,
        tax_payment_date: NaiveDate,
    ) -> Result<Vec<NaiveDate>, CasetrackError> {
        let start = calendar::add_days(tax_payment_date, self.rules.handover_window_start_days)?;
        let end = calendar::add_days(tax_payment_date, self.rules.handover_window_end_days)?;

        Ok(start
            .iter_days()
            .take_while(|day| *day <= end)
            .filter(|day| is_handover_candidate(*day))
            .collect())
    }

    /// Rule 4d: target day walked backward past weekends.
    pub fn fallback_handover(&self, tax_payment_date: NaiveDate) -> Result<NaiveDate, CasetrackError> {
        let target = calendar::add_days(tax_payment_date, self.rules.handover_fallback_days)?;
        calendar::previous_weekday_on_or_before(target)
    }
}

/// A weekday that is a Friday or the day before month end.
fn is_handover_candidate(day: NaiveDate) -> bool {
    !calendar::is_weekend(day)
        && (day.weekday() == Weekday::Fri || calendar::is_day_before_month_end(day))
}

/// Rule 4c: first Friday, else earliest candidate.
fn pick_handover(candidates: &[NaiveDate]) -> Option<NaiveDate> {
    candidates
        .iter()
        .find(|day| day.weekday() == Weekday::Fri)
        .or_else(|| candidates.first())
        .copied()
}

/// Schedule with the default rules from contract date text.
pub fn schedule_milestones(
    contract_date: &str,
    kind: CaseKind,
) -> Result<ScheduledMilestones, CasetrackError> {
    MilestoneScheduler::new().schedule_str(contract_date, kind)
}

// =============================================================================
// TESTS
// =============================================================================
