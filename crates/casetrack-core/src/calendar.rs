//! # Calendar Rules
//!
//! Local calendar-date helpers used by the scheduler and the classifier.
//!
//! Everything here works on [`NaiveDate`]: there is no time of day, no
//! timezone and no clock. Arithmetic is checked; leaving chrono's supported
//! range surfaces as [`CasetrackError::InvalidDate`] instead of panicking.

use crate::CasetrackError;
use crate::primitives::DATE_FORMAT;
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, Weekday};

/// Timestamp layouts accepted in addition to plain `YYYY-MM-DD`.
///
/// Only the date part is kept.
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

// =============================================================================
// PARSING & FORMATTING
// =============================================================================

/// Parse a calendar date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS`
/// timestamps. Surrounding whitespace is ignored.
pub fn parse_date(input: &str) -> Result<NaiveDate, CasetrackError> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Ok(date);
    }

    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(stamp.date_naive());
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|stamp| stamp.date())
        .ok_or_else(|| CasetrackError::InvalidDate(input.to_string()))
}

/// Format a date in the canonical `YYYY-MM-DD` interchange form.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// =============================================================================
// WEEKDAY PREDICATES
// =============================================================================

/// Saturday or Sunday.
#[inline]
#[must_use]
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Wednesday or Friday, the days the seal office takes appointments.
#[inline]
#[must_use]
pub fn is_wed_or_fri(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Wed | Weekday::Fri)
}

/// Move forward to the nearest Wednesday or Friday.
///
/// A date already on a Wednesday or Friday is returned unchanged.
pub fn next_wednesday_or_friday(date: NaiveDate) -> Result<NaiveDate, CasetrackError> {
    let shift = match date.weekday() {
        Weekday::Wed | Weekday::Fri => 0,
        Weekday::Tue | Weekday::Thu => 1,
        Weekday::Mon => 2,
        Weekday::Sun => 3,
        Weekday::Sat => 4,
    };
    add_days(date, shift)
}

/// Walk backward one day at a time until a weekday is reached.
///
/// Weekdays are returned unchanged. Never moves forward.
pub fn previous_weekday_on_or_before(date: NaiveDate) -> Result<NaiveDate, CasetrackError> {
    let mut current = date;
    while is_weekend(current) {
        current = current
            .pred_opt()
            .ok_or_else(|| CasetrackError::InvalidDate(format_date(date)))?;
    }
    Ok(current)
}

// =============================================================================
// MONTH BOUNDARIES
// =============================================================================

/// Last calendar day of the month containing `date`.
pub fn last_day_of_month(date: NaiveDate) -> Result<NaiveDate, CasetrackError> {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next_first| next_first.pred_opt())
        .ok_or_else(|| CasetrackError::InvalidDate(format_date(date)))
}

/// Whether `date` is the day immediately before the last day of its month.
///
/// Dates at the edge of chrono's range are never considered a match.
#[must_use]
pub fn is_day_before_month_end(date: NaiveDate) -> bool {
    match (date.succ_opt(), last_day_of_month(date)) {
        (Some(next), Ok(last)) => next == last,
        _ => false,
    }
}

// =============================================================================
// ARITHMETIC
// =============================================================================

/// Add plain calendar days.
pub fn add_days(date: NaiveDate, days: u32) -> Result<NaiveDate, CasetrackError> {
    date.checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| CasetrackError::InvalidDate(format_date(date)))
}

/// Add calendar months.
///
/// A day that does not exist in the target month clamps to that month's
/// last day (Dec 31 + 2 months = Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate, CasetrackError> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| CasetrackError::InvalidDate(format_date(date)))
}

/// Add whole weeks.
pub fn add_weeks(date: NaiveDate, weeks: u32) -> Result<NaiveDate, CasetrackError> {
    let days = weeks
        .checked_mul(7)
        .ok_or_else(|| CasetrackError::InvalidDate(format_date(date)))?;
    add_days(date, days)
}
