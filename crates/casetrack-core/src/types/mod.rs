//! # Core Type Definitions
//!
//! This module contains the value types exchanged with the surrounding application:
//! - Milestone inputs (`MilestoneDate`, `MilestoneRecord`)
//! - Scheduler inputs and outputs (`CaseKind`, `ScheduledMilestones`)
//! - Error types (`CasetrackError`)
//!
//! ## Boundary Rules
//!
//! Malformed dates are normalized at the parsing boundary: a field that cannot
//! be read as a calendar date becomes [`MilestoneDate::Invalid`] and is treated
//! as absent by every rule. Nothing in this module reads the clock.

use crate::calendar;
use crate::system::PipelineStage;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// MILESTONE DATE
// =============================================================================

/// A single milestone field as it arrives from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum MilestoneDate {
    /// No date recorded.
    #[default]
    Absent,
    /// Something was recorded but it is not a calendar date. Raw text kept for diagnostics.
    Invalid(String),
    /// A valid calendar date.
    Present(NaiveDate),
}

impl MilestoneDate {
    /// Normalize raw text. Blank text is `Absent`, unreadable text is `Invalid`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::Absent;
        }
        match calendar::parse_date(raw) {
            Ok(date) => Self::Present(date),
            Err(_) => Self::Invalid(raw.to_string()),
        }
    }

    /// The date, if one is present and valid.
    #[inline]
    #[must_use]
    pub fn valid(&self) -> Option<NaiveDate> {
        match self {
            Self::Present(date) => Some(*date),
            Self::Absent | Self::Invalid(_) => None,
        }
    }

    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

impl From<NaiveDate> for MilestoneDate {
    fn from(date: NaiveDate) -> Self {
        Self::Present(date)
    }
}

impl From<Option<NaiveDate>> for MilestoneDate {
    fn from(date: Option<NaiveDate>) -> Self {
        date.map_or(Self::Absent, Self::Present)
    }
}

impl Serialize for MilestoneDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Absent => serializer.serialize_none(),
            Self::Invalid(raw) => serializer.serialize_str(raw),
            Self::Present(date) => serializer.serialize_str(&calendar::format_date(*date)),
        }
    }
}

impl<'de> Deserialize<'de> for MilestoneDate {
    /// Never fails on content: any non-string, non-null value is kept as `Invalid`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match raw {
            None | Some(serde_json::Value::Null) => Self::Absent,
            Some(serde_json::Value::String(text)) => Self::parse(&text),
            Some(other) => Self::Invalid(other.to_string()),
        })
    }
}

// =============================================================================
// MILESTONE RECORD
// =============================================================================

/// The milestone row of one case. Every field is independently optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MilestoneRecord {
    #[serde(default)]
    pub contract_date: MilestoneDate,
    #[serde(default)]
    pub seal_date: MilestoneDate,
    #[serde(default)]
    pub tax_payment_date: MilestoneDate,
    #[serde(default)]
    pub transfer_date: MilestoneDate,
    #[serde(default)]
    pub handover_date: MilestoneDate,
}

impl MilestoneRecord {
    /// Create a record with every field absent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for a single stage's field.
    ///
    /// `Closed` has no date of its own and is ignored.
    #[must_use]
    pub fn with(mut self, stage: PipelineStage, date: impl Into<MilestoneDate>) -> Self {
        let value = date.into();
        match stage {
            PipelineStage::Contract => self.contract_date = value,
            PipelineStage::Seal => self.seal_date = value,
            PipelineStage::Tax => self.tax_payment_date = value,
            PipelineStage::Transfer => self.transfer_date = value,
            PipelineStage::Handover => self.handover_date = value,
            PipelineStage::Closed => {}
        }
        self
    }

    /// The `(stage, field)` pairs in pipeline order.
    #[must_use]
    pub fn milestones(&self) -> [(PipelineStage, &MilestoneDate); 5] {
        [
            (PipelineStage::Contract, &self.contract_date),
            (PipelineStage::Seal, &self.seal_date),
            (PipelineStage::Tax, &self.tax_payment_date),
            (PipelineStage::Transfer, &self.transfer_date),
            (PipelineStage::Handover, &self.handover_date),
        ]
    }

    /// Stages whose field holds unreadable text.
    #[must_use]
    pub fn invalid_fields(&self) -> Vec<(PipelineStage, &str)> {
        self.milestones()
            .into_iter()
            .filter_map(|(stage, field)| match field {
                MilestoneDate::Invalid(raw) => Some((stage, raw.as_str())),
                _ => None,
            })
            .collect()
    }

    /// True when no field holds a valid date.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.milestones()
            .iter()
            .all(|(_, field)| field.valid().is_none())
    }
}

// =============================================================================
// CASE KIND
// =============================================================================

/// Case classification that sets the seal → tax gap.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CaseKind {
    /// 一般 case: two weeks from seal to tax payment.
    #[default]
    Standard,
    /// 自用 case: three weeks from seal to tax payment.
    SelfUse,
}

impl CaseKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseKind::Standard => "standard",
            CaseKind::SelfUse => "self_use",
        }
    }
}

impl fmt::Display for CaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseKind {
    type Err = CasetrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "normal" => Ok(CaseKind::Standard),
            "self_use" | "self-use" | "selfuse" => Ok(CaseKind::SelfUse),
            _ => Err(CasetrackError::InvalidCaseKind(s.to_string())),
        }
    }
}

// =============================================================================
// SCHEDULED MILESTONES
// =============================================================================

/// Target dates computed from a contract date. Transient; the caller decides
/// whether to persist them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledMilestones {
    pub sign_diff_date: NaiveDate,
    pub seal_date: NaiveDate,
    pub tax_payment_date: NaiveDate,
    pub handover_date: NaiveDate,
    /// 代償 date. No rule exists for it, so the scheduler always leaves it unset.
    pub redemption_date: Option<NaiveDate>,
}

impl ScheduledMilestones {
    /// Named dates in schedule order, for display.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, NaiveDate); 4] {
        [
            ("sign_diff_date", self.sign_diff_date),
            ("seal_date", self.seal_date),
            ("tax_payment_date", self.tax_payment_date),
            ("handover_date", self.handover_date),
        ]
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in casetrack.
///
/// - The engine never panics
/// - Malformed milestone fields are NOT errors; they are normalized to `Invalid`
#[derive(Debug, Error)]
pub enum CasetrackError {
    /// A date could not be parsed or left the representable calendar range.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Unknown case kind text.
    #[error("Invalid case kind: {0}")]
    InvalidCaseKind(String),

    /// A custom scheduling rule set is inconsistent.
    #[error("Invalid schedule rules: {0}")]
    InvalidRules(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// The configuration file could not be read or is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
    }

    #[test]
    fn milestone_date_tri_state() {
        assert_eq!(MilestoneDate::parse(""), MilestoneDate::Absent);
        assert_eq!(MilestoneDate::parse("   "), MilestoneDate::Absent);
        assert_eq!(
            MilestoneDate::parse("2026-01-05"),
            MilestoneDate::Present(d("2026-01-05"))
        );
        assert_eq!(
            MilestoneDate::parse("soon"),
            MilestoneDate::Invalid("soon".to_string())
        );
        assert_eq!(MilestoneDate::parse("soon").valid(), None);
    }

    #[test]
    fn record_deserializes_loose_fields() {
        let json = r#"{
            "contract_date": "2026-01-05",
            "seal_date": null,
            "tax_payment_date": "garbage",
            "transfer_date": 20260301
        }"#;
        let record: MilestoneRecord = serde_json::from_str(json).expect("parse");

        assert_eq!(record.contract_date.valid(), Some(d("2026-01-05")));
        assert_eq!(record.seal_date, MilestoneDate::Absent);
        assert!(record.tax_payment_date.is_invalid());
        assert!(record.transfer_date.is_invalid());
        assert_eq!(record.handover_date, MilestoneDate::Absent);
        assert_eq!(record.invalid_fields().len(), 2);
    }

    #[test]
    fn record_serializes_canonical_dates() {
        let record = MilestoneRecord::new()
            .with(PipelineStage::Contract, d("2026-01-05"))
            .with(PipelineStage::Seal, MilestoneDate::Invalid("x".into()));
        let json = serde_json::to_value(&record).expect("serialize");

        assert_eq!(json["contract_date"], "2026-01-05");
        assert_eq!(json["seal_date"], "x");
        assert!(json["handover_date"].is_null());
    }

    #[test]
    fn empty_record() {
        assert!(MilestoneRecord::new().is_empty());
        let only_invalid = MilestoneRecord::new().with(PipelineStage::Tax, MilestoneDate::parse("?"));
        assert!(only_invalid.is_empty());
    }

    #[test]
    fn case_kind_parsing() {
        assert_eq!("standard".parse::<CaseKind>().expect("std"), CaseKind::Standard);
        assert_eq!("Self-Use".parse::<CaseKind>().expect("self"), CaseKind::SelfUse);
        assert_eq!("self_use".parse::<CaseKind>().expect("self"), CaseKind::SelfUse);
        assert!(matches!(
            "investment".parse::<CaseKind>(),
            Err(CasetrackError::InvalidCaseKind(_))
        ));
    }

    #[test]
    fn case_kind_serde_names() {
        assert_eq!(
            serde_json::to_string(&CaseKind::SelfUse).expect("ser"),
            "\"self_use\""
        );
    }

    #[test]
    fn scheduled_milestones_serialize_as_text_dates() {
        let scheduled = ScheduledMilestones {
            sign_diff_date: d("2026-03-05"),
            seal_date: d("2026-05-06"),
            tax_payment_date: d("2026-05-20"),
            handover_date: d("2026-05-29"),
            redemption_date: None,
        };
        let json = serde_json::to_value(&scheduled).expect("ser");

        assert_eq!(json["sign_diff_date"], "2026-03-05");
        assert_eq!(json["handover_date"], "2026-05-29");
        assert!(json["redemption_date"].is_null());
    }
}
