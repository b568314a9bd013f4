//! # Stage Classification
//!
//! Derives the single active pipeline stage of a case from its milestone dates.
//!
//! ## Pipeline
//!
//! | Stage | Label | Milestone field |
//! |-------|-------|-----------------|
//! | Contract | 簽約 | `contract_date` |
//! | Seal | 用印 | `seal_date` |
//! | Tax | 完稅 | `tax_payment_date` |
//! | Transfer | 過戶 | `transfer_date` |
//! | Handover | 交屋 | `handover_date` |
//! | Closed | 結案 | (none) |
//!
//! ## Rule
//!
//! 1. The earliest milestone dated today or later wins ("next thing due"),
//!    even if earlier stages have no date at all.
//! 2. With nothing upcoming, the latest completed milestone decides, and the
//!    case sits in the stage after it (`handover_date` done means `Closed`).
//! 3. With nothing at all, the case is in `Contract`.
//!
//! "Today" is always a parameter. Unreadable fields are skipped.

use crate::{CasetrackError, MilestoneDate, MilestoneRecord};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// =============================================================================
// STAGE ENUM
// =============================================================================

/// Pipeline stages in order. `Contract < Seal < ... < Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// 簽約: contract signing
    Contract,
    /// 用印: contract documents sealed
    Seal,
    /// 完稅: transfer taxes paid
    Tax,
    /// 過戶: title transfer registered
    Transfer,
    /// 交屋: property handed over
    Handover,
    /// 結案: case closed
    Closed,
}

impl PipelineStage {
    /// Every stage, in pipeline order.
    pub const ALL: [PipelineStage; 6] = [
        PipelineStage::Contract,
        PipelineStage::Seal,
        PipelineStage::Tax,
        PipelineStage::Transfer,
        PipelineStage::Handover,
        PipelineStage::Closed,
    ];

    /// Get the stage name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PipelineStage::Contract => "Contract",
            PipelineStage::Seal => "Seal",
            PipelineStage::Tax => "Tax",
            PipelineStage::Transfer => "Transfer",
            PipelineStage::Handover => "Handover",
            PipelineStage::Closed => "Closed",
        }
    }

    /// Get the label used on the office board.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::Contract => "簽約",
            PipelineStage::Seal => "用印",
            PipelineStage::Tax => "完稅",
            PipelineStage::Transfer => "過戶",
            PipelineStage::Handover => "交屋",
            PipelineStage::Closed => "結案",
        }
    }

    /// Snake-case key, as used in JSON.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            PipelineStage::Contract => "contract",
            PipelineStage::Seal => "seal",
            PipelineStage::Tax => "tax",
            PipelineStage::Transfer => "transfer",
            PipelineStage::Handover => "handover",
            PipelineStage::Closed => "closed",
        }
    }

    /// Name of the milestone field that dates this stage.
    #[must_use]
    pub fn milestone_field(&self) -> Option<&'static str> {
        match self {
            PipelineStage::Contract => Some("contract_date"),
            PipelineStage::Seal => Some("seal_date"),
            PipelineStage::Tax => Some("tax_payment_date"),
            PipelineStage::Transfer => Some("transfer_date"),
            PipelineStage::Handover => Some("handover_date"),
            PipelineStage::Closed => None,
        }
    }

    /// Get the next stage, if any.
    #[must_use]
    pub fn next(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Contract => Some(PipelineStage::Seal),
            PipelineStage::Seal => Some(PipelineStage::Tax),
            PipelineStage::Tax => Some(PipelineStage::Transfer),
            PipelineStage::Transfer => Some(PipelineStage::Handover),
            PipelineStage::Handover => Some(PipelineStage::Closed),
            PipelineStage::Closed => None,
        }
    }

    /// Get the previous stage, if any.
    #[must_use]
    pub fn previous(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Contract => None,
            PipelineStage::Seal => Some(PipelineStage::Contract),
            PipelineStage::Tax => Some(PipelineStage::Seal),
            PipelineStage::Transfer => Some(PipelineStage::Tax),
            PipelineStage::Handover => Some(PipelineStage::Transfer),
            PipelineStage::Closed => Some(PipelineStage::Handover),
        }
    }

    /// Check if this stage is terminal (Closed).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Closed)
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.label())
    }
}

impl FromStr for PipelineStage {
    type Err = CasetrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PipelineStage::ALL
            .into_iter()
            .find(|stage| {
                stage.key().eq_ignore_ascii_case(wanted) || stage.label() == wanted
            })
            .ok_or_else(|| CasetrackError::DeserializationError(format!("unknown stage: {}", s)))
    }
}

// =============================================================================
// ASSESSMENT
// =============================================================================

/// Why a stage was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageBasis {
    /// The case has no milestone row.
    NoRecord,
    /// The earliest milestone dated today or later.
    Upcoming {
        milestone: PipelineStage,
        date: NaiveDate,
        days_until: i64,
    },
    /// The latest completed milestone in the fallback cascade.
    Completed {
        milestone: PipelineStage,
        date: NaiveDate,
    },
    /// A milestone row exists but holds no usable date.
    NotStarted,
}

/// A classified stage together with the reason for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageAssessment {
    pub stage: PipelineStage,
    pub next: Option<PipelineStage>,
    pub basis: StageBasis,
}

impl StageAssessment {
    fn new(stage: PipelineStage, basis: StageBasis) -> Self {
        Self {
            stage,
            next: stage.next(),
            basis,
        }
    }
}

// =============================================================================
// STAGE CLASSIFIER
// =============================================================================

/// Stage Classifier - pure functions over a milestone record and a reference date.
pub struct StageClassifier;

impl StageClassifier {
    /// Derive the current stage.
    ///
    /// `record = None` means the case has no milestone row at all.
    #[must_use]
    pub fn derive_stage(record: Option<&MilestoneRecord>, today: NaiveDate) -> PipelineStage {
        Self::assess(record, today).stage
    }

    /// Derive the current stage from a timestamp. Time of day is ignored.
    #[must_use]
    pub fn derive_stage_at(record: Option<&MilestoneRecord>, now: NaiveDateTime) -> PipelineStage {
        Self::derive_stage(record, now.date())
    }

    /// Derive the current stage and explain it.
    #[must_use]
    pub fn assess(record: Option<&MilestoneRecord>, today: NaiveDate) -> StageAssessment {
        let Some(record) = record else {
            return StageAssessment::new(PipelineStage::Contract, StageBasis::NoRecord);
        };

        for (stage, raw) in record.invalid_fields() {
            tracing::warn!(
                field = stage.milestone_field().unwrap_or_default(),
                value = raw,
                "ignoring unreadable milestone date"
            );
        }

        if let Some((milestone, date)) = Self::next_due(record, today) {
            let days_until = date.signed_duration_since(today).num_days();
            return StageAssessment::new(
                milestone,
                StageBasis::Upcoming {
                    milestone,
                    date,
                    days_until,
                },
            );
        }

        match Self::last_completed(record, today) {
            Some((milestone, date)) => {
                // Completing a step puts the case into the following stage.
                let stage = milestone.next().unwrap_or(PipelineStage::Closed);
                StageAssessment::new(stage, StageBasis::Completed { milestone, date })
            }
            None => StageAssessment::new(PipelineStage::Contract, StageBasis::NotStarted),
        }
    }

    /// Earliest milestone dated today or later. Ties go to the earlier stage.
    fn next_due(record: &MilestoneRecord, today: NaiveDate) -> Option<(PipelineStage, NaiveDate)> {
        record
            .milestones()
            .into_iter()
            .filter_map(|(stage, field)| field.valid().map(|date| (stage, date)))
            .filter(|(_, date)| *date >= today)
            .min_by_key(|(_, date)| *date)
    }

    /// Completed-step cascade, checked from the end of the pipeline backward.
    fn last_completed(
        record: &MilestoneRecord,
        today: NaiveDate,
    ) -> Option<(PipelineStage, NaiveDate)> {
        let completed = |field: &MilestoneDate| field.valid().filter(|date| *date < today);

        record
            .milestones()
            .into_iter()
            .rev()
            .find_map(|(stage, field)| completed(field).map(|date| (stage, date)))
    }
}

/// Derive the current stage of a case. See [`StageClassifier::derive_stage`].
#[must_use]
pub fn derive_stage(record: Option<&MilestoneRecord>, today: NaiveDate) -> PipelineStage {
    StageClassifier::derive_stage(record, today)
}

// =============================================================================
// TESTS
// =============================================================================
