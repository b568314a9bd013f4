//! # Interchange Format
//!
//! JSON shapes accepted and produced at the application boundary.
//!
//! Input is either a bare milestone object or an array of cases:
//!
//! ```json
//! [
//!   { "case_id": "A-102", "milestones": { "contract_date": "2026-03-02", "seal_date": null } },
//!   { "case_id": "A-103", "milestones": null }
//! ]
//! ```
//!
//! A `null` or missing `milestones` is a case with no milestone row.
//!
//! ## Limits
//!
//! Payload size and record count are checked BEFORE deserializing records.

use crate::primitives::MAX_RECORDS;
use crate::system::{PipelineStage, StageAssessment, StageBasis, StageClassifier};
use crate::{CasetrackError, MilestoneRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum accepted JSON payload (10 MiB).
pub const MAX_INTERCHANGE_PAYLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Case id given to a bare milestone object.
pub const ANONYMOUS_CASE_ID: &str = "-";

// =============================================================================
// INPUT
// =============================================================================

/// One case and its (possibly missing) milestone row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseMilestones {
    pub case_id: String,
    #[serde(default)]
    pub milestones: Option<MilestoneRecord>,
}

impl CaseMilestones {
    #[must_use]
    pub fn new(case_id: impl Into<String>, milestones: Option<MilestoneRecord>) -> Self {
        Self {
            case_id: case_id.into(),
            milestones,
        }
    }
}

/// Parse case records from JSON bytes.
///
/// Accepts an array of cases, a single case object, or a bare milestone object.
pub fn records_from_json(bytes: &[u8]) -> Result<Vec<CaseMilestones>, CasetrackError> {
    if bytes.len() > MAX_INTERCHANGE_PAYLOAD_SIZE {
        return Err(CasetrackError::DeserializationError(format!(
            "Payload size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_INTERCHANGE_PAYLOAD_SIZE
        )));
    }

    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| CasetrackError::DeserializationError(format!("Invalid JSON: {}", e)))?;

    let value = match value {
        serde_json::Value::Array(items) => {
            if items.len() > MAX_RECORDS {
                return Err(CasetrackError::DeserializationError(format!(
                    "Record count {} exceeds maximum allowed {}",
                    items.len(),
                    MAX_RECORDS
                )));
            }
            return items
                .into_iter()
                .map(|item| {
                    serde_json::from_value(item).map_err(|e| {
                        CasetrackError::DeserializationError(format!("Invalid case record: {}", e))
                    })
                })
                .collect();
        }
        object @ serde_json::Value::Object(_) => object,
        _ => {
            return Err(CasetrackError::DeserializationError(
                "Expected a JSON object or array".to_string(),
            ));
        }
    };

    if value.get("case_id").is_some() {
        let case = serde_json::from_value(value).map_err(|e| {
            CasetrackError::DeserializationError(format!("Invalid case record: {}", e))
        })?;
        return Ok(vec![case]);
    }

    let record: MilestoneRecord = serde_json::from_value(value).map_err(|e| {
        CasetrackError::DeserializationError(format!("Invalid milestone record: {}", e))
    })?;
    Ok(vec![CaseMilestones::new(ANONYMOUS_CASE_ID, Some(record))])
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Classification result for one case, as printed by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub case_id: String,
    pub stage: PipelineStage,
    pub label: String,
    pub next: Option<PipelineStage>,
    pub basis: StageBasis,
    /// Milestone fields that were skipped because they are not dates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_fields: Vec<String>,
}

impl StageReport {
    /// Classify one case.
    #[must_use]
    pub fn build(case: &CaseMilestones, today: NaiveDate) -> Self {
        let StageAssessment { stage, next, basis } =
            StageClassifier::assess(case.milestones.as_ref(), today);

        let invalid_fields = case
            .milestones
            .as_ref()
            .map(|record| {
                record
                    .invalid_fields()
                    .into_iter()
                    .filter_map(|(stage, _)| stage.milestone_field())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            case_id: case.case_id.clone(),
            stage,
            label: stage.label().to_string(),
            next,
            basis,
            invalid_fields,
        }
    }
}

/// Classify every case against the same reference date.
#[must_use]
pub fn classify_all(cases: &[CaseMilestones], today: NaiveDate) -> Vec<StageReport> {
    cases
        .iter()
        .map(|case| StageReport::build(case, today))
        .collect()
}

/// Serialize any output value as pretty JSON.
pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String, CasetrackError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CasetrackError::SerializationError(e.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================
