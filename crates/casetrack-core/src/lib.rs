//! # casetrack-core
//!
//! The deterministic date-rule engine for case tracking - THE RULES.
//!
//! A real-estate transaction case moves through a fixed pipeline:
//! contract (簽約) → seal (用印) → tax payment (完稅) → transfer (過戶) →
//! handover (交屋) → closed (結案). This crate holds the two pieces of logic
//! that reason about that pipeline:
//!
//! - **Stage Classifier** (`system`): derives the active stage of a case
//!   from its optional milestone dates and a reference date.
//! - **Milestone Scheduler** (`scheduler`): computes the seal, tax payment and
//!   handover targets from a contract date and a case kind.
//!
//! ## Architectural Constraints
//!
//! - Pure: no I/O, no async, no shared state
//! - Deterministic: the clock is never read; "today" is always an argument
//! - Calendar dates only: no timezones
//! - Persistence and display belong to the caller

// =============================================================================
// MODULES
// =============================================================================

pub mod calendar;
pub mod formats;
pub mod primitives;
pub mod scheduler;
pub mod system;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{CaseKind, CasetrackError, MilestoneDate, MilestoneRecord, ScheduledMilestones};

// =============================================================================
// RE-EXPORTS: Rules
// =============================================================================

pub use scheduler::{MilestoneScheduler, ScheduleRules, schedule_milestones};
pub use system::{PipelineStage, StageAssessment, StageBasis, StageClassifier, derive_stage};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{CaseMilestones, StageReport, classify_all, records_from_json};
