//! # Validation Tier Tests (T0-T3)
//!
//! If ANY tier fails, the rule engine is INVALID.
//!
//! ## Tiers
//! - T0: Input Integrity
//! - T1: Scheduling Rules
//! - T2: Stage Classification
//! - T3: End-to-End Case Flow

use casetrack_core::{
    CaseKind, CasetrackError, MilestoneDate, MilestoneRecord, MilestoneScheduler, PipelineStage,
    StageBasis, StageClassifier, derive_stage, schedule_milestones,
};
use chrono::NaiveDate;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
}

// =============================================================================
// TIER T0: INPUT INTEGRITY
// =============================================================================

mod t0_input_integrity {
    use super::*;

    /// T0.1: Canonical dates parse to themselves.
    #[test]
    fn canonical_dates_accepted() {
        assert_eq!(MilestoneDate::parse("2026-03-02").valid(), Some(d("2026-03-02")));
    }

    /// T0.2: Impossible calendar dates become Invalid, not errors.
    #[test]
    fn impossible_dates_are_invalid() {
        for raw in ["2026-02-29", "2026-00-10", "2026-1-5x", "yesterday"] {
            let field = MilestoneDate::parse(raw);
            assert!(field.is_invalid(), "{}", raw);
            assert_eq!(field.valid(), None);
        }
    }

    /// T0.3: The scheduler rejects unreadable contract dates.
    #[test]
    fn scheduler_rejects_unreadable_contract() {
        let result = schedule_milestones("2026/03/02", CaseKind::Standard);
        assert!(matches!(result, Err(CasetrackError::InvalidDate(ref raw)) if raw == "2026/03/02"));
    }

    /// T0.4: Record parsing never fails on field content.
    #[test]
    fn record_parsing_is_lenient() {
        let json = r#"{"contract_date": 0, "seal_date": "", "tax_payment_date": "2026-04-31"}"#;
        let record: MilestoneRecord = serde_json::from_str(json).expect("lenient");

        assert!(record.contract_date.is_invalid());
        assert_eq!(record.seal_date, MilestoneDate::Absent);
        assert!(record.tax_payment_date.is_invalid());
    }
}

// =============================================================================
// TIER T1: SCHEDULING RULES
// =============================================================================

mod t1_scheduling_rules {
    use super::*;

    /// T1.1: Sign-difference is contract + 3 days.
    #[test]
    fn sign_diff_from_monday() {
        let scheduled = schedule_milestones("2026-01-05", CaseKind::Standard).expect("schedule");
        assert_eq!(scheduled.sign_diff_date, d("2026-01-08"));
    }

    /// T1.2: A seal base already on Wednesday is kept.
    #[test]
    fn seal_kept_on_wednesday() {
        // 2026-03-04 + 2 months = 2026-05-04 (Mon) -> Wed 05-06
        // 2026-03-06 + 2 months = 2026-05-06 (Wed) -> unchanged
        let scheduler = MilestoneScheduler::new();
        assert_eq!(scheduler.seal_date(d("2026-03-04")).expect("seal"), d("2026-05-06"));
        assert_eq!(scheduler.seal_date(d("2026-03-06")).expect("seal"), d("2026-05-06"));
    }

    /// T1.3: Tax gap depends on case kind.
    #[test]
    fn tax_gap_by_kind() {
        let scheduler = MilestoneScheduler::new();
        let seal = d("2026-05-06");

        assert_eq!(
            scheduler.tax_payment_date(seal, CaseKind::Standard).expect("tax"),
            d("2026-05-20")
        );
        assert_eq!(
            scheduler.tax_payment_date(seal, CaseKind::SelfUse).expect("tax"),
            d("2026-05-27")
        );
    }

    /// T1.4: Handover from a Wednesday tax payment is the Friday 9 days later.
    #[test]
    fn handover_from_wednesday() {
        let scheduler = MilestoneScheduler::new();
        assert_eq!(scheduler.handover_date(d("2026-05-20")).expect("handover"), d("2026-05-29"));
    }

    /// T1.5: Handover from a Friday tax payment is the next Friday.
    #[test]
    fn handover_from_friday() {
        let scheduler = MilestoneScheduler::new();
        assert_eq!(scheduler.handover_date(d("2026-03-20")).expect("handover"), d("2026-03-27"));
    }

    /// T1.6: Redemption is never scheduled.
    #[test]
    fn redemption_left_unset() {
        for kind in [CaseKind::Standard, CaseKind::SelfUse] {
            let scheduled = schedule_milestones("2026-07-15", kind).expect("schedule");
            assert_eq!(scheduled.redemption_date, None);
        }
    }
}

// =============================================================================
// TIER T2: STAGE CLASSIFICATION
// =============================================================================

mod t2_stage_classification {
    use super::*;

    const TODAY: &str = "2026-06-10";

    /// T2.1: Skip-ahead to the next due milestone.
    #[test]
    fn skip_ahead_to_tax() {
        let record = MilestoneRecord::new().with(PipelineStage::Tax, d("2026-06-12"));
        assert_eq!(derive_stage(Some(&record), d(TODAY)), PipelineStage::Tax);
    }

    /// T2.2: A past handover closes the case.
    #[test]
    fn past_handover_closes() {
        let record = MilestoneRecord::new()
            .with(PipelineStage::Contract, d("2026-01-05"))
            .with(PipelineStage::Handover, d("2026-06-09"));
        assert_eq!(derive_stage(Some(&record), d(TODAY)), PipelineStage::Closed);
    }

    /// T2.3: A handover due today is still Handover, not Closed.
    #[test]
    fn handover_today_is_not_closed() {
        let record = MilestoneRecord::new().with(PipelineStage::Handover, d(TODAY));
        assert_eq!(derive_stage(Some(&record), d(TODAY)), PipelineStage::Handover);
    }

    /// T2.4: One bad field does not disturb the others.
    #[test]
    fn bad_field_isolated() {
        let good = MilestoneRecord::new()
            .with(PipelineStage::Contract, d("2026-04-01"))
            .with(PipelineStage::Seal, d("2026-06-12"));
        let with_bad = good
            .clone()
            .with(PipelineStage::Transfer, MilestoneDate::parse("2026-13-01"));

        assert_eq!(
            derive_stage(Some(&good), d(TODAY)),
            derive_stage(Some(&with_bad), d(TODAY))
        );
    }

    /// T2.5: Concurrent callers with different reference dates do not interfere.
    #[test]
    fn injected_dates_are_isolated() {
        let record = MilestoneRecord::new().with(PipelineStage::Seal, d("2026-06-12"));

        let handles: Vec<_> = [("2026-06-01", PipelineStage::Seal), ("2026-07-01", PipelineStage::Tax)]
            .into_iter()
            .map(|(today, expected)| {
                let record = record.clone();
                std::thread::spawn(move || (derive_stage(Some(&record), d(today)), expected))
            })
            .collect();

        for handle in handles {
            let (got, expected) = handle.join().expect("thread");
            assert_eq!(got, expected);
        }
    }
}

// =============================================================================
// TIER T3: END-TO-END CASE FLOW
// =============================================================================

mod t3_end_to_end {
    use super::*;

    /// T3.1: Contract 2026-03-02 (Mon), standard case.
    #[test]
    fn standard_case_schedule() {
        let scheduled = schedule_milestones("2026-03-02", CaseKind::Standard).expect("schedule");

        assert_eq!(scheduled.sign_diff_date, d("2026-03-05"));
        // 2026-05-02 is a Saturday
        assert_eq!(scheduled.seal_date, d("2026-05-06"));
        assert_eq!(scheduled.tax_payment_date, d("2026-05-20"));
        assert_eq!(scheduled.handover_date, d("2026-05-29"));
    }

    /// T3.2: Scheduled dates walk the case through every stage.
    #[test]
    fn scheduled_case_walks_pipeline() {
        let scheduled = schedule_milestones("2026-03-02", CaseKind::Standard).expect("schedule");
        let record = MilestoneRecord::new()
            .with(PipelineStage::Contract, d("2026-03-02"))
            .with(PipelineStage::Seal, scheduled.seal_date)
            .with(PipelineStage::Tax, scheduled.tax_payment_date)
            .with(PipelineStage::Handover, scheduled.handover_date);

        let checkpoints = [
            ("2026-03-01", PipelineStage::Contract),
            ("2026-03-02", PipelineStage::Contract),
            ("2026-03-03", PipelineStage::Seal),
            ("2026-05-07", PipelineStage::Tax),
            ("2026-05-21", PipelineStage::Handover),
            ("2026-05-29", PipelineStage::Handover),
            ("2026-05-30", PipelineStage::Closed),
        ];
        for (today, expected) in checkpoints {
            assert_eq!(derive_stage(Some(&record), d(today)), expected, "on {}", today);
        }
    }

    /// T3.3: Assessment explains a completed-step fallback.
    #[test]
    fn assessment_reports_basis() {
        let record = MilestoneRecord::new()
            .with(PipelineStage::Contract, d("2026-03-02"))
            .with(PipelineStage::Seal, d("2026-05-06"));
        let assessment = StageClassifier::assess(Some(&record), d("2026-05-10"));

        assert_eq!(assessment.stage, PipelineStage::Tax);
        assert_eq!(assessment.next, Some(PipelineStage::Transfer));
        assert_eq!(
            assessment.basis,
            StageBasis::Completed {
                milestone: PipelineStage::Seal,
                date: d("2026-05-06")
            }
        );
    }
}
