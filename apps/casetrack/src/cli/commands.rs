//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//! Rendering is split from printing so output can be checked in tests.

use crate::config::Config;
use casetrack_core::{
    CaseKind, CaseMilestones, CasetrackError, PipelineStage, ScheduledMilestones, StageBasis,
    StageReport, calendar, classify_all,
    formats::{MAX_INTERCHANGE_PAYLOAD_SIZE, to_json_pretty},
    records_from_json,
};
use chrono::NaiveDate;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE VALIDATION
// =============================================================================

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), CasetrackError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| CasetrackError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(CasetrackError::DeserializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Canonicalize an input path and make sure it is a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, CasetrackError> {
    let canonical = path.canonicalize().map_err(|e| {
        CasetrackError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(CasetrackError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Read and parse a case file.
pub fn load_cases(file: &Path) -> Result<Vec<CaseMilestones>, CasetrackError> {
    let validated_path = validate_file_path(file)?;
    validate_file_size(&validated_path, MAX_INTERCHANGE_PAYLOAD_SIZE as u64)?;

    let contents = std::fs::read(&validated_path)
        .map_err(|e| CasetrackError::IoError(format!("Read file: {}", e)))?;

    records_from_json(&contents)
}

/// Resolve the reference date. The clock is read here and nowhere else.
pub fn resolve_today(today: Option<&str>) -> Result<NaiveDate, CasetrackError> {
    match today {
        Some(text) => calendar::parse_date(text),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

// =============================================================================
// STAGE COMMAND
// =============================================================================

/// Classify every case in a file.
pub fn cmd_stage(json_mode: bool, file: &Path, today: Option<&str>) -> Result<(), CasetrackError> {
    let today = resolve_today(today)?;
    tracing::info!("Classifying cases from {:?} as of {}", file, today);

    let cases = load_cases(file)?;
    let reports = classify_all(&cases, today);

    let skipped: usize = reports.iter().map(|r| r.invalid_fields.len()).sum();
    if skipped > 0 {
        tracing::warn!("{} unreadable milestone date(s) were ignored", skipped);
    }

    println!("{}", render_stage_reports(&reports, today, json_mode)?);
    Ok(())
}

/// Render stage reports as text or JSON.
pub fn render_stage_reports(
    reports: &[StageReport],
    today: NaiveDate,
    json_mode: bool,
) -> Result<String, CasetrackError> {
    if json_mode {
        let output = serde_json::json!({
            "today": calendar::format_date(today),
            "cases": reports,
        });
        return to_json_pretty(&output);
    }

    let mut out = String::new();
    let title = format!("Case Stages (as of {})", calendar::format_date(today));
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "=".repeat(title.len()));

    if reports.is_empty() {
        let _ = writeln!(out, "No cases.");
        return Ok(out.trim_end().to_string());
    }

    let id_width = reports
        .iter()
        .map(|r| r.case_id.chars().count())
        .max()
        .unwrap_or(0);

    for report in reports {
        let _ = write!(
            out,
            "{:<id_width$}  {:<16}  {}",
            report.case_id,
            report.stage.to_string(),
            describe_basis(&report.basis),
        );
        if !report.invalid_fields.is_empty() {
            let _ = write!(out, "  [ignored: {}]", report.invalid_fields.join(", "));
        }
        out.push('\n');
    }

    Ok(out.trim_end().to_string())
}

/// One-line explanation of a stage decision.
pub fn describe_basis(basis: &StageBasis) -> String {
    match basis {
        StageBasis::NoRecord => "no milestone record".to_string(),
        StageBasis::NotStarted => "no milestone dates".to_string(),
        StageBasis::Upcoming {
            milestone,
            date,
            days_until,
        } => {
            let when = match *days_until {
                0 => "today".to_string(),
                1 => "in 1 day".to_string(),
                n => format!("in {} days", n),
            };
            format!(
                "{} due {} ({})",
                milestone.key(),
                calendar::format_date(*date),
                when
            )
        }
        StageBasis::Completed { milestone, date } => format!(
            "{} completed {}",
            milestone.key(),
            calendar::format_date(*date)
        ),
    }
}

// =============================================================================
// SCHEDULE COMMAND
// =============================================================================

/// Compute and print a milestone schedule.
pub fn cmd_schedule(
    config: &Config,
    json_mode: bool,
    contract_date: &str,
    kind: Option<&str>,
) -> Result<(), CasetrackError> {
    let kind = match kind {
        Some(text) => text.parse::<CaseKind>()?,
        None => config.default_case_kind,
    };

    let scheduler = config.scheduler()?;
    let scheduled = scheduler.schedule_str(contract_date, kind)?;
    tracing::info!("Scheduled {} case from {}", kind, contract_date);

    println!("{}", render_schedule(contract_date, kind, &scheduled, json_mode)?);
    Ok(())
}

/// Render a schedule as text or JSON.
pub fn render_schedule(
    contract_date: &str,
    kind: CaseKind,
    scheduled: &ScheduledMilestones,
    json_mode: bool,
) -> Result<String, CasetrackError> {
    let contract_date = calendar::parse_date(contract_date)?;

    if json_mode {
        let output = serde_json::json!({
            "contract_date": calendar::format_date(contract_date),
            "case_kind": kind,
            "milestones": scheduled,
        });
        return to_json_pretty(&output);
    }

    let mut out = String::new();
    let _ = writeln!(out, "Milestone Schedule");
    let _ = writeln!(out, "==================");
    let _ = writeln!(out, "Contract:  {}", calendar::format_date(contract_date));
    let _ = writeln!(out, "Case kind: {}", kind);
    let _ = writeln!(out);
    for (name, date) in scheduled.entries() {
        let _ = writeln!(
            out,
            "  {:<18} {} ({})",
            name,
            calendar::format_date(date),
            date.format("%a")
        );
    }
    let _ = write!(out, "  {:<18} (not scheduled)", "redemption_date");

    Ok(out)
}

// =============================================================================
// STAGES COMMAND
// =============================================================================

/// List the pipeline stages.
pub fn cmd_stages(json_mode: bool) -> Result<(), CasetrackError> {
    println!("{}", render_stages(json_mode)?);
    Ok(())
}

/// Render the pipeline stage list.
pub fn render_stages(json_mode: bool) -> Result<String, CasetrackError> {
    if json_mode {
        let stages: Vec<_> = PipelineStage::ALL
            .iter()
            .map(|stage| {
                serde_json::json!({
                    "stage": stage,
                    "name": stage.name(),
                    "label": stage.label(),
                    "milestone_field": stage.milestone_field(),
                })
            })
            .collect();
        return to_json_pretty(&stages);
    }

    let mut out = String::new();
    let _ = writeln!(out, "Pipeline Stages");
    let _ = writeln!(out, "===============");
    for (index, stage) in PipelineStage::ALL.iter().enumerate() {
        let field = stage.milestone_field().unwrap_or("-");
        let _ = writeln!(
            out,
            "  {}. {:<9} {}  {}",
            index + 1,
            stage.name(),
            stage.label(),
            field
        );
    }

    Ok(out.trim_end().to_string())
}
