//! # Configuration
//!
//! Optional TOML configuration for the CLI.
//!
//! Lookup order: `--config <path>`, then `casetrack.toml` in the working
//! directory, then built-in defaults. Every key is optional.
//!
//! ```toml
//! default_case_kind = "self_use"
//!
//! [scheduler]
//! standard_tax_weeks = 2
//! handover_window_end_days = 14
//! ```

use casetrack_core::{CaseKind, CasetrackError, MilestoneScheduler, ScheduleRules};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "casetrack.toml";

/// Maximum config file size (64 KB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Case kind used by `schedule` when `--kind` is omitted.
    pub default_case_kind: CaseKind,
    /// Scheduling rule overrides.
    pub scheduler: ScheduleRules,
}

impl Config {
    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, CasetrackError> {
        let config: Config =
            toml::from_str(text).map_err(|e| CasetrackError::ConfigError(e.to_string()))?;
        config
            .scheduler
            .validate()
            .map_err(|e| CasetrackError::ConfigError(e.to_string()))?;
        Ok(config)
    }

    /// Read a config file.
    pub fn from_file(path: &Path) -> Result<Self, CasetrackError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            CasetrackError::ConfigError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(CasetrackError::ConfigError(format!(
                "Config file {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            CasetrackError::ConfigError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Resolve the configuration for this run.
    ///
    /// An explicit path must exist. The implicit `casetrack.toml` is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CasetrackError> {
        match explicit {
            Some(path) => {
                tracing::debug!("Loading config from {:?}", path);
                Self::from_file(path)
            }
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.is_file() {
                    tracing::debug!("Loading config from {:?}", implicit);
                    Self::from_file(implicit)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Build the scheduler for these rules.
    pub fn scheduler(&self) -> Result<MilestoneScheduler, CasetrackError> {
        MilestoneScheduler::with_rules(self.scheduler)
    }
}
