//! # Casetrack
//!
//! Command-line front end for `casetrack-core`.
//!
//! The binary owns everything the core refuses to touch: files, the clock,
//! configuration and logging setup.

pub mod cli;
pub mod config;
