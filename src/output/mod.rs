//! Output module for run reports
//!
//! This module handles:
//! - Building snapshot reports of a run's resources
//! - Rendering them as fixed-width text tables
//! - Formatting sizes and durations for humans

mod format;
mod report;

pub use format::{cell, format_duration, format_size};
pub use report::{status_text, Report, ReportEntry, ReportTotals};
