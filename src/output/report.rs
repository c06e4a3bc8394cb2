//! Run report
//!
//! A [`Report`] is a point-in-time view of a run: one row per listed
//! resource plus aggregate counts. It is built from resource snapshots, so
//! building it never holds the registry lock and a resource lock together.

use super::format::{cell, format_duration, format_size};
use crate::registry::ResourceSnapshot;
use crate::state::{ResourceState, RunState};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

pub const URL_COLUMN: usize = 100;
pub const TYPE_COLUMN: usize = 30;
pub const STATUS_COLUMN: usize = 70;

/// One listed resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub url: String,
    pub mime: String,
    pub status: String,
}

/// Aggregate counts over every resource of the run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    /// Registered resources
    pub total: usize,
    /// Resources on a foreign host
    pub external: usize,
    /// Resources on the seed's host
    pub local: usize,
    /// Bytes downloaded for local resources
    pub bytes: u64,
    /// Crawl tasks still running
    pub active_tasks: usize,
    /// Time since scanning began
    pub elapsed: Duration,
}

/// Snapshot report of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub state: RunState,
    pub entries: Vec<ReportEntry>,
    pub totals: ReportTotals,
}

impl Report {
    /// Builds a report from resource snapshots
    ///
    /// With `include_all` unset only resources in an active processing phase
    /// are listed; totals always cover every resource.
    pub fn build(
        state: RunState,
        resources: &[ResourceSnapshot],
        include_all: bool,
        max_retries: u32,
        active_tasks: usize,
        elapsed: Duration,
    ) -> Self {
        let mut totals = ReportTotals {
            total: resources.len(),
            active_tasks,
            elapsed,
            ..ReportTotals::default()
        };

        let mut entries = Vec::new();
        for resource in resources {
            if resource.is_external {
                totals.external += 1;
            } else {
                totals.local += 1;
                totals.bytes += resource.size;
            }

            if include_all || resource.state.is_active() {
                entries.push(ReportEntry {
                    url: resource.url.clone(),
                    mime: resource.mime.clone().unwrap_or_default(),
                    status: status_text(resource, max_retries),
                });
            }
        }

        Self {
            state,
            entries,
            totals,
        }
    }
}

/// Human-readable status of one resource
pub fn status_text(resource: &ResourceSnapshot, max_retries: u32) -> String {
    let state = resource.state;
    match state {
        ResourceState::RequestWaitRepeat => {
            format!("{} {}/{}", state.description(), resource.repeats, max_retries)
        }
        _ if state.is_error() => format!(
            "Error: {}: {}",
            state.description(),
            resource.error.as_deref().unwrap_or("unknown error")
        ),
        ResourceState::Complete => match &resource.read_error {
            Some(read_error) => format!("{} ({})", state.description(), read_error),
            None => state.description().to_string(),
        },
        _ => state.description().to_string(),
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {} {}",
            cell("URL", URL_COLUMN),
            cell("Type", TYPE_COLUMN),
            cell("Status", STATUS_COLUMN)
        )?;
        for entry in &self.entries {
            writeln!(
                f,
                "{} {} {}",
                cell(&entry.url, URL_COLUMN),
                cell(&entry.mime, TYPE_COLUMN),
                cell(&entry.status, STATUS_COLUMN)
            )?;
        }

        let totals = &self.totals;
        writeln!(f)?;
        writeln!(f, "State: {}", self.state)?;
        writeln!(
            f,
            "Resources: {} (foreign: {}, local: {})",
            totals.total, totals.external, totals.local
        )?;
        writeln!(f, "Downloaded: {}", format_size(totals.bytes))?;
        writeln!(f, "Active tasks: {}", totals.active_tasks)?;
        write!(f, "Elapsed: {}", format_duration(totals.elapsed))
    }
}
