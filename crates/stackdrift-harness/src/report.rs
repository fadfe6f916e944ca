//! Serializable run report.
//!
//! Wraps the core's [`HarnessReport`] with the run parameters so a single
//! JSON document describes what ran and what it found.

use serde::Serialize;

use stackdrift_core::{HarnessConfig, HarnessReport};

/// Machine-readable record of one harness run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: String,
    pub workers: usize,
    pub failed: usize,
    pub relocated: usize,
    pub payload_len: usize,
    pub fill_value: i64,
    pub filler: String,
    pub variant: String,
    pub probe: String,
    pub outcomes: Vec<stackdrift_core::WorkerOutcome>,
}

impl RunReport {
    #[must_use]
    pub fn new(config: &HarnessConfig, probe_name: &str, report: &HarnessReport) -> Self {
        Self {
            status: report.status().to_string(),
            workers: report.workers,
            failed: report.tally,
            relocated: report.relocations,
            payload_len: config.payload.len(),
            fill_value: config.fill_value,
            filler: config.filler.as_str().to_string(),
            variant: config.variant.as_str().to_string(),
            probe: probe_name.to_string(),
            outcomes: report.outcomes.clone(),
        }
    }

    /// Pretty JSON document.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable rendering: one diagnostic line per relocated worker,
    /// then the status line last.
    #[must_use]
    pub fn render_plain(&self) -> String {
        let mut lines: Vec<String> = self
            .outcomes
            .iter()
            .filter(|o| o.relocated())
            .map(stackdrift_core::WorkerOutcome::moved_line)
            .collect();
        lines.push(format!("{} failed workers={}", self.status, self.failed));
        lines.join("\n")
    }
}
