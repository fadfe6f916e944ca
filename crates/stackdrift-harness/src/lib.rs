//! Reporting and diagnostics for the stackdrift harness.
//!
//! This crate owns everything around the core run: the structured JSONL
//! diagnostics stream, the serializable run report, and probe selection
//! for the CLI.

pub mod diagnostics;
pub mod report;

pub use diagnostics::{LogEmitter, LogEntry, LogLevel};
pub use report::RunReport;
