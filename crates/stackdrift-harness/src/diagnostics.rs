//! Structured JSONL diagnostics.
//!
//! One line per event, machine-readable, for stress runs that feed a log
//! aggregator instead of a terminal. Required fields: `timestamp`,
//! `level`, `event`; everything else is optional context. Addresses are
//! rendered as fixed-width hex strings so log consumers never lose
//! precision to JSON number handling.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use stackdrift_core::WorkerOutcome;

/// Severity level for log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Canonical structured log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    // Required
    pub timestamp: String,
    pub level: LogLevel,
    pub event: String,

    // Optional
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relocated: Option<usize>,
}

impl LogEntry {
    #[must_use]
    pub fn new(level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: unix_timestamp(),
            level,
            event: event.into(),
            worker: None,
            before: None,
            after: None,
            outcome: None,
            failed: None,
            relocated: None,
        }
    }

    /// Entry for one worker's result; level escalates when the worker
    /// observed corruption, relocation alone stays informational.
    #[must_use]
    pub fn worker_result(outcome: &WorkerOutcome) -> Self {
        let level = if outcome.corrupted() {
            LogLevel::Error
        } else if outcome.relocated() {
            LogLevel::Warn
        } else {
            LogLevel::Info
        };
        let event = if outcome.relocated() {
            "buffer_moved"
        } else {
            "worker_result"
        };
        let mut entry = Self::new(level, event);
        entry.worker = Some(outcome.worker);
        entry.before = Some(format!("{:#018x}", outcome.before));
        entry.after = Some(format!("{:#018x}", outcome.after));
        entry.outcome = Some(outcome.outcome);
        entry
    }

    /// Terminal entry for a finished run.
    #[must_use]
    pub fn run_complete(failed: usize, relocated: usize) -> Self {
        let level = if failed == 0 {
            LogLevel::Info
        } else {
            LogLevel::Error
        };
        let mut entry = Self::new(level, "run_complete");
        entry.failed = Some(failed);
        entry.relocated = Some(relocated);
        entry
    }

    /// Serialize to a single JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Writes JSONL entries to a file or any writer.
pub struct LogEmitter {
    out: Box<dyn Write + Send>,
}

impl LogEmitter {
    /// Emitter appending to the file at `path` (created if missing).
    pub fn to_file(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            out: Box::new(BufWriter::new(file)),
        })
    }

    /// Emitter over an arbitrary writer (tests, stderr).
    #[must_use]
    pub fn to_writer(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    /// Write one entry as a JSONL line.
    pub fn emit(&mut self, entry: &LogEntry) -> io::Result<()> {
        let line = entry.to_jsonl().map_err(io::Error::other)?;
        writeln!(self.out, "{line}")?;
        self.out.flush()
    }
}

fn unix_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:03}", now.as_secs(), now.subsec_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("buffer lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn optional_fields_are_skipped_when_absent() {
        let entry = LogEntry::new(LogLevel::Info, "run_started");
        let line = entry.to_jsonl().expect("entry serializes");
        assert!(line.contains("\"event\":\"run_started\""));
        assert!(line.contains("\"level\":\"info\""));
        assert!(!line.contains("worker"));
        assert!(!line.contains("before"));
    }

    #[test]
    fn worker_result_escalates_on_corruption() {
        let corrupt = WorkerOutcome {
            worker: 7,
            outcome: 1,
            before: 0x1000,
            after: 0x1000,
        };
        let entry = LogEntry::worker_result(&corrupt);
        assert_eq!(entry.level, LogLevel::Error);
        assert_eq!(entry.event, "worker_result");
        assert_eq!(entry.worker, Some(7));
        assert_eq!(entry.outcome, Some(1));
    }

    #[test]
    fn relocation_alone_is_a_warning_not_an_error() {
        let moved = WorkerOutcome {
            worker: 2,
            outcome: 0,
            before: 0x1000,
            after: 0x2000,
        };
        let entry = LogEntry::worker_result(&moved);
        assert_eq!(entry.level, LogLevel::Warn);
        assert_eq!(entry.event, "buffer_moved");
        assert_eq!(entry.before.as_deref(), Some("0x0000000000001000"));
        assert_eq!(entry.after.as_deref(), Some("0x0000000000002000"));
    }

    #[test]
    fn emitter_writes_one_line_per_entry() {
        let buf = SharedBuf(Arc::new(Mutex::new(Vec::new())));
        let mut emitter = LogEmitter::to_writer(Box::new(buf.clone()));
        emitter
            .emit(&LogEntry::run_complete(0, 1))
            .expect("emit succeeds");
        emitter
            .emit(&LogEntry::run_complete(2, 0))
            .expect("emit succeeds");

        let bytes = buf.0.lock().expect("buffer lock").clone();
        let text = String::from_utf8(bytes).expect("utf8 log");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let parsed: LogEntry = serde_json::from_str(line).expect("line parses back");
            assert_eq!(parsed.event, "run_complete");
        }
    }
}
