//! Fan-out, fan-in: the gate-and-tally aggregator.
//!
//! The aggregator spawns exactly N workers, each blocking on the shared
//! [`StartGate`], fires the gate once, then drains exactly N outcomes from
//! the result channel before reporting. There is no timeout: a boundary
//! call that never returns stalls the run, and the stall is itself
//! diagnostic information.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use serde::Serialize;

use crate::error::HarnessError;
use crate::gate::StartGate;
use crate::pressure::{DEFAULT_FILL_VALUE, FillerTier};
use crate::probe::{CallVariant, Probe};
use crate::worker::{WorkerOutcome, run_worker};

/// Canonical 17-byte payload the production probes expect.
pub const DEFAULT_PAYLOAD: &[u8] = b"hello world bytes";

/// Default worker fan-out.
pub const DEFAULT_WORKERS: usize = 1000;

/// Full configuration for one harness run.
///
/// The defaults are the empirically tuned scenario: 1000 workers, a
/// 17-byte payload, a 105-slot filler filled with 1, raw-variant calls.
/// All of it is configuration because the tuning targets one runtime's
/// stack-growth heuristic and carries no portable meaning.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Number of concurrent workers to release at once.
    pub workers: usize,
    /// Byte content each worker copies into its private buffer.
    pub payload: Vec<u8>,
    /// Constant the filler array is saturated with.
    pub fill_value: i64,
    /// Filler-array sizing tier.
    pub filler: FillerTier,
    /// Which boundary entry point the trigger calls.
    pub variant: CallVariant,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            payload: DEFAULT_PAYLOAD.to_vec(),
            fill_value: DEFAULT_FILL_VALUE,
            filler: FillerTier::Default,
            variant: CallVariant::Raw,
        }
    }
}

impl HarnessConfig {
    /// Payload of an arbitrary length, cycling the default byte pattern.
    #[must_use]
    pub fn payload_of_len(len: usize) -> Vec<u8> {
        DEFAULT_PAYLOAD.iter().copied().cycle().take(len).collect()
    }

    fn validate(&self) -> Result<(), HarnessError> {
        if self.workers == 0 {
            return Err(HarnessError::NoWorkers);
        }
        if self.payload.is_empty() {
            return Err(HarnessError::EmptyPayload);
        }
        Ok(())
    }
}

/// Aggregated result of one harness run.
#[derive(Debug, Clone, Serialize)]
pub struct HarnessReport {
    /// Number of workers that ran.
    pub workers: usize,
    /// Count of non-zero outcomes (corruption observed).
    pub tally: usize,
    /// Count of workers whose buffer address changed across the call.
    pub relocations: usize,
    /// Per-worker reports, ordered by worker index.
    pub outcomes: Vec<WorkerOutcome>,
}

impl HarnessReport {
    /// Build a report from raw worker outcomes (arrival order irrelevant).
    #[must_use]
    pub fn from_outcomes(workers: usize, mut outcomes: Vec<WorkerOutcome>) -> Self {
        outcomes.sort_by_key(|o| o.worker);
        let tally = outcomes.iter().filter(|o| o.corrupted()).count();
        let relocations = outcomes.iter().filter(|o| o.relocated()).count();
        Self {
            workers,
            tally,
            relocations,
            outcomes,
        }
    }

    /// True iff no worker observed corruption.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.tally == 0
    }

    #[must_use]
    pub fn status(&self) -> &'static str {
        if self.passed() { "SUCCESS" } else { "FAILED" }
    }

    /// One-line summary: status token plus the non-zero worker count.
    #[must_use]
    pub fn status_line(&self) -> String {
        format!("{} failed workers={}", self.status(), self.tally)
    }

    /// Process exit signal: the tally, clamped to the portable exit-status
    /// range. The report itself keeps the untruncated count.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::try_from(self.tally.min(255)).unwrap_or(255)
    }
}

/// Run the harness: spawn, release, drain, tally.
///
/// Blocks until all `config.workers` outcomes are in. Returns an error only
/// for structural failures (bad config, a worker lost without reporting);
/// hazard observations land in the report.
pub fn run_harness(
    config: &HarnessConfig,
    probe: Arc<dyn Probe>,
) -> Result<HarnessReport, HarnessError> {
    config.validate()?;

    let expected = config.workers;
    let gate = Arc::new(StartGate::new());
    let shared = Arc::new(config.clone());
    let (tx, rx) = mpsc::channel::<WorkerOutcome>();

    let handles: Vec<_> = (0..expected)
        .map(|worker| {
            let gate = Arc::clone(&gate);
            let probe = Arc::clone(&probe);
            let config = Arc::clone(&shared);
            let tx = tx.clone();
            thread::spawn(move || {
                let outcome = run_worker(worker, &config, probe.as_ref(), &gate);
                // The receiver outlives the run; a send failure means the
                // aggregator already bailed out.
                let _ = tx.send(outcome);
            })
        })
        .collect();
    drop(tx);

    // Single release event for every waiter at once.
    gate.open();

    let mut outcomes = Vec::with_capacity(expected);
    for _ in 0..expected {
        match rx.recv() {
            Ok(outcome) => outcomes.push(outcome),
            Err(_) => {
                return Err(HarnessError::WorkerLost {
                    received: outcomes.len(),
                    expected,
                });
            }
        }
    }

    for handle in handles {
        if handle.join().is_err() {
            return Err(HarnessError::WorkerLost {
                received: outcomes.len(),
                expected,
            });
        }
    }

    Ok(HarnessReport::from_outcomes(expected, outcomes))
}
