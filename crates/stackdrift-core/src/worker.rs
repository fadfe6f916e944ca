//! Hazard-checking worker.
//!
//! One worker = one concurrent unit of work: wait at the gate, capture the
//! buffer address, run the stack-pressure trigger, capture again, report.
//! Each worker runs exactly once; there are no retries and no shared
//! mutable state beyond the gate and the result channel.

use serde::Serialize;

use crate::capture::first_byte_addr;
use crate::gate::StartGate;
use crate::pressure::apply_pressure;
use crate::probe::Probe;
use crate::run::HarnessConfig;

/// One worker's report: the boundary outcome plus both address captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerOutcome {
    /// Worker index within the run.
    pub worker: usize,
    /// Difference returned by the stack-pressure trigger; non-zero means
    /// the boundary observed corrupted/stale bytes.
    pub outcome: i64,
    /// Buffer address captured before the trigger.
    pub before: usize,
    /// Buffer address captured after the trigger.
    pub after: usize,
}

impl WorkerOutcome {
    /// The buffer's backing storage moved across the call. Evidence of
    /// relocation, not by itself a failure.
    #[must_use]
    pub fn relocated(&self) -> bool {
        self.before != self.after
    }

    /// The boundary read bytes that were not the live buffer.
    #[must_use]
    pub fn corrupted(&self) -> bool {
        self.outcome != 0
    }

    /// Fixed-width diagnostic line for a relocated buffer.
    #[must_use]
    pub fn moved_line(&self) -> String {
        format!(
            "buffer moved before={:#018x} after={:#018x}",
            self.before, self.after
        )
    }
}

/// Run one worker to completion: Waiting-at-Gate, Capturing-Before,
/// Invoking-Trigger, Capturing-After, then the returned report.
///
/// The worker owns a fresh copy of the configured payload for its entire
/// lifetime; only the boundary touches it during the call.
#[must_use]
pub fn run_worker(
    worker: usize,
    config: &HarnessConfig,
    probe: &dyn Probe,
    gate: &StartGate,
) -> WorkerOutcome {
    let data = config.payload.clone();

    gate.wait();

    let before = first_byte_addr(&data);
    let outcome = apply_pressure(config.filler, probe, config.variant, &data, config.fill_value);
    let after = first_byte_addr(&data);

    WorkerOutcome {
        worker,
        outcome,
        before,
        after,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{FixedProbe, StaleAfterProbe};

    fn open_gate() -> StartGate {
        let gate = StartGate::new();
        gate.open();
        gate
    }

    #[test]
    fn clean_probe_reports_zero_outcome() {
        let config = HarnessConfig::default();
        let probe = FixedProbe::new(0);
        let report = run_worker(3, &config, &probe, &open_gate());
        assert_eq!(report.worker, 3);
        assert_eq!(report.outcome, 0);
        assert!(!report.corrupted());
    }

    #[test]
    fn heap_buffer_does_not_move_under_native_threads() {
        let config = HarnessConfig::default();
        let probe = FixedProbe::new(0);
        let report = run_worker(0, &config, &probe, &open_gate());
        assert_eq!(report.before, report.after);
        assert!(!report.relocated());
    }

    #[test]
    fn stale_probe_outcome_reaches_the_report() {
        let config = HarnessConfig::default();
        let probe = StaleAfterProbe::new(1);
        let report = run_worker(0, &config, &probe, &open_gate());
        assert!(report.corrupted());
        assert_eq!(report.outcome, 1);
    }

    #[test]
    fn relocation_and_corruption_are_independent_signals() {
        let moved_clean = WorkerOutcome {
            worker: 0,
            outcome: 0,
            before: 0x1000,
            after: 0x2000,
        };
        assert!(moved_clean.relocated());
        assert!(!moved_clean.corrupted());

        let still_corrupt = WorkerOutcome {
            worker: 1,
            outcome: 1,
            before: 0x1000,
            after: 0x1000,
        };
        assert!(!still_corrupt.relocated());
        assert!(still_corrupt.corrupted());
    }

    #[test]
    fn moved_line_uses_fixed_hex_width() {
        let outcome = WorkerOutcome {
            worker: 0,
            outcome: 0,
            before: 0xdead,
            after: 0xbeef,
        };
        assert_eq!(
            outcome.moved_line(),
            "buffer moved before=0x000000000000dead after=0x000000000000beef"
        );
    }
}
