//! Hazard-detection core for stackdrift.
//!
//! stackdrift is a concurrency stress harness for one memory-safety hazard:
//! a runtime that may relocate an execution context's stack can invalidate a
//! raw address taken from stack-reachable data once that address has been
//! handed to an opaque foreign call. This crate provides:
//! - [`capture`]: raw address capture outside any ownership tracking
//! - [`probe`]: the pluggable foreign-call boundary (raw + tracked variants)
//! - [`pressure`]: the stack-pressure trigger wrapped around the boundary call
//! - [`gate`]: one-shot broadcast gate releasing all workers at once
//! - [`worker`]: the per-worker capture/call/compare state machine
//! - [`run`]: fan-out, result aggregation, and the pass/fail tally

pub mod capture;
pub mod error;
pub mod gate;
pub mod pressure;
pub mod probe;
pub mod run;
pub mod worker;

pub use error::HarnessError;
pub use gate::StartGate;
pub use pressure::{DEFAULT_FILL_VALUE, FillerTier};
pub use probe::{CallVariant, Probe};
pub use run::{DEFAULT_PAYLOAD, DEFAULT_WORKERS, HarnessConfig, HarnessReport, run_harness};
pub use worker::WorkerOutcome;
