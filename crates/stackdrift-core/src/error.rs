//! Harness error taxonomy.
//!
//! Hazard observations (relocation, corruption) are data, not errors: they
//! travel through [`crate::WorkerOutcome`] and the final tally. Errors here
//! cover only structural failures of the harness itself.

use thiserror::Error;

/// Failures of the harness machinery (never of the hazard under test).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HarnessError {
    /// The configuration asked for a zero-worker run.
    #[error("harness requires at least one worker")]
    NoWorkers,

    /// An empty payload would violate the address-capture constraint.
    #[error("worker payload must not be empty")]
    EmptyPayload,

    /// A worker exited without reporting its outcome.
    #[error("lost worker results: received {received} of {expected}")]
    WorkerLost { received: usize, expected: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_stable() {
        assert_eq!(
            HarnessError::NoWorkers.to_string(),
            "harness requires at least one worker"
        );
        assert_eq!(
            HarnessError::EmptyPayload.to_string(),
            "worker payload must not be empty"
        );
        assert_eq!(
            HarnessError::WorkerLost {
                received: 3,
                expected: 8
            }
            .to_string(),
            "lost worker results: received 3 of 8"
        );
    }
}
