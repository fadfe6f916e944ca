//! One-shot broadcast start gate.
//!
//! Releases every waiting worker with a single firing, maximizing concurrent
//! stack pressure across the scheduler. Unlike a counting barrier the gate
//! never resets: once open it stays open, and late waiters pass straight
//! through. Ownership belongs to the aggregator; workers only hold a
//! reference they can wait on.

use parking_lot::{Condvar, Mutex};

/// Single-fire broadcast synchronization point.
pub struct StartGate {
    opened: Mutex<bool>,
    released: Condvar,
}

impl StartGate {
    /// Create a closed gate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            opened: Mutex::new(false),
            released: Condvar::new(),
        }
    }

    /// Block until the gate has been opened. Returns immediately if it
    /// already has.
    pub fn wait(&self) {
        let mut opened = self.opened.lock();
        while !*opened {
            self.released.wait(&mut opened);
        }
    }

    /// Open the gate, releasing all current and future waiters.
    ///
    /// Opening an already-open gate is a no-op; the gate never resets.
    pub fn open(&self) {
        let mut opened = self.opened.lock();
        if !*opened {
            *opened = true;
            self.released.notify_all();
        }
    }

    /// Whether the gate has fired.
    #[must_use]
    pub fn is_open(&self) -> bool {
        *self.opened.lock()
    }
}

impl Default for StartGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn open_before_wait_does_not_block() {
        let gate = StartGate::new();
        gate.open();
        gate.wait();
        assert!(gate.is_open());
    }

    #[test]
    fn open_is_idempotent() {
        let gate = StartGate::new();
        gate.open();
        gate.open();
        assert!(gate.is_open());
    }

    #[test]
    fn single_firing_releases_all_waiters() {
        let gate = Arc::new(StartGate::new());
        let released = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let released = Arc::clone(&released);
                thread::spawn(move || {
                    gate.wait();
                    released.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        assert_eq!(released.load(Ordering::SeqCst), 0);
        gate.open();
        for handle in handles {
            handle.join().expect("waiter thread panicked");
        }
        assert_eq!(released.load(Ordering::SeqCst), 16);
    }
}
