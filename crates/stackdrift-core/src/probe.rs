//! The foreign-call boundary, modeled as a pluggable capability.
//!
//! A probe is a deterministic, pure function of the bytes at the given
//! location at the moment the call begins; a return of 0 means the bytes
//! matched the probe's expectation. Production probes live in
//! `stackdrift-abi`; the stubs here exist for injection in tests and for
//! dry runs from the CLI.
//!
//! The two entry points are the contrast under test: the raw variant hands
//! the callee a bare integer address with no ownership or lifetime contract,
//! so the caller's runtime gets no signal that relocation must account for
//! it. The tracked variant passes a reference the memory manager can see.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Opaque boundary reached by every worker's stack-pressure trigger.
pub trait Probe: Send + Sync {
    /// Raw variant: `addr` crosses the boundary as a bare numeric value.
    ///
    /// # Safety
    ///
    /// `addr` must point to `len` bytes that stay readable (and at that
    /// address) for the whole call. That is exactly the property the
    /// harness exists to check, so callers uphold it only as far as the
    /// runtime lets them.
    unsafe fn probe_raw(&self, addr: usize, len: usize) -> i64;

    /// Tracked variant: semantically the same computation over a reference
    /// the runtime can adjust on relocation.
    fn probe_tracked(&self, data: &[u8]) -> i64;
}

/// Which boundary entry point the trigger calls.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CallVariant {
    /// Bare-address entry point (the hazardous path; default).
    #[default]
    Raw,
    /// Tracked-reference entry point.
    Tracked,
}

impl CallVariant {
    /// Parse from string (case-insensitive); unknown input falls back to
    /// the hazardous default, which is the path the harness exists for.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "tracked" | "safe" | "pointer" => Self::Tracked,
            _ => Self::Raw,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Tracked => "tracked",
        }
    }
}

// ---------------------------------------------------------------------------
// Stub probes
// ---------------------------------------------------------------------------

/// Stub returning a fixed value from both entry points.
///
/// With value 0 this is the "always clean" boundary; any other value makes
/// every invocation read as corruption.
pub struct FixedProbe {
    value: i64,
    calls: AtomicUsize,
}

impl FixedProbe {
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self {
            value,
            calls: AtomicUsize::new(0),
        }
    }

    /// Total invocations across both entry points.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Probe for FixedProbe {
    unsafe fn probe_raw(&self, _addr: usize, _len: usize) -> i64 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.value
    }

    fn probe_tracked(&self, _data: &[u8]) -> i64 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.value
    }
}

/// Stub modeling a boundary that reads stale bytes for the first
/// `stale_calls` invocations and clean bytes afterwards.
///
/// Stands in for an injected relocation: the tally of a run using this
/// probe must equal the number of stale invocations, no more, no less.
pub struct StaleAfterProbe {
    stale_calls: usize,
    seen: AtomicUsize,
}

impl StaleAfterProbe {
    #[must_use]
    pub fn new(stale_calls: usize) -> Self {
        Self {
            stale_calls,
            seen: AtomicUsize::new(0),
        }
    }

    fn next(&self) -> i64 {
        let call = self.seen.fetch_add(1, Ordering::SeqCst);
        i64::from(call < self.stale_calls)
    }
}

impl Probe for StaleAfterProbe {
    unsafe fn probe_raw(&self, _addr: usize, _len: usize) -> i64 {
        self.next()
    }

    fn probe_tracked(&self, _data: &[u8]) -> i64 {
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_parses_loosely() {
        assert_eq!(CallVariant::from_str_loose("raw"), CallVariant::Raw);
        assert_eq!(CallVariant::from_str_loose("RAW"), CallVariant::Raw);
        assert_eq!(CallVariant::from_str_loose("unsafe"), CallVariant::Raw);
        assert_eq!(CallVariant::from_str_loose("tracked"), CallVariant::Tracked);
        assert_eq!(CallVariant::from_str_loose("safe"), CallVariant::Tracked);
        assert_eq!(CallVariant::from_str_loose("pointer"), CallVariant::Tracked);
        assert_eq!(CallVariant::from_str_loose("bogus"), CallVariant::Raw);
    }

    #[test]
    fn variant_default_is_raw() {
        assert_eq!(CallVariant::default(), CallVariant::Raw);
        assert_eq!(CallVariant::Raw.as_str(), "raw");
        assert_eq!(CallVariant::Tracked.as_str(), "tracked");
    }

    #[test]
    fn fixed_probe_counts_invocations() {
        let probe = FixedProbe::new(0);
        let data = [0u8; 4];
        assert_eq!(probe.probe_tracked(&data), 0);
        // SAFETY: the stub never dereferences the address.
        assert_eq!(unsafe { probe.probe_raw(data.as_ptr() as usize, 4) }, 0);
        assert_eq!(probe.calls(), 2);
    }

    #[test]
    fn stale_after_probe_reports_stale_then_clean() {
        let probe = StaleAfterProbe::new(2);
        let data = [0u8; 4];
        assert_eq!(probe.probe_tracked(&data), 1);
        assert_eq!(probe.probe_tracked(&data), 1);
        assert_eq!(probe.probe_tracked(&data), 0);
        assert_eq!(probe.probe_tracked(&data), 0);
    }
}
