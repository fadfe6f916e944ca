//! Production foreign-call boundary for stackdrift.
//!
//! Everything here is deliberately opaque to the calling runtime: the raw
//! entry points take a bare numeric address, read through it, and report a
//! status the stack-pressure trigger folds into its difference check. The
//! Rust-side probes ([`DwellProbe`], [`ChecksumProbe`]) implement the
//! core's [`Probe`] capability; the `extern "C"` exports expose the same
//! computation to a foreign runtime that links this crate as a cdylib.

use std::slice;

use sha2::{Digest, Sha256};

use stackdrift_core::{DEFAULT_PAYLOAD, Probe};

/// Default in-call dwell in microseconds.
///
/// One millisecond keeps a 1000-worker run prompt while still leaving a
/// window for a relocation to land mid-call; raise it to widen the stale
/// window.
pub const DEFAULT_DWELL_MICROS: u32 = 1_000;

// ---------------------------------------------------------------------------
// DwellProbe
// ---------------------------------------------------------------------------

/// Byte-compare probe with an in-call dwell.
///
/// Checks the bytes against the expected payload on entry, lingers inside
/// the call, then checks again. The second check is what catches a stale
/// address: if the backing storage moved during the dwell, the raw entry
/// point keeps reading the old location while the live buffer is elsewhere.
pub struct DwellProbe {
    expected: Vec<u8>,
    dwell_micros: u32,
}

impl DwellProbe {
    #[must_use]
    pub fn new(expected: Vec<u8>, dwell_micros: u32) -> Self {
        Self {
            expected,
            dwell_micros,
        }
    }

    fn dwell(&self) {
        if self.dwell_micros > 0 {
            // SAFETY: usleep has no memory preconditions.
            unsafe {
                libc::usleep(self.dwell_micros);
            }
        }
    }

    fn matches(&self, data: &[u8]) -> bool {
        data == self.expected.as_slice()
    }
}

impl Probe for DwellProbe {
    unsafe fn probe_raw(&self, addr: usize, len: usize) -> i64 {
        if len != self.expected.len() {
            return 1;
        }
        // SAFETY: per the Probe contract the caller promises `len` readable
        // bytes at `addr` for the whole call; the harness exists to find
        // out whether its runtime can actually keep that promise.
        let entry = unsafe { slice::from_raw_parts(addr as *const u8, len) };
        if !self.matches(entry) {
            return 1;
        }
        self.dwell();
        // Re-derive from the bare address: if the backing storage moved
        // during the dwell, this read goes to the stale location.
        // SAFETY: same caller contract as above.
        let after = unsafe { slice::from_raw_parts(addr as *const u8, len) };
        i64::from(!self.matches(after))
    }

    fn probe_tracked(&self, data: &[u8]) -> i64 {
        if !self.matches(data) {
            return 1;
        }
        self.dwell();
        i64::from(!self.matches(data))
    }
}

// ---------------------------------------------------------------------------
// ChecksumProbe
// ---------------------------------------------------------------------------

/// Probe comparing the SHA-256 of the observed bytes against a fixed digest.
///
/// Same contract as [`DwellProbe`], different deterministic function; no
/// dwell, so it exercises the entry-time snapshot only.
pub struct ChecksumProbe {
    expected_digest: [u8; 32],
}

impl ChecksumProbe {
    /// Probe expecting exactly `payload`.
    #[must_use]
    pub fn for_payload(payload: &[u8]) -> Self {
        Self {
            expected_digest: Sha256::digest(payload).into(),
        }
    }

    fn check(&self, data: &[u8]) -> i64 {
        let digest: [u8; 32] = Sha256::digest(data).into();
        i64::from(digest != self.expected_digest)
    }
}

impl Probe for ChecksumProbe {
    unsafe fn probe_raw(&self, addr: usize, len: usize) -> i64 {
        // SAFETY: caller promises `len` readable bytes at `addr`.
        let data = unsafe { slice::from_raw_parts(addr as *const u8, len) };
        self.check(data)
    }

    fn probe_tracked(&self, data: &[u8]) -> i64 {
        self.check(data)
    }
}

// ---------------------------------------------------------------------------
// extern "C" entry points
// ---------------------------------------------------------------------------

/// Raw boundary entry point: bare address + length, status result.
///
/// Deterministic over the default 17-byte payload: returns 0 iff the bytes
/// at `addr` match it.
///
/// # Safety
///
/// `addr` must point to `len` readable bytes for the duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stackdrift_probe_raw(addr: libc::uintptr_t, len: libc::size_t) -> i64 {
    // SAFETY: forwarded caller contract.
    unsafe { stackdrift_probe_tracked(addr as *const u8, len) }
}

/// Tracked boundary entry point: same computation over a pointer argument.
///
/// # Safety
///
/// `data` must be non-null and point to `len` readable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stackdrift_probe_tracked(data: *const u8, len: libc::size_t) -> i64 {
    if data.is_null() {
        return 1;
    }
    // SAFETY: caller guarantees `len` readable bytes at `data`.
    let bytes = unsafe { slice::from_raw_parts(data, len) };
    i64::from(bytes != DEFAULT_PAYLOAD)
}
