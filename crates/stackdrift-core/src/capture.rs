//! Raw address capture.
//!
//! The captured value is a bare `usize`. Nothing ties it back to the buffer:
//! no borrow, no lifetime, no entry in any tracking structure. That is the
//! point — the harness wants an address the runtime cannot see or adjust.

/// Returns the numeric address of the first byte of `buf`.
///
/// Pure read; callable any number of times on the same buffer without
/// perturbing it. Callers must pass a non-empty buffer — the address of a
/// zero-length buffer's "first byte" is meaningless (constraint, not a
/// checked error).
#[must_use]
pub fn first_byte_addr(buf: &[u8]) -> usize {
    debug_assert!(!buf.is_empty(), "address capture requires a non-empty buffer");
    buf.as_ptr() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_is_repeatable() {
        let data = vec![0xAAu8; 32];
        let first = first_byte_addr(&data);
        let second = first_byte_addr(&data);
        assert_eq!(first, second);
    }

    #[test]
    fn capture_matches_slice_pointer() {
        let data = vec![1u8, 2, 3];
        assert_eq!(first_byte_addr(&data), data.as_ptr() as usize);
    }

    #[test]
    fn capture_is_stable_across_reads_and_writes() {
        let mut data = vec![0u8; 17];
        let before = first_byte_addr(&data);
        data[0] = 0xFF;
        let _sum: u64 = data.iter().map(|&b| u64::from(b)).sum();
        assert_eq!(first_byte_addr(&data), before);
    }
}
