//! Stack-pressure trigger.
//!
//! Wraps the boundary call in a deliberately fat stack frame: a fixed-size
//! integer array, filled before the call, so that entering this routine
//! forces the calling context's stack to grow. On a runtime that grows
//! stacks by relocation, that maximizes the chance the relocation lands
//! while the boundary holds a captured raw address.
//!
//! The slot count is empirically tuned against one runtime's growth
//! heuristic, not a portable guarantee, so it is a configuration knob.
//! Stack arrays are compile-time sized in Rust; the runtime knob selects
//! among const-generic tiers rather than taking a free integer.

use crate::capture::first_byte_addr;
use crate::probe::{CallVariant, Probe};

/// Default fill constant for the filler array.
pub const DEFAULT_FILL_VALUE: i64 = 1;

/// Filler-array sizing tiers (eight-byte slots).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FillerTier {
    /// 16 slots; little pressure, useful to show the contrast.
    Small,
    /// 105 slots; the empirically tuned default.
    #[default]
    Default,
    /// 1024 slots; aggressive pressure.
    Large,
}

impl FillerTier {
    /// Parse from string (case-insensitive); unknown input falls back to
    /// the default tier.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "small" | "min" => Self::Small,
            "large" | "max" => Self::Large,
            _ => Self::Default,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Default => "default",
            Self::Large => "large",
        }
    }

    /// Number of eight-byte slots the tier puts on the stack.
    #[must_use]
    pub const fn slots(self) -> usize {
        match self {
            Self::Small => 16,
            Self::Default => 105,
            Self::Large => 1024,
        }
    }
}

/// Invoke the boundary for `data` under `tier`-sized stack pressure.
pub fn apply_pressure(
    tier: FillerTier,
    probe: &dyn Probe,
    variant: CallVariant,
    data: &[u8],
    fill_value: i64,
) -> i64 {
    match tier {
        FillerTier::Small => fill_stack_space::<16>(probe, variant, data, fill_value),
        FillerTier::Default => fill_stack_space::<105>(probe, variant, data, fill_value),
        FillerTier::Large => fill_stack_space::<1024>(probe, variant, data, fill_value),
    }
}

/// The trigger itself: fat frame, boundary call, difference check.
///
/// Fills a `SLOTS`-slot local array with `fill_value`, invokes the boundary
/// for `data`, folds the result into slot 0 and returns the difference from
/// the original constant. A clean boundary returns 0, so the difference is
/// 0; any other value means the boundary observed bytes that were not the
/// live buffer.
pub fn fill_stack_space<const SLOTS: usize>(
    probe: &dyn Probe,
    variant: CallVariant,
    data: &[u8],
    fill_value: i64,
) -> i64 {
    let mut space = [fill_value; SLOTS];
    // Opaque use: the array must actually occupy the frame.
    std::hint::black_box(&mut space);

    let result = match variant {
        CallVariant::Raw => {
            let addr = first_byte_addr(data);
            // SAFETY: `addr`/`len` describe `data`, which outlives the call.
            // Whether the backing storage stays at `addr` for the duration
            // is the property under observation, deliberately unguarded.
            unsafe { probe.probe_raw(addr, data.len()) }
        }
        CallVariant::Tracked => probe.probe_tracked(data),
    };

    space[0] += result;
    std::hint::black_box(&mut space);
    space[0] - fill_value
}
