// ============================================================================
// reactive-properties - Logical Clock
// Strictly increasing timestamps for dirty/clean bookkeeping
// ============================================================================
//
// Dirtiness compares timestamps with strict greater-than. A wall clock can
// hand out the same reading twice, which would hide an invalidation that
// lands in the same tick as a recomputation. A counter cannot.
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::constants::EPOCH_TICK;

static CLOCK: AtomicU64 = AtomicU64::new(EPOCH_TICK);

/// A point on the process-wide logical clock.
///
/// Every call to [`Timestamp::now`] returns a value strictly greater than
/// all values returned before it, on any thread.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The beginning of time. Smaller than any reading of the clock.
    pub const EPOCH: Timestamp = Timestamp(EPOCH_TICK);

    /// Advance the clock and return the new reading.
    pub fn now() -> Self {
        Timestamp(CLOCK.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// The raw tick count.
    pub fn ticks(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// TESTS
// =============================================================================
