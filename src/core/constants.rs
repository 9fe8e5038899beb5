// ============================================================================
// reactive-properties - Constants
// Limits and sentinel values shared across the crate
// ============================================================================

/// Default limit on nested recomputations per execution context.
///
/// A chain of properties that are all dirty recomputes recursively, one
/// tracking frame per link. Past this depth the read fails with
/// `ReactiveError::DepthExceeded`. Each level costs a few kilobytes of stack
/// in unoptimised builds, so the default stays well inside a 2 MiB thread
/// stack. Raise it with `DependencyTracker::set_max_depth` on threads that
/// have more.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Raw value of `Timestamp::EPOCH`. Every logical clock reading is greater.
pub const EPOCH_TICK: u64 = 0;

/// First identifier handed out to a trackable value.
pub const FIRST_VALUE_ID: u64 = 1;

// =============================================================================
// TESTS
// =============================================================================
