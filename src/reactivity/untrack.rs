// ============================================================================
// reactive-properties - Untracked Reads
// Reading properties without becoming dependent on them
// ============================================================================

use crate::reactivity::tracking::TrackingFrame;

/// Run `f` without attributing its reads to the enclosing evaluation.
///
/// Properties that recompute inside `f` still record their own
/// dependencies; only the outer evaluation is kept unaware of them.
///
/// # Example
///
/// ```
/// use reactive_properties::{eval, of, untrack};
///
/// let a = of(1);
/// let b = of(10);
///
/// let sum = eval({
///     let (a, b) = (a.clone(), b.clone());
///     move || a.get() + untrack(|| b.get())
/// });
/// assert_eq!(sum.get(), 11);
///
/// b.set(20); // not a dependency
/// assert!(!sum.is_dirty());
///
/// a.set(2);
/// assert_eq!(sum.get(), 22);
/// ```
pub fn untrack<T>(f: impl FnOnce() -> T) -> T {
    let _frame = TrackingFrame::untracked();
    f()
}

/// Alias for [`untrack`].
pub fn peek<T>(f: impl FnOnce() -> T) -> T {
    untrack(f)
}

/// Check if currently inside an untracked region.
pub fn is_untracking() -> bool {
    use crate::reactivity::tracking::with_tracker;
    with_tracker(|t| t.depth() > 0 && !t.is_tracking())
}

// =============================================================================
// TESTS
// =============================================================================
