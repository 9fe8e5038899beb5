// ============================================================================
// reactive-properties - Reactivity Module
// Dependency tracking and untracked reads
// ============================================================================

pub mod tracking;
pub mod untrack;

// Re-export main tracking functions
pub use tracking::{is_tracking, report_dependency, with_tracker, DependencyTracker};

pub use untrack::{is_untracking, peek, untrack};
