// ============================================================================
// reactive-properties - Self-Memoizing Reactive Properties
// ============================================================================
//
// Values that know when they are stale, recompute themselves once per
// invalidation, and discover what they depend on by watching what they read.
// ============================================================================

#[macro_use]
mod macros;

pub mod collections;
pub mod core;
pub mod factory;
pub mod primitives;
pub mod reactivity;

// Re-export core items at crate root for ergonomic access
pub use core::constants;
pub use core::{ReactiveError, Result, Timestamp, Trackable, TrackableState, ValueId};

// Re-export the property and its constructors
pub use factory::{dict, dict_from, eval, list, list_from, of, property, try_eval};
pub use primitives::property::{Property, PropertyOptions};

// Re-export tracking
pub use reactivity::tracking::{is_tracking, report_dependency, with_tracker, DependencyTracker};
pub use reactivity::untrack::{is_untracking, peek, untrack};

// Re-export collections
pub use collections::{ReactiveList, ReactiveMap};

// =============================================================================
// TESTS
// =============================================================================
