// ============================================================================
// reactive-properties - Core Module
// Clock, identifiers, the trackable record, and the error type
// ============================================================================

pub mod clock;
pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use clock::Timestamp;
pub use constants::*;
pub use error::{ReactiveError, Result};
pub use types::{Trackable, TrackableState, ValueId};
