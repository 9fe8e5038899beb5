// ============================================================================
// reactive-properties - Primitives Module
// The computed property
// ============================================================================

pub mod property;

pub use property::{Property, PropertyOptions};
