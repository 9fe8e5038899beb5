// ============================================================================
// reactive-properties - Reactive Collections
// Lists and maps whose structural edits invalidate their readers
// ============================================================================
//
// Each collection is a property whose evaluator returns the stored
// collection unchanged. Mutators edit the storage directly and mark the
// collection dirty; there is nothing to recompute, but everything that read
// the collection must.
// ============================================================================

mod list;
mod map;

pub use list::ReactiveList;
pub use map::ReactiveMap;
