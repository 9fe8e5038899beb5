// ============================================================================
// reactive-properties - Factory Functions
// Short constructors for properties, lists and maps
// ============================================================================
//
// These are the entry points generated accessor code calls. They add
// nothing beyond the types they build.
// ============================================================================

use std::collections::HashMap;
use std::hash::Hash;

use crate::collections::{ReactiveList, ReactiveMap};
use crate::core::error::ReactiveError;
use crate::primitives::property::{Property, PropertyOptions};

/// A property holding `value`.
///
/// # Example
///
/// ```
/// use reactive_properties::of;
///
/// let name = of(String::from("ada"));
/// assert_eq!(name.get(), "ada");
/// name.set(String::from("grace"));
/// assert_eq!(name.get(), "grace");
/// ```
pub fn of<T: 'static>(value: T) -> Property<T> {
    Property::new(value)
}

/// A property computed by `evaluator`, first run on the first read.
pub fn eval<T, F>(evaluator: F) -> Property<T>
where
    T: 'static,
    F: Fn() -> T + 'static,
{
    Property::formula(evaluator)
}

/// A property computed by a fallible `evaluator`.
///
/// # Example
///
/// ```
/// use reactive_properties::{of, try_eval, ReactiveError};
///
/// let text = of(String::from("12"));
/// let number = try_eval({
///     let text = text.clone();
///     move || text.get().parse::<i32>().map_err(ReactiveError::evaluator)
/// });
/// assert_eq!(number.try_get().unwrap(), 12);
///
/// text.set(String::from("twelve"));
/// assert!(number.try_get().is_err());
/// assert!(number.is_dirty());
/// ```
pub fn try_eval<T, F, E>(evaluator: F) -> Property<T>
where
    T: 'static,
    F: Fn() -> Result<T, E> + 'static,
    E: Into<ReactiveError>,
{
    Property::try_formula(evaluator)
}

/// Create a property (low-level, with options).
pub fn property<T: 'static>(value: T, options: Option<PropertyOptions>) -> Property<T> {
    Property::new_with_options(value, options.unwrap_or_default())
}

/// An empty reactive list.
pub fn list<T: 'static>() -> ReactiveList<T> {
    ReactiveList::new()
}

/// A reactive list holding a copy of `items`.
pub fn list_from<T: Clone + 'static>(items: &[T]) -> ReactiveList<T> {
    ReactiveList::from_vec(items.to_vec())
}

/// An empty reactive map.
pub fn dict<K, V>() -> ReactiveMap<K, V>
where
    K: Eq + Hash + 'static,
    V: 'static,
{
    ReactiveMap::new()
}

/// A reactive map holding a copy of `entries`.
pub fn dict_from<K, V>(entries: &HashMap<K, V>) -> ReactiveMap<K, V>
where
    K: Eq + Hash + Clone + 'static,
    V: Clone + 'static,
{
    ReactiveMap::from_map(entries.clone())
}

// =============================================================================
// TESTS
// =============================================================================
