// ============================================================================
// reactive-properties - ReactiveMap
// A HashMap behind a property: reads are tracked, mutations invalidate
// ============================================================================

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use tracing::trace;

use crate::core::clock::Timestamp;
use crate::core::error::Result;
use crate::core::types::{Trackable, TrackableState, ValueId};
use crate::primitives::property::{Property, PropertyOptions};

// =============================================================================
// REACTIVE MAP
// =============================================================================

/// A reactive key/value map.
///
/// Same model as [`ReactiveList`](crate::ReactiveList): the map is stored
/// in a property, every read goes through the property's read path, and
/// every mutator marks the map dirty even when nothing actually changed.
///
/// # Example
///
/// ```
/// use reactive_properties::{dict, eval};
///
/// let stock = dict::<&str, u32>();
/// stock.insert("apples", 3);
///
/// let apples = eval({
///     let stock = stock.clone();
///     move || stock.get("apples").unwrap_or(0)
/// });
/// assert_eq!(apples.get(), 3);
///
/// stock.insert("apples", 5);
/// assert_eq!(apples.get(), 5);
/// ```
pub struct ReactiveMap<K, V> {
    property: Property<HashMap<K, V>>,
}

impl<K, V> Clone for ReactiveMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            property: self.property.clone(),
        }
    }
}

impl<K, V> ReactiveMap<K, V>
where
    K: Eq + Hash + 'static,
    V: 'static,
{
    /// Create an empty map.
    pub fn new() -> Self {
        Self::from_map(HashMap::new())
    }

    pub fn from_map(entries: HashMap<K, V>) -> Self {
        Self::with_options(entries, PropertyOptions::default())
    }

    pub fn with_options(entries: HashMap<K, V>, options: PropertyOptions) -> Self {
        Self {
            property: Property::stored(entries, options),
        }
    }

    fn mutate<R>(&self, op: &'static str, f: impl FnOnce(&mut HashMap<K, V>) -> R) -> R {
        let out = self.property.modify(f);
        trace!(id = %self.property.id(), op, "map mutated");
        out
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Borrow the map through a closure.
    ///
    /// # Panics
    ///
    /// If `f` mutates this same map.
    pub fn with<R>(&self, f: impl FnOnce(&HashMap<K, V>) -> R) -> R {
        self.property.with(f)
    }

    pub fn try_with<R>(&self, f: impl FnOnce(&HashMap<K, V>) -> R) -> Result<R> {
        self.property.try_with(f)
    }

    pub fn len(&self) -> usize {
        self.with(HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.with(HashMap::is_empty)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.with(|m| m.get(key).cloned())
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.with(|m| m.contains_key(key))
    }

    /// Whether `key` is present and maps to `value`.
    pub fn contains(&self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.with(|m| m.get(key) == Some(value))
    }

    /// Keys in iteration order.
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.with(|m| m.keys().cloned().collect())
    }

    /// Values in iteration order.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.with(|m| m.values().cloned().collect())
    }

    /// Snapshot of the whole map.
    pub fn to_map(&self) -> HashMap<K, V>
    where
        K: Clone,
        V: Clone,
    {
        self.property.get()
    }

    // =========================================================================
    // MUTATE
    // =========================================================================

    /// Set `key` to `value`, returning the previous value.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.mutate("insert", |m| m.insert(key, value))
    }

    /// Add a new entry. If `key` already exists the map is left as it was
    /// and the entry is handed back.
    pub fn try_add(&self, key: K, value: V) -> std::result::Result<(), (K, V)> {
        self.mutate("try_add", |m| {
            if m.contains_key(&key) {
                Err((key, value))
            } else {
                m.insert(key, value);
                Ok(())
            }
        })
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.mutate("remove", |m| m.remove(key))
    }

    /// Remove `key` only if it currently maps to `value`.
    pub fn remove_entry(&self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.mutate("remove_entry", |m| {
            if m.get(key) == Some(value) {
                m.remove(key);
                true
            } else {
                false
            }
        })
    }

    pub fn clear(&self) {
        self.mutate("clear", HashMap::clear);
    }

    pub fn extend(&self, entries: impl IntoIterator<Item = (K, V)>) {
        self.mutate("extend", |m| m.extend(entries));
    }

    pub fn retain(&self, f: impl FnMut(&K, &mut V) -> bool) {
        self.mutate("retain", |m| m.retain(f));
    }

    /// Replace the whole contents.
    pub fn replace(&self, entries: impl IntoIterator<Item = (K, V)>) {
        self.mutate("replace", |m| *m = entries.into_iter().collect());
    }

    /// Arbitrary in-place edit. Marks the map dirty afterwards.
    pub fn update<R>(&self, f: impl FnOnce(&mut HashMap<K, V>) -> R) -> R {
        self.mutate("update", f)
    }

    // =========================================================================
    // INTROSPECTION
    // =========================================================================

    pub fn id(&self) -> ValueId {
        self.property.id()
    }

    pub fn is_dirty(&self) -> bool {
        self.property.is_dirty()
    }

    pub fn dirty_since(&self) -> Timestamp {
        self.property.dirty_since()
    }

    pub fn recalculated_at(&self) -> Timestamp {
        self.property.recalculated_at()
    }

    /// The shared dirty/clean record.
    pub fn state(&self) -> &Rc<TrackableState> {
        self.property.state()
    }
}

impl<K, V> Default for ReactiveMap<K, V>
where
    K: Eq + Hash + 'static,
    V: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> From<HashMap<K, V>> for ReactiveMap<K, V>
where
    K: Eq + Hash + 'static,
    V: 'static,
{
    fn from(entries: HashMap<K, V>) -> Self {
        Self::from_map(entries)
    }
}

impl<K, V> FromIterator<(K, V)> for ReactiveMap<K, V>
where
    K: Eq + Hash + 'static,
    V: 'static,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_map(iter.into_iter().collect())
    }
}

impl<K, V> Trackable for ReactiveMap<K, V>
where
    K: Eq + Hash + 'static,
    V: 'static,
{
    fn id(&self) -> ValueId {
        self.property.id()
    }

    fn label(&self) -> Option<String> {
        self.property.label().map(str::to_owned)
    }

    fn is_dirty(&self) -> bool {
        self.property.is_dirty()
    }

    fn mark_dirty(&self) {
        self.property.invalidate();
    }

    fn dirty_since(&self) -> Timestamp {
        self.property.dirty_since()
    }

    fn recalculated_at(&self) -> Timestamp {
        self.property.recalculated_at()
    }

    fn dependency_ids(&self) -> Vec<ValueId> {
        self.property.dependency_ids()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ReactiveMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveMap")
            .field("property", &self.property)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
