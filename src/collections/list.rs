// ============================================================================
// reactive-properties - ReactiveList
// A Vec behind a property: reads are tracked, mutations invalidate
// ============================================================================

use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::core::clock::Timestamp;
use crate::core::error::Result;
use crate::core::types::{Trackable, TrackableState, ValueId};
use crate::primitives::property::{Property, PropertyOptions};

// =============================================================================
// REACTIVE LIST
// =============================================================================

/// A reactive, ordered list.
///
/// The list is a [`Property`] whose evaluator just hands back the stored
/// `Vec`. Mutators edit the `Vec` in place and mark the list dirty, so any
/// property that read the list recomputes on its next read. Every read
/// member goes through the property's read path and is tracked.
///
/// Index errors behave like `Vec`: lookups return `Option`, while
/// `insert`, `remove` and `set` panic when out of range.
///
/// # Example
///
/// ```
/// use reactive_properties::{eval, list};
///
/// let items = list::<i32>();
/// let count = eval({
///     let items = items.clone();
///     move || items.len()
/// });
///
/// assert_eq!(count.get(), 0);
/// items.push(7);
/// assert!(items.is_dirty());
/// assert!(count.is_dirty());
/// assert_eq!(count.get(), 1);
/// ```
pub struct ReactiveList<T> {
    property: Property<Vec<T>>,
}

impl<T> Clone for ReactiveList<T> {
    fn clone(&self) -> Self {
        Self {
            property: self.property.clone(),
        }
    }
}

impl<T: 'static> ReactiveList<T> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Create a list holding `items`.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::with_options(items, PropertyOptions::default())
    }

    pub fn with_options(items: Vec<T>, options: PropertyOptions) -> Self {
        Self {
            property: Property::stored(items, options),
        }
    }

    fn mutate<R>(&self, op: &'static str, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        let out = self.property.modify(f);
        trace!(id = %self.property.id(), op, "list mutated");
        out
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Borrow the list through a closure.
    ///
    /// # Panics
    ///
    /// If `f` mutates this same list, since the contents stay borrowed
    /// while `f` runs.
    pub fn with<R>(&self, f: impl FnOnce(&Vec<T>) -> R) -> R {
        self.property.with(f)
    }

    pub fn try_with<R>(&self, f: impl FnOnce(&Vec<T>) -> R) -> Result<R> {
        self.property.try_with(f)
    }

    pub fn len(&self) -> usize {
        self.with(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.with(Vec::is_empty)
    }

    pub fn get(&self, index: usize) -> Option<T>
    where
        T: Clone,
    {
        self.with(|v| v.get(index).cloned())
    }

    pub fn first(&self) -> Option<T>
    where
        T: Clone,
    {
        self.with(|v| v.first().cloned())
    }

    pub fn last(&self) -> Option<T>
    where
        T: Clone,
    {
        self.with(|v| v.last().cloned())
    }

    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.with(|v| v.contains(item))
    }

    /// Position of the first element equal to `item`.
    pub fn index_of(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.with(|v| v.iter().position(|x| x == item))
    }

    /// Snapshot of the whole list.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.property.get()
    }

    // =========================================================================
    // MUTATE
    // =========================================================================

    pub fn push(&self, item: T) {
        self.mutate("push", |v| v.push(item));
    }

    pub fn pop(&self) -> Option<T> {
        self.mutate("pop", Vec::pop)
    }

    /// Insert at `index`, shifting later elements.
    ///
    /// # Panics
    ///
    /// If `index > len`.
    pub fn insert(&self, index: usize, item: T) {
        self.mutate("insert", |v| v.insert(index, item));
    }

    /// Remove and return the element at `index`.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds.
    pub fn remove(&self, index: usize) -> T {
        self.mutate("remove", |v| v.remove(index))
    }

    /// Remove the first element equal to `item`. Returns whether one was found.
    pub fn remove_item(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.mutate("remove_item", |v| match v.iter().position(|x| x == item) {
            Some(index) => {
                v.remove(index);
                true
            }
            None => false,
        })
    }

    /// Overwrite the element at `index`, returning the old one.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds.
    pub fn set(&self, index: usize, item: T) -> T {
        self.mutate("set", |v| std::mem::replace(&mut v[index], item))
    }

    pub fn clear(&self) {
        self.mutate("clear", Vec::clear);
    }

    pub fn extend(&self, items: impl IntoIterator<Item = T>) {
        self.mutate("extend", |v| v.extend(items));
    }

    pub fn retain(&self, f: impl FnMut(&T) -> bool) {
        self.mutate("retain", |v| v.retain(f));
    }

    pub fn truncate(&self, len: usize) {
        self.mutate("truncate", |v| v.truncate(len));
    }

    /// Replace the whole contents.
    pub fn replace(&self, items: impl IntoIterator<Item = T>) {
        self.mutate("replace", |v| *v = items.into_iter().collect());
    }

    /// Arbitrary in-place edit. Marks the list dirty afterwards.
    pub fn update<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
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

impl<T: 'static> Default for ReactiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> From<Vec<T>> for ReactiveList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: 'static> FromIterator<T> for ReactiveList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: 'static> Trackable for ReactiveList<T> {
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

impl<T: fmt::Debug> fmt::Debug for ReactiveList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveList")
            .field("property", &self.property)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
