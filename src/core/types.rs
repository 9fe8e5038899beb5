// ============================================================================
// reactive-properties - Type Definitions
// Identifiers, the shared dirty/clean record, and the Trackable capability
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::clock::Timestamp;
use super::constants::FIRST_VALUE_ID;

// =============================================================================
// VALUE IDENTIFIERS
// =============================================================================

static NEXT_ID: AtomicU64 = AtomicU64::new(FIRST_VALUE_ID);

/// Stable, process-unique identity of a trackable value.
///
/// Frames de-duplicate dependencies by id, and cycle detection compares the
/// id of the property about to recompute against the ids of the evaluations
/// already in flight.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueId(u64);

impl ValueId {
    /// Allocate a fresh identifier.
    pub fn next() -> Self {
        ValueId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuild an id from its raw value (diagnostics and tests).
    pub fn from_raw(raw: u64) -> Self {
        ValueId(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueId({})", self.0)
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// TRACKABLE CAPABILITY
// =============================================================================
//
// Everything that takes part in the graph has a dirty/clean lifecycle and a
// list of what it read last time. The graph only ever needs those two things,
// never the value type, so the tracker and the dirtiness walk operate on
// `TrackableState` and the public handles expose them through this trait.
// =============================================================================

/// Dirty/clean lifecycle shared by properties and reactive collections.
pub trait Trackable {
    /// Identity of this value.
    fn id(&self) -> ValueId;

    /// Optional debugging label.
    fn label(&self) -> Option<String>;

    /// Whether the cached value is stale, either because this value was
    /// invalidated or because something it last read changed afterwards.
    fn is_dirty(&self) -> bool;

    /// Invalidate this value. The next read recomputes it.
    fn mark_dirty(&self);

    /// Most recent invalidation.
    fn dirty_since(&self) -> Timestamp;

    /// Most recent successful recomputation.
    fn recalculated_at(&self) -> Timestamp;

    /// Ids of the values read during the last recomputation.
    fn dependency_ids(&self) -> Vec<ValueId>;
}

// =============================================================================
// TRACKABLE STATE
// =============================================================================

thread_local! {
    /// Latest `mark_dirty` on this thread. A value recomputed after it cannot
    /// have a stale dependency: every dependency existed before the
    /// recomputation read it, so only a later invalidation can move its
    /// `dirty_since` past the value's `recalculated_at`. Values never leave
    /// their thread, so the per-thread marker covers all of them.
    static LAST_INVALIDATION: Cell<Timestamp> = const { Cell::new(Timestamp::EPOCH) };
}

/// The dirty/clean record composed into every trackable value.
///
/// Holds two timestamps and the dependency list. Invalidation advances
/// `dirty_since`, recomputation advances `recalculated_at`; each transition
/// moves exactly one of them, and both only ever grow.
///
/// Not synchronised. Handles holding it are `Rc`-based and therefore pinned
/// to the thread that created them.
pub struct TrackableState {
    id: ValueId,
    label: Option<String>,
    dirty_since: Cell<Timestamp>,
    recalculated_at: Cell<Timestamp>,
    dependencies: RefCell<Vec<Rc<TrackableState>>>,
}

impl TrackableState {
    /// Create a new state. It starts dirty.
    pub fn new(label: Option<String>) -> Self {
        Self {
            id: ValueId::next(),
            label,
            dirty_since: Cell::new(Timestamp::now()),
            recalculated_at: Cell::new(Timestamp::EPOCH),
            dependencies: RefCell::new(Vec::new()),
        }
    }

    pub fn id(&self) -> ValueId {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn dirty_since(&self) -> Timestamp {
        self.dirty_since.get()
    }

    pub fn recalculated_at(&self) -> Timestamp {
        self.recalculated_at.get()
    }

    /// Clean → Dirty.
    pub fn mark_dirty(&self) {
        let now = Timestamp::now();
        self.dirty_since.set(now);
        LAST_INVALIDATION.with(|last| last.set(now));
    }

    /// Dirty → Clean. Only a read-triggered recomputation calls this.
    pub fn mark_clean(&self) {
        self.recalculated_at.set(Timestamp::now());
    }

    /// Whether the value is stale.
    ///
    /// A value that is stale only because of something it read gets its own
    /// `dirty_since` bumped as well, so inspecting it shows the same answer
    /// as the walk.
    pub fn is_dirty(&self) -> bool {
        let since = self.recalculated_at.get();
        if self.dirty_since.get() > since {
            return true;
        }
        // Nothing on this thread was invalidated since the last recomputation.
        if LAST_INVALIDATION.with(Cell::get) <= since {
            return false;
        }

        let stale = self.changed_after(since);
        if stale {
            self.mark_dirty();
        }
        stale
    }

    /// Did anything this value last read, directly or transitively, get
    /// invalidated after `t`?
    ///
    /// Iterative so that long chains cannot exhaust the stack.
    fn changed_after(&self, t: Timestamp) -> bool {
        let mut visited = HashSet::from([self.id]);
        let mut pending: Vec<Rc<TrackableState>> =
            self.dependencies.borrow().iter().cloned().collect();

        while let Some(dep) = pending.pop() {
            if !visited.insert(dep.id) {
                continue;
            }
            if dep.dirty_since.get() > t {
                return true;
            }
            pending.extend(dep.dependencies.borrow().iter().cloned());
        }
        false
    }

    /// Replace the dependency list with what the last evaluation read.
    pub fn set_dependencies(&self, deps: Vec<Rc<TrackableState>>) {
        *self.dependencies.borrow_mut() = deps;
    }

    pub fn dependency_count(&self) -> usize {
        self.dependencies.borrow().len()
    }

    pub fn dependency_ids(&self) -> Vec<ValueId> {
        self.dependencies.borrow().iter().map(|d| d.id).collect()
    }
}

impl Trackable for TrackableState {
    fn id(&self) -> ValueId {
        self.id
    }

    fn label(&self) -> Option<String> {
        self.label.clone()
    }

    fn is_dirty(&self) -> bool {
        TrackableState::is_dirty(self)
    }

    fn mark_dirty(&self) {
        TrackableState::mark_dirty(self)
    }

    fn dirty_since(&self) -> Timestamp {
        self.dirty_since.get()
    }

    fn recalculated_at(&self) -> Timestamp {
        self.recalculated_at.get()
    }

    fn dependency_ids(&self) -> Vec<ValueId> {
        TrackableState::dependency_ids(self)
    }
}

impl fmt::Debug for TrackableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackableState")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("dirty_since", &self.dirty_since.get())
            .field("recalculated_at", &self.recalculated_at.get())
            .field("dependencies", &self.dependency_ids())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
