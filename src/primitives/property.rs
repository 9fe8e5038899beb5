// ============================================================================
// reactive-properties - Computed Property
// A value that knows when it is stale and recomputes itself on read
// ============================================================================
//
// A property pairs a TrackableState with an evaluator and a cached value.
// Reading it recomputes at most once per invalidation, records what the
// evaluator read, and reports the property itself to whoever is reading.
// ============================================================================

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::core::clock::Timestamp;
use crate::core::error::{ReactiveError, Result};
use crate::core::types::{Trackable, TrackableState, ValueId};
use crate::reactivity::tracking::{report_dependency, TrackingFrame};
use crate::reactivity::untrack::untrack;

// =============================================================================
// OPTIONS
// =============================================================================

/// Construction options for a property.
#[derive(Debug, Clone, Default)]
pub struct PropertyOptions {
    /// Name shown in `Debug` output, tracing events and cycle errors.
    pub label: Option<String>,
}

impl PropertyOptions {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }
}

// =============================================================================
// EVALUATOR
// =============================================================================

type Formula<T> = Rc<dyn Fn() -> Result<T>>;

/// How a property produces its value.
enum Evaluator<T> {
    /// A value assigned directly. Moved into the cache by the next
    /// recomputation; once taken, recomputing keeps the cache as it is.
    Constant(Option<T>),
    /// A formula, run on every recomputation.
    Formula(Formula<T>),
}

// =============================================================================
// PROPERTY INNER
// =============================================================================

/// The shared data behind a [`Property`] handle.
pub(crate) struct PropertyInner<T> {
    state: Rc<TrackableState>,
    evaluator: RefCell<Evaluator<T>>,
    /// Last computed value; current only while the state is clean.
    value: RefCell<Option<T>>,
}

impl<T: 'static> PropertyInner<T> {
    fn new(evaluator: Evaluator<T>, value: Option<T>, options: PropertyOptions) -> Self {
        Self {
            state: Rc::new(TrackableState::new(options.label)),
            evaluator: RefCell::new(evaluator),
            value: RefCell::new(value),
        }
    }

    /// Recompute if dirty.
    fn refresh(&self) -> Result<()> {
        if !self.state.is_dirty() {
            return Ok(());
        }

        let frame = TrackingFrame::start(&self.state).inspect_err(|err| {
            debug!(id = %self.state.id(), label = ?self.state.label(), %err, "recomputation refused");
        })?;
        let started = Timestamp::now();
        let produced = self.evaluate();
        let deps = frame.dependencies();
        drop(frame);

        let next = produced.inspect_err(|err| {
            debug!(id = %self.state.id(), label = ?self.state.label(), %err, "evaluator failed");
        })?;
        if let Some(value) = next {
            *self.value.borrow_mut() = Some(value);
        }

        // Something the evaluator read (or this property itself) was
        // invalidated after it had been brought up to date.
        let invalidated = self.state.dirty_since() > started
            || deps
                .iter()
                .any(|dep| dep.dirty_since() > dep.recalculated_at());

        trace!(
            id = %self.state.id(),
            label = ?self.state.label(),
            deps = deps.len(),
            "recomputed property"
        );
        self.state.set_dependencies(deps);
        self.state.mark_clean();
        if invalidated {
            self.state.mark_dirty();
        }
        Ok(())
    }

    /// Run the evaluator without holding any borrow across the call, so
    /// the formula is free to read or assign other properties.
    fn evaluate(&self) -> Result<Option<T>> {
        let formula = match &mut *self.evaluator.borrow_mut() {
            Evaluator::Constant(pending) => return Ok(pending.take()),
            Evaluator::Formula(formula) => Rc::clone(formula),
        };
        formula().map(Some)
    }

    /// The read accessor: refresh, then report to the caller's frame.
    fn read(&self) -> Result<()> {
        self.refresh()?;
        report_dependency(Rc::clone(&self.state));
        Ok(())
    }

    fn with_cached<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self.value.borrow();
        f(value.as_ref().expect("property read before its first evaluation"))
    }

    fn assign(&self, evaluator: Evaluator<T>) {
        *self.evaluator.borrow_mut() = evaluator;
        self.state.mark_dirty();
    }
}

// =============================================================================
// PROPERTY<T>
// =============================================================================

/// A self-memoizing reactive value.
///
/// Built either from a constant or from a formula. Reads recompute lazily:
/// only when the property is dirty, only once per invalidation, and only
/// as the direct result of the read. Cloning a `Property` yields another
/// handle to the same value.
///
/// Handles are `!Send`; a property lives on the thread that created it.
///
/// # Example
///
/// ```
/// use reactive_properties::{eval, of};
///
/// let price = of(10);
/// let qty = of(2);
/// let total = eval({
///     let (price, qty) = (price.clone(), qty.clone());
///     move || price.get() * qty.get()
/// });
///
/// assert_eq!(total.get(), 20);
/// qty.set(3);
/// assert!(total.is_dirty());
/// assert_eq!(total.get(), 30);
/// ```
pub struct Property<T> {
    inner: Rc<PropertyInner<T>>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> Property<T> {
    /// A property holding a fixed value.
    pub fn new(value: T) -> Self {
        Self::new_with_options(value, PropertyOptions::default())
    }

    pub fn new_with_options(value: T, options: PropertyOptions) -> Self {
        Self::from_inner(PropertyInner::new(
            Evaluator::Constant(Some(value)),
            None,
            options,
        ))
    }

    /// A property computed by `f`. `f` does not run until the first read.
    pub fn formula<F>(f: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        Self::formula_with_options(f, PropertyOptions::default())
    }

    pub fn formula_with_options<F>(f: F, options: PropertyOptions) -> Self
    where
        F: Fn() -> T + 'static,
    {
        Self::from_inner(PropertyInner::new(
            Evaluator::Formula(Rc::new(move || Ok(f()))),
            None,
            options,
        ))
    }

    /// A property computed by a fallible `f`. Errors surface from
    /// [`try_get`](Self::try_get) and leave the property dirty.
    pub fn try_formula<F, E>(f: F) -> Self
    where
        F: Fn() -> std::result::Result<T, E> + 'static,
        E: Into<ReactiveError>,
    {
        Self::try_formula_with_options(f, PropertyOptions::default())
    }

    pub fn try_formula_with_options<F, E>(f: F, options: PropertyOptions) -> Self
    where
        F: Fn() -> std::result::Result<T, E> + 'static,
        E: Into<ReactiveError>,
    {
        Self::from_inner(PropertyInner::new(
            Evaluator::Formula(Rc::new(move || f().map_err(Into::into))),
            None,
            options,
        ))
    }

    /// A property whose cache is the storage itself. Recomputing keeps the
    /// stored value; callers mutate it with [`modify`](Self::modify).
    pub(crate) fn stored(value: T, options: PropertyOptions) -> Self {
        Self::from_inner(PropertyInner::new(
            Evaluator::Constant(None),
            Some(value),
            options,
        ))
    }

    fn from_inner(inner: PropertyInner<T>) -> Self {
        Self {
            inner: Rc::new(inner),
        }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Read the value, recomputing first if dirty.
    ///
    /// Reports this property as a dependency of the enclosing evaluation.
    ///
    /// # Panics
    ///
    /// When [`try_get`](Self::try_get) would return an error.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        match self.try_get() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Read the value, returning recomputation failures instead of panicking.
    pub fn try_get(&self) -> Result<T>
    where
        T: Clone,
    {
        self.try_with(T::clone)
    }

    /// Borrow the value through a closure (no clone).
    ///
    /// # Panics
    ///
    /// When recomputation fails, or when `f` writes to this same property
    /// and reads it back: the cached value stays borrowed while `f` runs.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match self.try_with(f) {
            Ok(out) => out,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        self.inner.read()?;
        Ok(self.inner.with_cached(f))
    }

    /// Read without becoming a dependency of the enclosing evaluation.
    pub fn peek(&self) -> T
    where
        T: Clone,
    {
        untrack(|| self.get())
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Assign a fixed value, discarding any formula.
    pub fn set(&self, value: T) {
        self.inner.assign(Evaluator::Constant(Some(value)));
    }

    /// Replace the evaluator with a new formula.
    pub fn set_formula<F>(&self, f: F)
    where
        F: Fn() -> T + 'static,
    {
        self.inner
            .assign(Evaluator::Formula(Rc::new(move || Ok(f()))));
    }

    /// Replace the evaluator with a new fallible formula.
    pub fn set_try_formula<F, E>(&self, f: F)
    where
        F: Fn() -> std::result::Result<T, E> + 'static,
        E: Into<ReactiveError>,
    {
        self.inner
            .assign(Evaluator::Formula(Rc::new(move || f().map_err(Into::into))));
    }

    /// Mark dirty without changing the evaluator. The next read reruns it.
    pub fn invalidate(&self) {
        self.inner.state.mark_dirty();
    }

    /// Edit the stored value in place and mark dirty, bypassing the
    /// evaluator. Only meaningful for [`stored`](Self::stored) properties.
    pub(crate) fn modify<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let out = {
            let mut slot = self.inner.value.borrow_mut();
            f(slot.as_mut().expect("stored property has no value"))
        };
        self.inner.state.mark_dirty();
        out
    }

    // =========================================================================
    // INTROSPECTION
    // =========================================================================

    pub fn id(&self) -> ValueId {
        self.inner.state.id()
    }

    pub fn label(&self) -> Option<&str> {
        self.inner.state.label()
    }

    /// Whether the next read will recompute.
    pub fn is_dirty(&self) -> bool {
        self.inner.state.is_dirty()
    }

    pub fn dirty_since(&self) -> Timestamp {
        self.inner.state.dirty_since()
    }

    pub fn recalculated_at(&self) -> Timestamp {
        self.inner.state.recalculated_at()
    }

    /// Ids of what the last recomputation read.
    pub fn dependency_ids(&self) -> Vec<ValueId> {
        self.inner.state.dependency_ids()
    }

    /// The shared dirty/clean record (for graph-level inspection).
    pub fn state(&self) -> &Rc<TrackableState> {
        &self.inner.state
    }

    /// Whether two handles refer to the same property.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: 'static> Trackable for Property<T> {
    fn id(&self) -> ValueId {
        Property::id(self)
    }

    fn label(&self) -> Option<String> {
        Property::label(self).map(str::to_owned)
    }

    fn is_dirty(&self) -> bool {
        Property::is_dirty(self)
    }

    fn mark_dirty(&self) {
        self.invalidate();
    }

    fn dirty_since(&self) -> Timestamp {
        Property::dirty_since(self)
    }

    fn recalculated_at(&self) -> Timestamp {
        Property::recalculated_at(self)
    }

    fn dependency_ids(&self) -> Vec<ValueId> {
        Property::dependency_ids(self)
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = &self.inner.state;
        let mut out = f.debug_struct("Property");
        out.field("id", &state.id());
        if let Some(label) = state.label() {
            out.field("label", &label);
        }
        // Never forces an evaluation.
        match self.inner.value.try_borrow() {
            Ok(cached) => out.field("cached", &*cached),
            Err(_) => out.field("cached", &"<borrowed>"),
        };
        out.finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactivity::tracking::with_tracker;
    use std::cell::Cell;

    fn counter() -> Rc<Cell<u32>> {
        Rc::new(Cell::new(0))
    }

    #[test]
    fn constant_property_reads_back() {
        let p = Property::new(5);
        assert!(p.is_dirty());
        assert_eq!(p.get(), 5);
        assert!(!p.is_dirty());
    }

    #[test]
    fn formula_is_lazy() {
        let runs = counter();
        let r = runs.clone();
        let p = Property::formula(move || {
            r.set(r.get() + 1);
            1
        });
        assert_eq!(runs.get(), 0);
        assert_eq!(p.get(), 1);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn clean_reads_are_memoized() {
        let runs = counter();
        let r = runs.clone();
        let p = Property::formula(move || {
            r.set(r.get() + 1);
            String::from("x")
        });
        assert_eq!(p.get(), "x");
        let stamp = p.recalculated_at();
        assert_eq!(p.get(), "x");
        assert_eq!(p.get(), "x");
        assert_eq!(runs.get(), 1);
        assert_eq!(p.recalculated_at(), stamp);
    }

    #[test]
    fn set_replaces_formula() {
        let source = Property::new(1);
        let s = source.clone();
        let p = Property::formula(move || s.get() * 10);
        assert_eq!(p.get(), 10);

        p.set(7);
        assert!(p.is_dirty());
        assert_eq!(p.get(), 7);

        // No longer follows `source`.
        source.set(2);
        assert!(!p.is_dirty());
        assert_eq!(p.get(), 7);
        assert!(p.dependency_ids().is_empty());
    }

    #[test]
    fn set_formula_replaces_constant() {
        let a = Property::new(3);
        let p = Property::new(0);
        assert_eq!(p.get(), 0);

        let a2 = a.clone();
        p.set_formula(move || a2.get() + 1);
        assert_eq!(p.get(), 4);
        assert_eq!(p.dependency_ids(), vec![a.id()]);
    }

    #[test]
    fn invalidate_reruns_formula() {
        let runs = counter();
        let r = runs.clone();
        let p = Property::formula(move || {
            r.set(r.get() + 1);
            r.get()
        });
        assert_eq!(p.get(), 1);
        p.invalidate();
        assert_eq!(p.get(), 2);
    }

    #[test]
    fn fallible_formula_error_leaves_dirty() {
        let fail = Rc::new(Cell::new(true));
        let f = fail.clone();
        let p = Property::try_formula(move || {
            if f.get() {
                Err(ReactiveError::message("not yet"))
            } else {
                Ok(9)
            }
        });

        let err = p.try_get().unwrap_err();
        assert_eq!(err.to_string(), "evaluator failed: not yet");
        assert!(p.is_dirty());
        assert_eq!(with_tracker(|t| t.depth()), 0);

        fail.set(false);
        assert_eq!(p.try_get().unwrap(), 9);
        assert!(!p.is_dirty());
    }

    #[test]
    fn failed_recompute_keeps_previous_cache() {
        let input = Property::new(4_i32);
        let i = input.clone();
        let p = Property::try_formula(move || {
            let v = i.get();
            if v < 0 {
                Err(ReactiveError::message("negative"))
            } else {
                Ok(v * 2)
            }
        });
        assert_eq!(p.get(), 8);

        input.set(-1);
        assert!(p.try_get().is_err());
        assert!(format!("{p:?}").contains("Some(8)"));
    }

    #[test]
    fn panicking_formula_leaves_dirty_and_stack_clean() {
        let p = Property::formula(|| -> i32 { panic!("boom") });
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| p.get()));
        assert!(result.is_err());
        assert!(p.is_dirty());
        assert_eq!(with_tracker(|t| t.depth()), 0);
    }

    #[test]
    fn self_read_is_a_cycle() {
        let slot: Rc<RefCell<Option<Property<i32>>>> = Rc::new(RefCell::new(None));
        let s = slot.clone();
        let p = Property::try_formula_with_options(
            move || {
                let me = s.borrow().clone().expect("installed");
                me.try_get().map(|v| v + 1)
            },
            PropertyOptions::labeled("loop"),
        );
        *slot.borrow_mut() = Some(p.clone());

        let err = p.try_get().unwrap_err();
        assert!(err.is_cycle());
        assert!(err.to_string().contains("`loop`"));
        assert!(p.is_dirty());

        slot.borrow_mut().take();
    }

    #[test]
    fn mutual_recursion_is_a_cycle() {
        let slot: Rc<RefCell<Option<Property<i32>>>> = Rc::new(RefCell::new(None));
        let s = slot.clone();
        let a = Property::try_formula(move || {
            let b = s.borrow().clone().expect("installed");
            b.try_get()
        });
        let a2 = a.clone();
        let b = Property::try_formula(move || a2.try_get());
        *slot.borrow_mut() = Some(b.clone());

        assert!(a.try_get().unwrap_err().is_cycle());
        assert!(b.try_get().unwrap_err().is_cycle());

        slot.borrow_mut().take();
    }

    #[test]
    #[should_panic(expected = "cyclic dependency")]
    fn get_panics_on_cycle() {
        let slot: Rc<RefCell<Option<Property<i32>>>> = Rc::new(RefCell::new(None));
        let s = slot.clone();
        let p = Property::formula(move || s.borrow().clone().expect("installed").get());
        *slot.borrow_mut() = Some(p.clone());
        p.get();
    }

    #[test]
    fn depth_limit_surfaces_as_error() {
        with_tracker(|t| t.set_max_depth(3));

        let mut chain = vec![Property::new(0)];
        for _ in 0..5 {
            let prev = chain.last().cloned().expect("non-empty");
            chain.push(Property::try_formula(move || prev.try_get().map(|v| v + 1)));
        }
        let top = chain.last().cloned().expect("non-empty");

        assert!(matches!(
            top.try_get(),
            Err(ReactiveError::DepthExceeded { depth: 3 })
        ));

        with_tracker(|t| t.set_max_depth(crate::core::constants::DEFAULT_MAX_DEPTH));
        assert_eq!(top.get(), 5);
    }

    #[test]
    fn read_reports_to_callers_frame() {
        let a = Property::new(1);
        let owner = TrackableState::new(None);
        let frame = TrackingFrame::start(&owner).unwrap();
        a.get();
        assert_eq!(
            frame.dependencies().iter().map(|d| d.id()).collect::<Vec<_>>(),
            vec![a.id()]
        );
    }

    #[test]
    fn peek_does_not_register() {
        let a = Property::new(1);
        let b = Property::new(2);
        let (a2, b2) = (a.clone(), b.clone());
        let sum = Property::formula(move || a2.get() + b2.peek());
        assert_eq!(sum.get(), 3);
        assert_eq!(sum.dependency_ids(), vec![a.id()]);
    }

    #[test]
    fn write_to_dependency_during_evaluation_keeps_dirty() {
        let hits = Property::new(0);
        let h = hits.clone();
        let p = Property::formula(move || {
            let n = h.get();
            h.set(n + 1);
            n
        });
        assert_eq!(p.get(), 0);
        assert!(p.is_dirty());
        assert_eq!(p.get(), 1);
    }

    #[test]
    fn with_borrows_without_clone() {
        let p = Property::new(vec![1, 2, 3]);
        assert_eq!(p.with(|v| v.iter().sum::<i32>()), 6);
    }

    #[test]
    fn clones_share_state() {
        let p = Property::new(1);
        let q = p.clone();
        assert!(p.ptr_eq(&q));
        q.set(2);
        assert_eq!(p.get(), 2);
    }

    #[test]
    fn trackable_trait_view() {
        let p = Property::new_with_options(1, PropertyOptions::labeled("one"));
        let t: &dyn Trackable = &p;
        assert_eq!(t.label().as_deref(), Some("one"));
        assert!(t.is_dirty());
        p.get();
        assert!(!t.is_dirty());
        t.mark_dirty();
        assert!(p.is_dirty());
    }

    #[test]
    fn debug_does_not_evaluate() {
        let runs = counter();
        let r = runs.clone();
        let p = Property::formula_with_options(
            move || {
                r.set(r.get() + 1);
                1
            },
            PropertyOptions::labeled("lazy"),
        );
        let text = format!("{p:?}");
        assert!(text.contains("lazy"));
        assert!(text.contains("None"));
        assert_eq!(runs.get(), 0);
    }
}
