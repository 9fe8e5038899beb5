// ============================================================================
// reactive-properties - Dependency Tracking
// Attributing reads to the evaluation that is currently in flight
// ============================================================================
//
// Each execution context (thread) owns one `DependencyTracker`: a stack of
// frames, one per recomputation in progress. Reading a property reports it
// to the top frame. When a nested recomputation finishes, its frame is
// merged into the one beneath it, so an outer property also depends on
// everything its inner reads depended on.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use crate::core::constants::DEFAULT_MAX_DEPTH;
use crate::core::error::{ReactiveError, Result};
use crate::core::types::{TrackableState, ValueId};

// =============================================================================
// FRAME
// =============================================================================

/// One in-flight evaluation's accumulating set of dependencies.
///
/// Keeps first-read order; duplicates are dropped by id.
#[derive(Debug, Default)]
struct Frame {
    /// Property being recomputed. `None` for an untracked region.
    owner: Option<ValueId>,
    /// Untracked frames swallow what is reported to them and are never merged.
    isolated: bool,
    seen: HashSet<ValueId>,
    deps: Vec<Rc<TrackableState>>,
}

impl Frame {
    fn add(&mut self, dep: Rc<TrackableState>) {
        if self.seen.insert(dep.id()) {
            self.deps.push(dep);
        }
    }
}

// =============================================================================
// DEPENDENCY TRACKER
// =============================================================================

/// Per-execution-context stack of dependency frames.
///
/// Usually reached through [`with_tracker`], which hands out the current
/// thread's instance. A standalone tracker can be created for tests.
#[derive(Debug)]
pub struct DependencyTracker {
    frames: RefCell<Vec<Frame>>,
    max_depth: Cell<usize>,
}

impl DependencyTracker {
    pub fn new() -> Self {
        Self {
            frames: RefCell::new(Vec::new()),
            max_depth: Cell::new(DEFAULT_MAX_DEPTH),
        }
    }

    /// Push an empty frame for `owner`'s recomputation.
    ///
    /// Fails if `owner` is already being evaluated somewhere below on this
    /// stack, or if the stack is already as deep as the configured limit.
    pub fn start_tracking(&self, owner: ValueId) -> Result<()> {
        let mut frames = self.frames.borrow_mut();

        if frames.iter().any(|f| f.owner == Some(owner)) {
            return Err(ReactiveError::CyclicDependency {
                id: owner,
                label: None,
            });
        }

        let depth = self.max_depth.get();
        if frames.len() >= depth {
            return Err(ReactiveError::DepthExceeded { depth });
        }

        frames.push(Frame {
            owner: Some(owner),
            ..Frame::default()
        });
        Ok(())
    }

    /// Push an isolated frame. Reads inside it are not attributed to any
    /// enclosing evaluation.
    pub fn start_untracked(&self) {
        self.frames.borrow_mut().push(Frame {
            isolated: true,
            ..Frame::default()
        });
    }

    /// Pop the top frame. Unless it is isolated, its dependencies are merged
    /// into the frame beneath it.
    pub fn stop_tracking(&self) {
        let mut frames = self.frames.borrow_mut();
        let Some(child) = frames.pop() else {
            return;
        };
        if child.isolated {
            return;
        }
        if let Some(parent) = frames.last_mut() {
            for dep in child.deps {
                parent.add(dep);
            }
        }
    }

    /// Record a read against the innermost active frame. No-op when nothing
    /// is being evaluated.
    pub fn report_dependency(&self, dep: Rc<TrackableState>) {
        if let Some(frame) = self.frames.borrow_mut().last_mut() {
            frame.add(dep);
        }
    }

    /// Contents of the top frame, in first-read order.
    pub fn current_dependencies(&self) -> Vec<Rc<TrackableState>> {
        self.frames
            .borrow()
            .last()
            .map(|f| f.deps.clone())
            .unwrap_or_default()
    }

    /// Number of frames on the stack.
    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Whether a read right now would be attributed to an evaluation.
    pub fn is_tracking(&self) -> bool {
        self.frames
            .borrow()
            .last()
            .is_some_and(|f| !f.isolated)
    }

    /// Whether `id` is one of the evaluations in flight.
    pub fn is_evaluating(&self, id: ValueId) -> bool {
        self.frames.borrow().iter().any(|f| f.owner == Some(id))
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth.get()
    }

    /// Change the nesting limit for this context.
    pub fn set_max_depth(&self, depth: usize) {
        self.max_depth.set(depth);
    }
}

impl Default for DependencyTracker {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// THREAD-LOCAL ACCESS
// =============================================================================

thread_local! {
    /// The tracker for this execution context
    static TRACKER: DependencyTracker = DependencyTracker::new();
}

/// Access the current thread's dependency tracker.
///
/// # Example
///
/// ```
/// use reactive_properties::with_tracker;
///
/// with_tracker(|t| t.set_max_depth(512));
/// assert_eq!(with_tracker(|t| t.max_depth()), 512);
/// ```
pub fn with_tracker<R>(f: impl FnOnce(&DependencyTracker) -> R) -> R {
    TRACKER.with(f)
}

/// Report a read of `dep` to the current thread's innermost evaluation.
pub fn report_dependency(dep: Rc<TrackableState>) {
    with_tracker(|t| t.report_dependency(dep));
}

/// Check if a read on this thread would currently be recorded.
pub fn is_tracking() -> bool {
    with_tracker(|t| t.is_tracking())
}

// =============================================================================
// TRACKING GUARD
// =============================================================================

/// An open frame on the current thread's tracker.
///
/// Dropping the guard stops tracking, so the frame is popped even if the
/// evaluator panics part way through.
pub(crate) struct TrackingFrame {
    _not_send: std::marker::PhantomData<*const ()>,
}

impl TrackingFrame {
    /// Start tracking for `state`'s recomputation.
    pub(crate) fn start(state: &TrackableState) -> Result<Self> {
        with_tracker(|t| t.start_tracking(state.id())).map_err(|err| match err {
            ReactiveError::CyclicDependency { id, .. } => ReactiveError::CyclicDependency {
                id,
                label: state.label().map(str::to_owned),
            },
            other => other,
        })?;
        Ok(Self {
            _not_send: std::marker::PhantomData,
        })
    }

    /// Start an untracked region.
    pub(crate) fn untracked() -> Self {
        with_tracker(|t| t.start_untracked());
        Self {
            _not_send: std::marker::PhantomData,
        }
    }

    /// What this frame has collected so far.
    pub(crate) fn dependencies(&self) -> Vec<Rc<TrackableState>> {
        with_tracker(|t| t.current_dependencies())
    }
}

impl Drop for TrackingFrame {
    fn drop(&mut self) {
        with_tracker(|t| t.stop_tracking());
    }
}

// =============================================================================
// TESTS
// =============================================================================
