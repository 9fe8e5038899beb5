// ============================================================================
// reactive-properties - Errors
// Failures surfaced by a read that had to recompute
// ============================================================================

use std::error::Error as StdError;
use std::sync::Arc;

use super::types::ValueId;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReactiveError>;

/// Why a read could not produce a value.
///
/// Whenever one of these is returned, the property that was being
/// recomputed stays dirty and its cached value is left untouched, so the
/// next read tries again from scratch.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReactiveError {
    /// A property was asked to recompute while it was already being
    /// evaluated further up the same call chain.
    #[error("cyclic dependency: {} read itself during its own evaluation", describe(.id, .label))]
    CyclicDependency { id: ValueId, label: Option<String> },

    /// A fallible evaluator returned an error.
    #[error("evaluator failed: {0}")]
    Evaluator(Arc<dyn StdError + Send + Sync>),

    /// Nested recomputation went past the tracker's depth limit.
    #[error("evaluation depth limit of {depth} exceeded")]
    DepthExceeded { depth: usize },
}

impl ReactiveError {
    /// Wrap an arbitrary error raised by an evaluator.
    pub fn evaluator<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        ReactiveError::Evaluator(Arc::new(err))
    }

    /// Wrap a plain message as an evaluator failure.
    pub fn message(msg: impl Into<String>) -> Self {
        let boxed: Box<dyn StdError + Send + Sync> = msg.into().into();
        ReactiveError::Evaluator(Arc::from(boxed))
    }

    /// True for `CyclicDependency`.
    pub fn is_cycle(&self) -> bool {
        matches!(self, ReactiveError::CyclicDependency { .. })
    }
}

impl From<Box<dyn StdError + Send + Sync>> for ReactiveError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        ReactiveError::Evaluator(Arc::from(err))
    }
}

fn describe(id: &ValueId, label: &Option<String>) -> String {
    match label {
        Some(label) => format!("property `{label}` ({id})"),
        None => format!("property {id}"),
    }
}

// =============================================================================
// TESTS
// =============================================================================
