// ============================================================================
// reactive-properties - Ergonomic Macros
// ============================================================================

/// Helper macro to clone variables into a move closure.
///
/// Properties are cheap `Rc` handles; formulas need their own copies.
///
/// # Usage
///
/// ```rust
/// use reactive_properties::{cloned, eval, of};
///
/// let a = of(1);
/// let b = of(2);
///
/// let sum = eval(cloned!(a, b => move || a.get() + b.get()));
/// assert_eq!(sum.get(), 3);
/// ```
#[macro_export]
macro_rules! cloned {
    ($($n:ident),+ => $e:expr) => {
        {
            $( let $n = $n.clone(); )+
            $e
        }
    };
}

/// Create a formula property with automatic variable capturing.
///
/// Wraps `eval(cloned!(... => move || ...))`.
///
/// # Usage
///
/// ```rust
/// use reactive_properties::of;
///
/// let price = of(10);
/// let qty = of(2);
///
/// let total = reactive_properties::eval!(price, qty => price.get() * qty.get());
/// assert_eq!(total.get(), 20);
/// ```
#[macro_export]
macro_rules! eval {
    // Case 1: With dependencies
    ($($deps:ident),+ => $body:expr) => {
        $crate::eval($crate::cloned!($($deps),+ => move || $body))
    };
    // Case 2: No dependencies (just expression)
    ($body:expr) => {
        $crate::eval(move || $body)
    };
}
