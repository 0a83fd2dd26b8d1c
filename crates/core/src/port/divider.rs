// Divider Port
// Pluggable arithmetic backend (native, C library, ...)

use crate::domain::DivError;

/// Division strategy
///
/// Implementations:
/// - NativeDivider: checked Rust integer division
/// - FfiDivider: C standard library `div()` through FFI
///
/// Workers call `div` concurrently, so implementations must not keep
/// shared mutable state.
pub trait Divider: Send + Sync {
    /// Divide `a` by `b`, truncating toward zero
    ///
    /// # Errors
    /// - DivError::DivisionByZero if `b == 0`
    /// - DivError::Overflow if the quotient does not fit into `i32`
    fn div(&self, a: i32, b: i32) -> Result<i32, DivError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Mock divider with native semantics that counts invocations
    #[derive(Clone, Default)]
    pub struct MockDivider {
        call_count: Arc<AtomicUsize>,
        panic_on_zero: bool,
    }

    impl MockDivider {
        pub fn new() -> Self {
            Self::default()
        }

        /// Panic instead of returning DivisionByZero (for panic isolation testing)
        pub fn new_panic_inducing() -> Self {
            Self {
                panic_on_zero: true,
                ..Self::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    impl Divider for MockDivider {
        fn div(&self, a: i32, b: i32) -> Result<i32, DivError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if b == 0 {
                if self.panic_on_zero {
                    panic!("mock divider asked to divide {} by zero", a);
                }
                return Err(DivError::DivisionByZero);
            }
            a.checked_div(b).ok_or(DivError::Overflow {
                dividend: a,
                divisor: b,
            })
        }
    }
}
