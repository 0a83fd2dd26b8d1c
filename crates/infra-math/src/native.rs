// Native divider: checked Rust integer division

use divider_core::domain::DivError;
use divider_core::port::Divider;

/// Divides with built-in means, truncating toward zero
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeDivider;

impl Divider for NativeDivider {
    fn div(&self, a: i32, b: i32) -> Result<i32, DivError> {
        if b == 0 {
            return Err(DivError::DivisionByZero);
        }
        a.checked_div(b).ok_or(DivError::Overflow {
            dividend: a,
            divisor: b,
        })
    }
}
