// FFI divider: C standard library `div()`
// reason: keeps a foreign-call backend interchangeable with the native one

use divider_core::domain::DivError;
use divider_core::port::Divider;
use std::os::raw::c_int;

/// `div_t` from <stdlib.h>
#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct DivT {
    quot: c_int,
    rem: c_int,
}

extern "C" {
    #[link_name = "div"]
    fn c_div(numer: c_int, denom: c_int) -> DivT;
}

/// Divides by calling into the C runtime
///
/// The C call has undefined behaviour for a zero divisor and for
/// `INT_MIN / -1`, so both are rejected before crossing the boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfiDivider;

impl Divider for FfiDivider {
    fn div(&self, a: i32, b: i32) -> Result<i32, DivError> {
        if b == 0 {
            return Err(DivError::DivisionByZero);
        }
        if a == i32::MIN && b == -1 {
            return Err(DivError::Overflow {
                dividend: a,
                divisor: b,
            });
        }
        // SAFETY: `div` is a pure libc function; both UB inputs are excluded above
        let result = unsafe { c_div(a, b) };
        debug_assert_eq!(result.quot.wrapping_mul(b).wrapping_add(result.rem), a);
        Ok(result.quot)
    }
}
