// Divider Infrastructure - Division Backends
// Implements: Divider (native Rust arithmetic, C library through FFI)

pub mod ffi;
pub mod method;
pub mod native;

pub use ffi::FfiDivider;
pub use method::{select_divider, DividerMethod, UnknownMethod};
pub use native::NativeDivider;
