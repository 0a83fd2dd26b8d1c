// Divider selection at startup

use crate::{FfiDivider, NativeDivider};
use divider_core::port::Divider;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Available division backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DividerMethod {
    Native,
    #[default]
    Ffi,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown divider method: {0} (expected one of: native, ffi)")]
pub struct UnknownMethod(pub String);

impl FromStr for DividerMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "ffi" => Ok(DividerMethod::Ffi),
            "native" => Ok(DividerMethod::Native),
            other => Err(UnknownMethod(other.to_string())),
        }
    }
}

impl fmt::Display for DividerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DividerMethod::Native => write!(f, "native"),
            DividerMethod::Ffi => write!(f, "ffi"),
        }
    }
}

/// Instantiate the backend for `method`
pub fn select_divider(method: DividerMethod) -> Arc<dyn Divider> {
    debug!(method = %method, "Selected divider backend");
    match method {
        DividerMethod::Native => Arc::new(NativeDivider),
        DividerMethod::Ffi => Arc::new(FfiDivider),
    }
}
