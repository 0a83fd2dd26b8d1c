// Domain Error Types

use thiserror::Error;

/// Failure of a single division. Always recoverable at the job level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DivError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Quotient overflows: {dividend} / {divisor}")]
    Overflow { dividend: i32, divisor: i32 },
}
