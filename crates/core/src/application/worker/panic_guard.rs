// Panic isolation for worker safety
use std::panic::catch_unwind;
use tracing::error;

#[cfg(panic = "abort")]
compile_error!("the worker panic guard needs panic = \"unwind\"; do not set panic = \"abort\" in a profile");

/// Result of a panic-guarded execution
#[derive(Debug)]
pub enum PanicGuardResult<T> {
    /// Execution completed successfully
    Success(T),
    /// Execution panicked
    Panicked(String),
}

/// Execute a closure with panic isolation
///
/// If the closure panics, the panic is caught and returned as
/// PanicGuardResult::Panicked. A misbehaving division backend therefore
/// costs one invalid result instead of a pool worker.
///
/// # Example
/// ```text
/// let result = execute_guarded(|| {
///     // This panic will be caught
///     panic!("test panic");
/// });
///
/// match result {
///     PanicGuardResult::Panicked(msg) => {
///         println!("Caught panic: {}", msg);
///     }
///     _ => {}
/// }
/// ```
pub fn execute_guarded<F, T>(f: F) -> PanicGuardResult<T>
where
    F: FnOnce() -> T + std::panic::UnwindSafe,
{
    match catch_unwind(f) {
        Ok(result) => PanicGuardResult::Success(result),
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };

            error!(panic_msg = %panic_msg, "Worker task panicked");
            PanicGuardResult::Panicked(panic_msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_passes_value_through() {
        match execute_guarded(|| 21 * 2) {
            PanicGuardResult::Success(v) => assert_eq!(v, 42),
            PanicGuardResult::Panicked(msg) => panic!("unexpected panic: {msg}"),
        }
    }

    #[test]
    fn test_panic_message_is_captured() {
        let result: PanicGuardResult<()> = execute_guarded(|| panic!("boom {}", 7));
        match result {
            PanicGuardResult::Panicked(msg) => assert_eq!(msg, "boom 7"),
            PanicGuardResult::Success(_) => panic!("panic was not caught"),
        }
    }
}
