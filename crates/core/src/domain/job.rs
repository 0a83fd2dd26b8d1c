// Job Domain Model

use std::fmt;

/// Sequence number of a job within one run (zero-based, dense)
pub type JobId = u64;

/// One unit of work: `arg1 / arg2`.
///
/// `valid` is set by the job source once the job decoded cleanly. Invalid
/// jobs still get an id and a result, but never reach a divider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Job {
    pub arg1: i32,
    pub arg2: i32,
    pub valid: bool,
}

impl Job {
    /// Create a job that is ready for division
    pub fn new(arg1: i32, arg2: i32) -> Self {
        Self {
            arg1,
            arg2,
            valid: true,
        }
    }

    /// Create a placeholder for a job that failed to decode
    pub fn invalid() -> Self {
        Self::default()
    }
}

/// Outcome of one job. `id` equals the job's position in the input stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobResult {
    pub id: JobId,
    pub value: i32,
    pub valid: bool,
}

impl JobResult {
    /// Zero-valued, invalid shell for the job with the given id
    pub fn pending(id: JobId) -> Self {
        Self {
            id,
            value: 0,
            valid: false,
        }
    }

    pub fn valid(id: JobId, value: i32) -> Self {
        Self {
            id,
            value,
            valid: true,
        }
    }
}

impl fmt::Display for JobResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.id, self.value, self.valid)
    }
}
