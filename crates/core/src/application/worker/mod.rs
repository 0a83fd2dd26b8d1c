// Worker - Per-job division step executed inside the pool

pub mod constants;
mod cancellation;
mod panic_guard;

pub use cancellation::{cancel_channel, CancelSender, CancelToken};
pub use panic_guard::{execute_guarded, PanicGuardResult};

use crate::domain::{Job, JobId, JobResult};
use crate::port::Divider;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, trace, warn};

/// Envelope carrying a job and its pre-allocated result through the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkItem {
    pub job: Job,
    pub result: JobResult,
}

impl WorkItem {
    /// Fresh item for the job with the given sequence id
    pub fn new(id: JobId) -> Self {
        Self {
            job: Job::invalid(),
            result: JobResult::pending(id),
        }
    }
}

/// Applies the configured divider to work items
pub struct JobWorker {
    divider: Arc<dyn Divider>,
}

impl JobWorker {
    pub fn new(divider: Arc<dyn Divider>) -> Self {
        Self { divider }
    }

    /// Produce the result for one work item
    ///
    /// Invalid jobs come back as their zero-valued shell without touching
    /// the divider. Division failures are logged and yield `valid = false`.
    pub fn process(&self, item: WorkItem) -> JobResult {
        let WorkItem { job, mut result } = item;
        if !job.valid {
            trace!(job_id = result.id, "Skipping invalid job");
            return result;
        }

        let divider = &self.divider;
        match execute_guarded(AssertUnwindSafe(|| divider.div(job.arg1, job.arg2))) {
            PanicGuardResult::Success(Ok(quotient)) => {
                result.value = quotient;
                result.valid = true;
            }
            PanicGuardResult::Success(Err(e)) => {
                warn!(
                    job_id = result.id,
                    arg1 = job.arg1,
                    arg2 = job.arg2,
                    error = %e,
                    "Job result invalid"
                );
            }
            PanicGuardResult::Panicked(msg) => {
                error!(job_id = result.id, panic_msg = %msg, "Divider panicked, job result invalid");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::divider::mocks::MockDivider;

    fn item(id: JobId, job: Job) -> WorkItem {
        WorkItem {
            job,
            result: JobResult::pending(id),
        }
    }

    #[test]
    fn test_valid_job_is_divided() {
        let worker = JobWorker::new(Arc::new(MockDivider::new()));
        assert_eq!(worker.process(item(0, Job::new(128, -16))), JobResult::valid(0, -8));
    }

    #[test]
    fn test_invalid_job_skips_divider() {
        let divider = MockDivider::new();
        let worker = JobWorker::new(Arc::new(divider.clone()));

        let result = worker.process(WorkItem::new(5));

        assert_eq!(result, JobResult::pending(5));
        assert_eq!(divider.call_count(), 0);
    }

    #[test]
    fn test_division_by_zero_yields_invalid_zero() {
        let worker = JobWorker::new(Arc::new(MockDivider::new()));
        let result = worker.process(item(1, Job::new(1, 0)));
        assert_eq!(result, JobResult::pending(1));
    }

    #[test]
    fn test_overflow_yields_invalid_result() {
        let worker = JobWorker::new(Arc::new(MockDivider::new()));
        let result = worker.process(item(2, Job::new(i32::MIN, -1)));
        assert!(!result.valid);
        assert_eq!(result.value, 0);
    }

    #[test]
    fn test_divider_panic_is_contained() {
        let worker = JobWorker::new(Arc::new(MockDivider::new_panic_inducing()));
        let result = worker.process(item(3, Job::new(9, 0)));
        assert_eq!(result, JobResult::pending(3));
        // Worker stays usable after the panic
        assert_eq!(worker.process(item(4, Job::new(9, 3))), JobResult::valid(4, 3));
    }
}
