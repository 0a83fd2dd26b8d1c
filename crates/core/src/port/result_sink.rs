// Result Sink Port
// Ordered output of job results (CSV file, test collector, ...)

use crate::domain::JobResult;
use async_trait::async_trait;
use thiserror::Error;

/// Result sink errors. Any of them is fatal for the run.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sink rejected result {id}: {message}")]
    Rejected { id: u64, message: String },
}

/// Result Sink trait
#[async_trait]
pub trait ResultSink: Send {
    /// Write one result
    async fn report(&mut self, result: &JobResult) -> Result<(), SinkError>;

    /// Flush buffered output. Called once after the last report.
    async fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Collecting sink; clones share the collected results
    #[derive(Clone, Default)]
    pub struct MockResultSink {
        results: Arc<Mutex<Vec<JobResult>>>,
        finished: Arc<Mutex<bool>>,
        fail_on: Option<usize>,
    }

    impl MockResultSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Reject the n-th (zero-based) report
        pub fn fail_on(mut self, n: usize) -> Self {
            self.fail_on = Some(n);
            self
        }

        /// Results reported so far, in arrival order
        pub fn results(&self) -> Vec<JobResult> {
            self.results.lock().unwrap().clone()
        }

        pub fn is_finished(&self) -> bool {
            *self.finished.lock().unwrap()
        }
    }

    #[async_trait]
    impl ResultSink for MockResultSink {
        async fn report(&mut self, result: &JobResult) -> Result<(), SinkError> {
            let mut results = self.results.lock().unwrap();
            if self.fail_on == Some(results.len()) {
                return Err(SinkError::Rejected {
                    id: result.id,
                    message: "mock sink is broken".to_string(),
                });
            }
            results.push(*result);
            Ok(())
        }

        async fn finish(&mut self) -> Result<(), SinkError> {
            *self.finished.lock().unwrap() = true;
            Ok(())
        }
    }
}
