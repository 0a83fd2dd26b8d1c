// Job Source Port
// Streaming intake of jobs (JSON file, test fixture, ...)

use crate::domain::Job;
use async_trait::async_trait;
use thiserror::Error;

/// Job source errors
///
/// Only `InvalidJob` is recoverable: the job is reported as invalid and
/// intake continues. Everything else ends the run.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Invalid job: {0}")]
    InvalidJob(String),

    #[error("Malformed job stream at offset {offset}: {message}")]
    Malformed { offset: u64, message: String },

    #[error("Unexpected end of job stream")]
    UnexpectedEof,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    /// Whether intake may continue past this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SourceError::InvalidJob(_))
    }
}

/// Job Source trait
///
/// The processor calls `more` before every `next`. A source that hits a
/// framing problem while peeking should answer `true` and report the
/// problem from the following `next` call.
#[async_trait]
pub trait JobSource: Send {
    /// Report whether another job is available
    async fn more(&mut self) -> bool;

    /// Decode the next job into `job`
    ///
    /// On success the source sets `job.valid`. On a recoverable error the
    /// slot content is unspecified and the processor marks it invalid.
    ///
    /// # Errors
    /// - SourceError::InvalidJob for a single undecodable job
    /// - SourceError::Malformed / UnexpectedEof / Io for a broken stream
    async fn next(&mut self, job: &mut Job) -> Result<(), SourceError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Failure injected by MockJobSource
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MockFailure {
        /// Per-job decode error, intake continues
        Recoverable,
        /// Broken stream, intake stops
        Fatal,
    }

    /// Scripted job source
    pub struct MockJobSource {
        jobs: Vec<Job>,
        position: usize,
        fail_on: Option<(usize, MockFailure)>,
        fail_every: Option<(usize, MockFailure)>,
        delay: Option<Duration>,
        pulled: Arc<AtomicUsize>,
    }

    impl MockJobSource {
        pub fn new(jobs: Vec<Job>) -> Self {
            Self {
                jobs,
                position: 0,
                fail_on: None,
                fail_every: None,
                delay: None,
                pulled: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Source producing `count` copies of `arg1 / arg2`
        pub fn repeat(count: usize, arg1: i32, arg2: i32) -> Self {
            Self::new(vec![Job::new(arg1, arg2); count])
        }

        /// Fail the n-th (zero-based) `next` call
        pub fn fail_on(mut self, n: usize, failure: MockFailure) -> Self {
            self.fail_on = Some((n, failure));
            self
        }

        /// Fail every n-th `next` call, starting with the first
        pub fn fail_every(mut self, n: usize, failure: MockFailure) -> Self {
            self.fail_every = Some((n.max(1), failure));
            self
        }

        /// Sleep before decoding each job
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Shared counter of `next` calls, readable after the source moved
        pub fn pulled(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.pulled)
        }

        fn failure_for(&self, call: usize) -> Option<MockFailure> {
            if let Some((every, failure)) = self.fail_every {
                if call % every == 0 {
                    return Some(failure);
                }
            }
            match self.fail_on {
                Some((n, failure)) if n == call => Some(failure),
                _ => None,
            }
        }
    }

    #[async_trait]
    impl JobSource for MockJobSource {
        async fn more(&mut self) -> bool {
            self.position < self.jobs.len()
        }

        async fn next(&mut self, job: &mut Job) -> Result<(), SourceError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let call = self.pulled.fetch_add(1, Ordering::SeqCst);
            let Some(scripted) = self.jobs.get(self.position) else {
                return Err(SourceError::UnexpectedEof);
            };
            *job = *scripted;
            self.position += 1;

            match self.failure_for(call) {
                Some(MockFailure::Recoverable) => {
                    Err(SourceError::InvalidJob(format!("mock failure on call {call}")))
                }
                Some(MockFailure::Fatal) => Err(SourceError::Malformed {
                    offset: call as u64,
                    message: "mock fatal failure".to_string(),
                }),
                None => Ok(()),
            }
        }
    }
}
