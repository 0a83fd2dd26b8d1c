// Domain Layer - Jobs, results and their failure modes

pub mod error;
pub mod job;

// Re-exports
pub use error::DivError;
pub use job::{Job, JobId, JobResult};
