// Central Error Type for the Pipeline

use crate::port::{SinkError, SourceError};
use thiserror::Error;

/// Pipeline-level error type
///
/// The `*NotConfigured` variants are reported before anything is spawned,
/// in the order source, sink, logger, divider.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Job source not configured")]
    JobSourceNotConfigured,

    #[error("Result sink not configured")]
    ResultSinkNotConfigured,

    #[error("Logger not configured")]
    LoggerNotConfigured,

    #[error("Divider not configured")]
    DividerNotConfigured,

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("Job source failed: {0}")]
    Source(#[from] SourceError),

    #[error("Result sink failed: {0}")]
    Sink(#[from] SinkError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Whether the error was raised before the run started
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            PipelineError::JobSourceNotConfigured
                | PipelineError::ResultSinkNotConfigured
                | PipelineError::LoggerNotConfigured
                | PipelineError::DividerNotConfigured
                | PipelineError::InvalidConfig(_)
        )
    }
}

/// Result type alias using PipelineError
pub type Result<T> = std::result::Result<T, PipelineError>;
