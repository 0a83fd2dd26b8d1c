// Port Layer - Interfaces for external collaborators

pub mod divider;
pub mod job_source;
pub mod result_sink;

// Re-exports
pub use divider::Divider;
pub use job_source::{JobSource, SourceError};
pub use result_sink::{ResultSink, SinkError};
