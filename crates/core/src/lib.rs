// Divider Core - Domain Logic, Ports & Job Pipeline
// NO infrastructure dependencies: sources, sinks and dividers plug in via ports

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{JobProcessor, ProcessorConfig, ProcessorHandle, RunSummary};
pub use error::{PipelineError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
