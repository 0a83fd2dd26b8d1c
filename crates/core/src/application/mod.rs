// Application Layer - Job pipeline use cases

pub mod pool;
pub mod processor;
pub mod reorder;
pub mod worker;

// Re-exports
pub use pool::{Completions, PoolError, WorkerPool};
pub use processor::{JobProcessor, JobProcessorBuilder, ProcessorConfig, ProcessorHandle, RunSummary};
pub use reorder::ReorderBuffer;
pub use worker::{cancel_channel, CancelSender, CancelToken, JobWorker, WorkItem};
