// Job Processor configuration & builder

use super::{JobProcessor, RunControl};
use crate::application::worker::constants::{
    DEFAULT_QUEUE_SIZE, DEFAULT_WORKERS, MAX_QUEUE_SIZE, MAX_WORKERS,
};
use crate::error::{PipelineError, Result};
use crate::port::{Divider, JobSource, ResultSink};
use std::sync::Arc;
use tracing::Dispatch;

/// Tunables of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// Concurrent pool workers (0 is treated as 1)
    pub workers: usize,
    /// Bounded job queue capacity (0 is treated as 1)
    pub queue_size: usize,
    /// Forward results to the sink in id order
    pub preserve_order: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_size: DEFAULT_QUEUE_SIZE,
            preserve_order: true,
        }
    }
}

impl ProcessorConfig {
    fn validated(self) -> Result<Self> {
        let workers = self.workers.max(1);
        let queue_size = self.queue_size.max(1);
        if workers > MAX_WORKERS {
            return Err(PipelineError::InvalidConfig(format!(
                "worker count {} exceeds {}",
                workers, MAX_WORKERS
            )));
        }
        if queue_size > MAX_QUEUE_SIZE {
            return Err(PipelineError::InvalidConfig(format!(
                "queue size {} exceeds {}",
                queue_size, MAX_QUEUE_SIZE
            )));
        }
        Ok(Self {
            workers,
            queue_size,
            ..self
        })
    }
}

/// Collects the processor's collaborators; `build` validates them once
///
/// # Example
/// ```text
/// let processor = JobProcessor::builder()
///     .job_source(JsonJobSource::new(file))
///     .result_sink(CsvResultSink::new(out).await?)
///     .logger(Dispatch::default())
///     .divider(Arc::new(NativeDivider))
///     .workers(8)
///     .build()?;
/// ```
#[derive(Default)]
pub struct JobProcessorBuilder {
    source: Option<Box<dyn JobSource>>,
    sink: Option<Box<dyn ResultSink>>,
    logger: Option<Dispatch>,
    divider: Option<Arc<dyn Divider>>,
    config: ProcessorConfig,
}

impl JobProcessorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_source(mut self, source: impl JobSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn result_sink(mut self, sink: impl ResultSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Tracing dispatcher the whole run logs through
    pub fn logger(mut self, logger: impl Into<Dispatch>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    pub fn divider(mut self, divider: Arc<dyn Divider>) -> Self {
        self.divider = Some(divider);
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    pub fn queue_size(mut self, queue_size: usize) -> Self {
        self.config.queue_size = queue_size;
        self
    }

    pub fn preserve_order(mut self, preserve_order: bool) -> Self {
        self.config.preserve_order = preserve_order;
        self
    }

    /// Replace all tunables at once
    pub fn config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate and assemble the processor
    ///
    /// # Errors
    /// Missing collaborators are reported in the order source, sink,
    /// logger, divider; then out-of-range tunables as InvalidConfig.
    pub fn build(self) -> Result<JobProcessor> {
        let source = self.source.ok_or(PipelineError::JobSourceNotConfigured)?;
        let sink = self.sink.ok_or(PipelineError::ResultSinkNotConfigured)?;
        let logger = self.logger.ok_or(PipelineError::LoggerNotConfigured)?;
        let divider = self.divider.ok_or(PipelineError::DividerNotConfigured)?;
        let config = self.config.validated()?;

        Ok(JobProcessor {
            source,
            sink,
            logger,
            divider,
            config,
            control: Arc::new(RunControl::default()),
        })
    }
}
