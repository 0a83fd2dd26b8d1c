// Job Processor - Orchestrates intake, worker pool and result output
//
//   JobSource -> enqueue loop -> WorkerPool -> drain loop -> ResultSink
//
// The enqueue loop runs on the caller's task and is the only place that
// observes cancellation. The drain loop runs on a spawned task.

mod builder;

pub use builder::{JobProcessorBuilder, ProcessorConfig};

use crate::application::pool::{Completions, WorkerPool};
use crate::application::reorder::ReorderBuffer;
use crate::application::worker::{cancel_channel, CancelSender, CancelToken, JobWorker, WorkItem};
use crate::domain::JobResult;
use crate::error::{PipelineError, Result};
use crate::port::{Divider, JobSource, ResultSink, SinkError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::instrument::WithSubscriber;
use tracing::{debug, error, info, info_span, warn, Dispatch, Instrument};
use uuid::Uuid;

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: Uuid,
    /// Jobs pulled from the source (ids `0..submitted`)
    pub submitted: u64,
    /// Results accepted by the sink
    pub processed: u64,
}

/// State shared between a run and its handles
#[derive(Default)]
struct RunControl {
    cancel: Mutex<Option<CancelSender>>,
    processed: AtomicU64,
}

impl RunControl {
    fn arm(&self, sender: CancelSender) {
        *self.cancel.lock().unwrap_or_else(PoisonError::into_inner) = Some(sender);
    }

    fn disarm(&self) {
        self.cancel.lock().unwrap_or_else(PoisonError::into_inner).take();
    }

    fn stop(&self) {
        let cancel = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        match cancel.as_ref() {
            Some(sender) if !sender.is_cancelled() => {
                info!("Stop requested, job intake will end");
                sender.cancel();
            }
            Some(_) => debug!("Stop already requested"),
            None => debug!("Stop requested outside of a run, ignoring"),
        }
    }

    fn processed(&self) -> u64 {
        self.processed.load(Ordering::SeqCst)
    }
}

/// Cloneable control surface for a processor, usable from other tasks
#[derive(Clone)]
pub struct ProcessorHandle {
    control: Arc<RunControl>,
}

impl ProcessorHandle {
    /// Stop pulling new jobs. Idempotent; a no-op when no run is active.
    ///
    /// Jobs already queued or in flight still finish and are reported.
    pub fn stop(&self) {
        self.control.stop();
    }

    /// Results written to the sink so far
    pub fn processed(&self) -> u64 {
        self.control.processed()
    }
}

/// Bounded-concurrency division pipeline; one processor performs one run
pub struct JobProcessor {
    source: Box<dyn JobSource>,
    sink: Box<dyn ResultSink>,
    logger: Dispatch,
    divider: Arc<dyn Divider>,
    config: ProcessorConfig,
    control: Arc<RunControl>,
}

impl JobProcessor {
    pub fn builder() -> JobProcessorBuilder {
        JobProcessorBuilder::new()
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn handle(&self) -> ProcessorHandle {
        ProcessorHandle {
            control: Arc::clone(&self.control),
        }
    }

    /// See [`ProcessorHandle::stop`]
    pub fn stop(&self) {
        self.control.stop();
    }

    pub fn processed(&self) -> u64 {
        self.control.processed()
    }

    /// Run the pipeline until the source is exhausted, the run is stopped,
    /// or a fatal error occurs
    ///
    /// # Errors
    /// - PipelineError::Source for a stream-fatal source error (takes
    ///   priority over everything else)
    /// - PipelineError::Sink for a failed result write
    /// - PipelineError::Internal if a pool worker or the drain task died
    pub async fn run(self) -> Result<RunSummary> {
        let logger = self.logger.clone();
        let run_id = Uuid::new_v4();
        async move {
            let span = info_span!("pipeline", %run_id);
            self.execute(run_id).instrument(span).await
        }
        .with_subscriber(logger)
        .await
    }

    async fn execute(self, run_id: Uuid) -> Result<RunSummary> {
        let JobProcessor {
            mut source,
            sink,
            divider,
            config,
            control,
            ..
        } = self;

        let (cancel_tx, cancel) = cancel_channel();
        control.arm(cancel_tx);
        info!(
            workers = config.workers,
            queue_size = config.queue_size,
            preserve_order = config.preserve_order,
            "Job processing started"
        );

        let worker = JobWorker::new(divider);
        let (pool, completions) = WorkerPool::new(
            move |item: WorkItem| worker.process(item),
            config.workers,
            config.queue_size,
        );

        let drain = tokio::spawn(
            drain_results(
                completions,
                sink,
                Arc::clone(&control),
                config.preserve_order,
            )
            .in_current_span()
            .with_current_subscriber(),
        );

        let mut submitted = 0;
        let intake = enqueue_jobs(source.as_mut(), &pool, &cancel, &mut submitted).await;
        let closed = pool.close().await;
        let drained = drain.await;
        control.disarm();

        // Intake errors decide the outcome first, then pool, then sink
        if let Err(e) = intake {
            error!(error = %e, submitted, "Job processing failed");
            return Err(e);
        }
        if let Err(e) = closed {
            error!(error = %e, "Worker pool failed");
            return Err(PipelineError::Internal(e.to_string()));
        }
        match drained {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(error = %e, "Result output failed");
                return Err(PipelineError::Sink(e));
            }
            Err(join_err) => {
                error!(error = %join_err, "Result drain task died");
                return Err(PipelineError::Internal(join_err.to_string()));
            }
        }

        let processed = control.processed();
        info!(submitted, processed, "Job processing complete");
        Ok(RunSummary {
            run_id,
            submitted,
            processed,
        })
    }
}

/// Pull jobs until the source is exhausted, cancellation is observed, or
/// the source fails fatally
///
/// Every pulled job consumes an id and reaches the pool, so ids stay dense
/// across per-job decode failures.
async fn enqueue_jobs(
    source: &mut dyn JobSource,
    pool: &WorkerPool<WorkItem>,
    cancel: &CancelToken,
    next_id: &mut u64,
) -> Result<()> {
    while source.more().await {
        if cancel.is_cancelled() {
            info!(submitted = *next_id, "Job intake cancelled");
            return Ok(());
        }

        let mut item = WorkItem::new(*next_id);
        *next_id += 1;

        match source.next(&mut item.job).await {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => {
                warn!(job_id = item.result.id, error = %e, "Job decoding error");
                item.job.valid = false;
            }
            Err(e) => return Err(PipelineError::Source(e)),
        }

        pool.put(item)
            .await
            .map_err(|e| PipelineError::Internal(e.to_string()))?;
    }
    debug!(submitted = *next_id, "Job source exhausted");
    Ok(())
}

/// Forward pool results to the sink until the pool closes or a write fails
///
/// A failed write cancels the run; the sink is still finished so that
/// everything reported before the failure is flushed.
async fn drain_results(
    mut completions: Completions<JobResult>,
    mut sink: Box<dyn ResultSink>,
    control: Arc<RunControl>,
    preserve_order: bool,
) -> std::result::Result<(), SinkError> {
    let mut reorder = ReorderBuffer::new(preserve_order);
    let mut outcome = Ok(());

    'drain: while let Some(result) = completions.next().await {
        reorder.push(result);
        while let Some(ready) = reorder.pop_ready() {
            if let Err(e) = forward(sink.as_mut(), &ready, &control).await {
                outcome = Err(e);
                break 'drain;
            }
        }
    }

    if outcome.is_ok() && reorder.pending() > 0 {
        warn!(
            pending = reorder.pending(),
            "Result stream ended with gaps, flushing held results"
        );
        for result in reorder.drain_remaining() {
            if let Err(e) = forward(sink.as_mut(), &result, &control).await {
                outcome = Err(e);
                break;
            }
        }
    }

    if let Err(e) = outcome {
        control.stop();
        if let Err(finish_err) = sink.finish().await {
            debug!(error = %finish_err, "Sink finish failed after write error");
        }
        return Err(e);
    }
    sink.finish().await
}

async fn forward(
    sink: &mut dyn ResultSink,
    result: &JobResult,
    control: &RunControl,
) -> std::result::Result<(), SinkError> {
    sink.report(result).await?;
    control.processed.fetch_add(1, Ordering::SeqCst);
    debug!(job_id = result.id, valid = result.valid, "Result reported");
    Ok(())
}
