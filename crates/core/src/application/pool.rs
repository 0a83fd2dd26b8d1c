// Worker Pool - bounded intake queue, unbounded completion stream
//
// Knows nothing about jobs: items of type `T` go in, values of type `R`
// come out, one per item, in completion order.

use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::instrument::WithSubscriber;
use tracing::{debug, error, Instrument};

/// Pool errors
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("All pool workers have exited")]
    WorkersGone,

    #[error("Pool worker terminated abnormally: {0}")]
    WorkerPanicked(String),
}

/// Fixed-size pool of async workers
pub struct WorkerPool<T> {
    jobs: mpsc::Sender<T>,
    workers: Vec<JoinHandle<()>>,
}

/// Read side of the pool: results in completion order
pub struct Completions<R> {
    rx: mpsc::UnboundedReceiver<R>,
}

impl<R> Completions<R> {
    /// Next finished result; `None` once the pool is closed and drained
    pub async fn next(&mut self) -> Option<R> {
        self.rx.recv().await
    }
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Spawn `worker_count` workers sharing a queue of `buffer_size` items
    ///
    /// Zero for either size is coerced to one. Workers inherit the current
    /// span and tracing dispatcher.
    pub fn new<R, F>(process: F, worker_count: usize, buffer_size: usize) -> (Self, Completions<R>)
    where
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let worker_count = worker_count.max(1);
        let (jobs_tx, jobs_rx) = mpsc::channel(buffer_size.max(1));
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        let jobs_rx = Arc::new(Mutex::new(jobs_rx));
        let process = Arc::new(process);

        let workers = (0..worker_count)
            .map(|index| {
                let worker = run_worker(
                    index,
                    Arc::clone(&jobs_rx),
                    results_tx.clone(),
                    Arc::clone(&process),
                );
                tokio::spawn(worker.in_current_span().with_current_subscriber())
            })
            .collect();

        debug!(workers = worker_count, "Worker pool started");
        (
            Self {
                jobs: jobs_tx,
                workers,
            },
            Completions { rx: results_rx },
        )
    }

    /// Enqueue one item, waiting while the queue is full
    ///
    /// # Errors
    /// - PoolError::WorkersGone if every worker has exited
    pub async fn put(&self, item: T) -> Result<(), PoolError> {
        self.jobs.send(item).await.map_err(|_| PoolError::WorkersGone)
    }

    /// Stop intake, wait for queued and in-flight items, end the stream
    ///
    /// Consuming `self` makes `put` after `close` unrepresentable.
    pub async fn close(self) -> Result<(), PoolError> {
        let Self { jobs, workers } = self;
        drop(jobs);

        let mut failure = None;
        for joined in join_all(workers).await {
            if let Err(e) = joined {
                error!(error = %e, "Pool worker terminated abnormally");
                failure.get_or_insert_with(|| e.to_string());
            }
        }

        debug!("Worker pool closed");
        match failure {
            Some(msg) => Err(PoolError::WorkerPanicked(msg)),
            None => Ok(()),
        }
    }
}

async fn run_worker<T, R, F>(
    index: usize,
    jobs: Arc<Mutex<mpsc::Receiver<T>>>,
    results: mpsc::UnboundedSender<R>,
    process: Arc<F>,
) where
    F: Fn(T) -> R,
{
    loop {
        let next = jobs.lock().await.recv().await;
        let Some(item) = next else {
            break;
        };
        if results.send(process(item)).is_err() {
            debug!(worker = index, "Completion stream dropped, discarding result");
        }
    }
    debug!(worker = index, "Pool worker stopped");
}
