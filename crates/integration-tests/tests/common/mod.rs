// Shared helpers for end-to-end pipeline tests

#![allow(dead_code)]

use divider_core::{JobProcessor, PipelineError, RunSummary};
use divider_infra_codec::{CsvResultSink, JsonJobSource, CSV_HEADER};
use divider_infra_math::{select_divider, DividerMethod};
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::Dispatch;

/// In-memory writer that stays readable after the sink is moved away
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    /// Data rows without the header
    pub fn rows(&self) -> Vec<String> {
        let contents = self.contents();
        let body = contents
            .strip_prefix(CSV_HEADER)
            .expect("results must start with the header");
        body.lines().map(str::to_owned).collect()
    }
}

impl AsyncWrite for SharedBuffer {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Processor reading `reader` and writing CSV into `output`
pub async fn build_processor<R>(
    reader: R,
    output: &SharedBuffer,
    method: DividerMethod,
    workers: usize,
) -> JobProcessor
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let sink = CsvResultSink::new(output.clone()).await.unwrap();
    JobProcessor::builder()
        .job_source(JsonJobSource::new(reader))
        .result_sink(sink)
        .logger(Dispatch::none())
        .divider(select_divider(method))
        .workers(workers)
        .queue_size(workers)
        .build()
        .unwrap()
}

/// Run JSON `input` through the whole pipeline
pub async fn run_json(
    input: impl AsRef<[u8]>,
    method: DividerMethod,
    workers: usize,
) -> (Result<RunSummary, PipelineError>, SharedBuffer) {
    let output = SharedBuffer::default();
    let reader = io::Cursor::new(input.as_ref().to_vec());
    let outcome = build_processor(reader, &output, method, workers)
        .await
        .run()
        .await;
    (outcome, output)
}
