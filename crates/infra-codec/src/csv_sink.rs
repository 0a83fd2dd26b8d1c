// CSV result sink
// reason: tokio AsyncWrite so file output never blocks a runtime thread

use async_trait::async_trait;
use divider_core::domain::JobResult;
use divider_core::port::{ResultSink, SinkError};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Header line written before any result
pub const CSV_HEADER: &str = "id,value,valid\n";

/// Writes one `id,value,valid` line per result, in the order reported
///
/// The sink does not buffer; wrap the writer in a `BufWriter` for file
/// output. `finish` flushes the writer.
pub struct CsvResultSink<W> {
    writer: W,
    rows: u64,
}

impl<W: AsyncWrite + Unpin + Send> CsvResultSink<W> {
    /// Create the sink and write the header
    ///
    /// # Errors
    /// - SinkError::Io if the header cannot be written
    pub async fn new(mut writer: W) -> Result<Self, SinkError> {
        writer.write_all(CSV_HEADER.as_bytes()).await?;
        Ok(Self { writer, rows: 0 })
    }

    /// Result lines written so far
    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> ResultSink for CsvResultSink<W> {
    async fn report(&mut self, result: &JobResult) -> Result<(), SinkError> {
        let line = format!("{}\n", result);
        self.writer.write_all(line.as_bytes()).await?;
        self.rows += 1;
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush().await?;
        debug!(rows = self.rows, "CSV results flushed");
        Ok(())
    }
}
