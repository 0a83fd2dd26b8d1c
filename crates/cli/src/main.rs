//! Divider - Batch division job runner
//! Streams JSON jobs through a bounded worker pool and writes CSV results

mod args;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Instant;
use tokio::fs::File;
use tokio::io::BufWriter;
use tracing::{error, info};

use args::Cli;
use divider_core::JobProcessor;
use divider_infra_codec::{CsvResultSink, JsonJobSource};
use divider_infra_math::select_divider;

#[tokio::main]
async fn main() -> Result<()> {
    let started = Instant::now();

    // 1. Resolve configuration
    let settings = Cli::parse().resolve()?;

    // 2. Initialize logging
    let _log_guard = logging::init(settings.log_file.as_deref())?;
    info!("Divider v{} starting...", divider_core::VERSION);
    info!(
        input = %settings.input.display(),
        output = %settings.output.display(),
        method = %settings.method,
        "Configuration resolved"
    );

    // 3. Open job source and result sink
    let input = File::open(&settings.input)
        .await
        .with_context(|| format!("Failed to open jobs file {}", settings.input.display()))?;
    let output = File::create(&settings.output)
        .await
        .with_context(|| format!("Failed to create results file {}", settings.output.display()))?;
    let sink = CsvResultSink::new(BufWriter::new(output))
        .await
        .context("Failed to write results header")?;

    // 4. Wire the processor
    let processor = JobProcessor::builder()
        .job_source(JsonJobSource::new(input))
        .result_sink(sink)
        .logger(tracing::dispatcher::get_default(|dispatch| dispatch.clone()))
        .divider(select_divider(settings.method))
        .workers(settings.workers)
        .queue_size(settings.queue_size)
        .preserve_order(settings.preserve_order)
        .build()?;
    let handle = processor.handle();

    // 5. Run until done; first Ctrl+C stops intake, later ones are acknowledged
    let mut run = tokio::spawn(processor.run());
    let mut stop_requested = false;
    let outcome = loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl+C")?;
                if stop_requested {
                    info!("Stopping...");
                    continue;
                }
                info!("Interrupt received. Stopping job processing...");
                handle.stop();
                stop_requested = true;
            }
            joined = &mut run => break joined.context("Job processor task failed")?,
        }
    };

    // 6. Report
    match outcome {
        Ok(summary) => {
            let elapsed = started.elapsed();
            let rate = summary.processed as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
            info!(run_id = %summary.run_id, "Complete.");
            info!(submitted = summary.submitted, processed = summary.processed, "Processed jobs");
            info!("Time taken: {:?}, Avg. rate: {} jobs/s", elapsed, rate as u64);
            Ok(())
        }
        Err(e) => {
            error!(error = %e, processed = handle.processed(), "Processing failed");
            Err(anyhow::Error::new(e).context("Processing failed"))
        }
    }
}
