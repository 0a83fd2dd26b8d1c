// Logging setup: tracing-subscriber registry, optional non-blocking file output

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "divider=info";

/// Install the global subscriber
///
/// `DIVIDER_LOG_FORMAT=json` selects JSON lines, anything else the pretty
/// format. `RUST_LOG` overrides the default filter. The returned guard
/// flushes buffered log lines when dropped and must outlive the run.
pub fn init(log_file: Option<&Path>) -> Result<WorkerGuard> {
    let log_format = std::env::var("DIVIDER_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("Failed to create env filter")?;

    let file = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(file),
            Err(e) => {
                // Subscriber is not installed yet
                eprintln!("Failed to open log file {}: {} (logging to stderr)", path.display(), e);
                None
            }
        }
    });
    let ansi = file.is_none();
    let (writer, guard) = match file {
        Some(file) => tracing_appender::non_blocking(file),
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(writer))
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_ansi(ansi).with_writer(writer))
            .try_init(),
    }
    .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
