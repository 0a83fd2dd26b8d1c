// Command-line arguments & configuration resolution

use anyhow::{bail, Result};
use clap::Parser;
use divider_infra_math::DividerMethod;
use std::path::PathBuf;

const DEFAULT_OUTPUT: &str = "divider.csv";

/// Default workers per available CPU (division is cheap, tasks are light)
const WORKERS_PER_CPU: usize = 1024;

#[derive(Parser, Debug)]
#[command(name = "divider")]
#[command(about = "Divide a JSON stream of jobs on a worker pool and write CSV results", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the file with jobs
    #[arg(short = 'i', long = "input", env = "DIVIDER_INPUT")]
    pub input: String,

    /// Results file path
    #[arg(short = 'o', long, env = "DIVIDER_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: String,

    /// Log file path (stderr when unset)
    #[arg(long = "log", env = "DIVIDER_LOG_FILE")]
    pub log_file: Option<String>,

    /// Workers count (default: available CPUs x 1024)
    #[arg(short, long, env = "DIVIDER_WORKERS")]
    pub workers: Option<usize>,

    /// Job queue capacity (default: workers count)
    #[arg(short, long = "queue-size", env = "DIVIDER_QUEUE_SIZE")]
    pub queue_size: Option<usize>,

    /// Division method: native, ffi
    #[arg(short, long, env = "DIVIDER_METHOD", default_value = "ffi")]
    pub method: DividerMethod,

    /// Do not use the C library (deprecated, same as --method native)
    #[arg(short = 'z', long = "native-only")]
    pub native_only: bool,

    /// Write results in completion order instead of input order
    #[arg(long)]
    pub unordered: bool,
}

/// Fully resolved run settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub input: PathBuf,
    pub output: PathBuf,
    pub log_file: Option<PathBuf>,
    pub workers: usize,
    pub queue_size: usize,
    pub method: DividerMethod,
    pub preserve_order: bool,
}

impl Cli {
    /// Apply defaults and expand `~` in paths
    pub fn resolve(self) -> Result<Settings> {
        if self.input.trim().is_empty() {
            bail!("Path to the jobs file not specified");
        }

        // 0 is passed through; the processor treats it as 1
        let workers = self.workers.unwrap_or_else(default_workers);
        let method = if self.native_only {
            DividerMethod::Native
        } else {
            self.method
        };

        Ok(Settings {
            input: expand(&self.input),
            output: expand(&self.output),
            log_file: self.log_file.as_deref().map(expand),
            workers,
            queue_size: self.queue_size.unwrap_or(workers),
            method,
            preserve_order: !self.unordered,
        })
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        * WORKERS_PER_CPU
}
