//! strand-demos: plain-text demonstrations of the strand runtime.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use strand::RuntimeBuilder;
use tracing_subscriber::EnvFilter;

mod commands;
mod fetch;
mod page;
mod report;

/// Demonstrations of cooperative tasks running side by side
#[derive(Parser)]
#[command(name = "strand-demos")]
#[command(about = "Spawn tasks, sleep and fetch in parallel, compare against a sequential baseline", long_about = None)]
#[command(version)]
struct Cli {
    /// Maximum number of threads running blocking I/O
    #[arg(long, global = true, env = "STRAND_BLOCKING_THREADS")]
    blocking_threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run several sleeps in parallel and compare with running them in sequence
    Sleep {
        /// Number of parallel sleeps
        #[arg(long, default_value_t = 5)]
        steps: u32,

        /// Duration of each sleep in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
    },

    /// Simulate five API calls of different latency
    Parallel,

    /// Spawn/await, parallel execution, error handling and a real fetch
    Basic {
        /// Page fetched by the I/O step
        #[arg(long, default_value = "https://google.com")]
        url: String,
    },

    /// Fetch several pages in parallel and extract their title, description and links
    Scrape {
        /// Pages to fetch (defaults to a handful of well-known sites)
        urls: Vec<String>,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut builder = RuntimeBuilder::new();
    if let Some(n) = cli.blocking_threads {
        builder = builder.blocking_threads(n);
    }
    let runtime = builder.build().context("failed to start the runtime")?;

    let result = runtime.block_on(async move {
        match cli.command {
            Commands::Sleep { steps, delay_ms } => commands::sleep::run(steps, delay_ms).await,
            Commands::Parallel => commands::parallel::run().await,
            Commands::Basic { url } => commands::basic::run(url).await,
            Commands::Scrape { urls, timeout_secs } => commands::scrape::run(urls, timeout_secs).await,
        }
    });

    let report = runtime.shutdown();
    if !report.is_clean() {
        tracing::warn!(
            aborted = report.aborted,
            unobserved = report.unobserved.len(),
            "runtime did not shut down cleanly"
        );
    }

    result
}
