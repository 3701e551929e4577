//! # jobmaker
//!
//! Daemon that keeps a fresh mining job available while failing over between
//! redundant upstream nodes.
//!
//! ## Usage
//!
//! ```bash
//! # Use ./jobmaker.cfg
//! jobmaker
//!
//! # Use another config file
//! jobmaker /etc/ethpool/jobmaker.cfg
//!
//! # More detail from the health checker and refresher
//! RUST_LOG=ethpool_jobmaker=debug jobmaker
//! ```
//!
//! The process runs until SIGINT or SIGTERM, then stops both background
//! loops and exits.

use anyhow::{Context, Result};
use argh::FromArgs;
use ethpool_jobmaker::{Config, JobMaker, DEFAULT_CONFIG_FILE};
use std::path::{Path, PathBuf};

#[derive(FromArgs, Debug)]
/// ethpool job maker - keeps a fresh block template from redundant nodes
struct Cli {
    /// path to the JSON config file (default: jobmaker.cfg)
    #[argh(positional, default = "DEFAULT_CONFIG_FILE.to_string()")]
    config: String,
}

/// Resolve `path` against the working directory for logging.
fn absolute_config_path(path: &str) -> Result<PathBuf> {
    std::path::absolute(Path::new(path))
        .with_context(|| format!("Cannot resolve config path '{}'", path))
}

fn build_runtime(config: &Config) -> Result<tokio::runtime::Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();

    if let Some(threads) = config.worker_threads() {
        builder.worker_threads(threads);
        tracing::info!("Running with {} threads", threads);
    }

    builder.build().context("Failed to start the async runtime")
}

/// Wait for SIGINT or SIGTERM.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => tracing::info!("Received SIGINT"),
        _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Received Ctrl-C");
    Ok(())
}

async fn run(config: Config) -> Result<()> {
    let job_maker = JobMaker::new(&config).await?;
    let handle = job_maker
        .start()
        .context("Job maker already started")?;

    wait_for_shutdown().await?;

    handle.shutdown().await;
    Ok(())
}

fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // Set default log level to INFO, but allow RUST_LOG env var to override
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let path = absolute_config_path(&cli.config)?;
    tracing::info!("Loading config: {}", path.display());
    let config = Config::load(&path)?;

    let runtime = build_runtime(&config)?;
    runtime.block_on(run(config))
}
