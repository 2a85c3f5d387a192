// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translation worker node daemon (mtnd)
//!
//! Joins the cluster, synchronizes the engine with the master and exits with
//! status 101 when a reset asks for a restart.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod lifecycle;

use std::path::PathBuf;

use clap::Parser;
use mtn_core::{NodeConfig, Outcome};
use tracing::{error, info};

use crate::lifecycle::DaemonError;

#[derive(Parser)]
#[command(name = "mtnd", version, about = "Translation cluster worker node")]
struct Args {
    /// Path to the node configuration file
    #[arg(long, short)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration (logging is not set up yet, report on stderr)
    let config = match NodeConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("mtnd: {}", e);
            return Err(DaemonError::from(e).into());
        }
    };

    // Set up logging
    let log_guard = setup_logging(&config)?;

    info!(
        config = %args.config.display(),
        engine = %config.engine.name,
        "Starting mtnd"
    );

    let node = match lifecycle::startup(&config).await {
        Ok(node) => node,
        Err(e) => {
            error!("Failed to start node: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let outcome = lifecycle::run(&node).await?;
    info!(?outcome, "Node stopped");

    // Flush logs; process::exit skips destructors
    drop(log_guard);

    match outcome {
        Outcome::Stopped => Ok(()),
        Outcome::RestartRequested => std::process::exit(outcome.exit_code()),
    }
}

fn setup_logging(
    config: &NodeConfig,
) -> Result<tracing_appender::non_blocking::WorkerGuard, DaemonError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (non_blocking, guard) = match &config.logging.file {
        Some(path) => {
            let dir = path
                .parent()
                .ok_or_else(|| DaemonError::LogPath(path.clone()))?;
            let file_name = path
                .file_name()
                .ok_or_else(|| DaemonError::LogPath(path.clone()))?;

            // Create log directory if needed
            std::fs::create_dir_all(dir)?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    // Set up subscriber with env filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}
