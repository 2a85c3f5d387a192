// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: wiring, startup, waiting for the node's outcome.

use std::path::PathBuf;

use mtn_adapters::{
    ProcessDecoderAdapter, RsyncSynchronizer, TcpTransport, TracedDecoderAdapter,
    TracedSynchronizer, TracedTransport,
};
use mtn_core::{ConfigError, NodeConfig, Outcome};
use mtn_node::{NodeDeps, NodeError, NodeSettings, WorkerNode};
use thiserror::Error;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

/// Worker node with concrete adapter types (wrapped with tracing)
pub type DaemonNode = WorkerNode<
    TracedTransport<TcpTransport>,
    TracedSynchronizer<RsyncSynchronizer>,
    TracedDecoderAdapter<ProcessDecoderAdapter>,
>;

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Failed to start node: {0}")]
    Node(#[from] NodeError),

    #[error("Invalid log file path: {0}")]
    LogPath(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the node described by `config` without starting it
pub fn build_node(config: &NodeConfig) -> DaemonNode {
    let target = config.sync_target();

    let deps = NodeDeps {
        transport: TracedTransport::new(TcpTransport::new(target.host(), config.cluster.ports)),
        synchronizer: TracedSynchronizer::new(RsyncSynchronizer::new(target.clone())),
        decoder: TracedDecoderAdapter::new(ProcessDecoderAdapter::new(
            config.decoder.command.clone(),
            config.decoder.args.clone(),
        )),
    };

    WorkerNode::new(config.engine(), target, deps, NodeSettings::from_config(config))
}

/// Build and start the node
pub async fn startup(config: &NodeConfig) -> Result<DaemonNode, DaemonError> {
    let node = build_node(config);
    node.start().await?;
    Ok(node)
}

/// Run until the node requests an outcome or the process is signalled
pub async fn run(node: &DaemonNode) -> Result<Outcome, DaemonError> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let outcome = tokio::select! {
        outcome = node.outcome() => outcome,

        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down...");
            stop(node).await
        }

        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down...");
            stop(node).await
        }
    };

    Ok(outcome)
}

/// Shut the node down, waiting up to its grace period
async fn stop(node: &DaemonNode) -> Outcome {
    let grace = node.settings().shutdown_grace;
    node.shutdown();
    if !node.await_termination(grace).await {
        warn!(
            grace_ms = grace.as_millis() as u64,
            "node did not terminate within grace period"
        );
    }
    Outcome::Stopped
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
