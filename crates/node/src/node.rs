// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker node lifecycle

use crate::decoder_config::DecoderIni;
use crate::error::NodeError;
use crate::{initializer, killer};
use mtn_adapters::{DecoderAdapter, EngineSynchronizer, Transport};
use mtn_core::{
    pools, ActiveFlag, BroadcastEnvelope, DecoderSizing, Engine, NodeConfig, NodeState, Outcome,
    Signal, SyncTarget, TextPool, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SHUTDOWN_GRACE,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, OnceCell};
use tokio_util::sync::CancellationToken;

/// Node behaviour settings
#[derive(Debug, Clone)]
pub struct NodeSettings {
    /// Per-attempt wait for the master's sync-path reply
    pub request_timeout: Duration,
    /// How long a reset waits for shutdown before restarting anyway
    pub shutdown_grace: Duration,
    /// Directory receiving the generated decoder configuration
    pub runtime_dir: PathBuf,
    /// Build the decoder after synchronizing, before activating
    pub preload_decoder: bool,
    /// Treat a failed synchronization like a reset
    pub restart_on_sync_failure: bool,
    pub sizing: DecoderSizing,
}

impl NodeSettings {
    pub fn new(runtime_dir: impl Into<PathBuf>) -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            runtime_dir: runtime_dir.into(),
            preload_decoder: false,
            restart_on_sync_failure: false,
            sizing: DecoderSizing::detect(),
        }
    }

    pub fn from_config(config: &NodeConfig) -> Self {
        Self {
            request_timeout: config.cluster.request_timeout,
            shutdown_grace: config.cluster.shutdown_grace,
            runtime_dir: config.runtime_dir(),
            preload_decoder: config.decoder.preload,
            restart_on_sync_failure: config.node.restart_on_sync_failure,
            sizing: DecoderSizing::detect(),
        }
    }
}

/// Node adapter dependencies
pub struct NodeDeps<T, S, D> {
    pub transport: T,
    pub synchronizer: S,
    pub decoder: D,
}

struct Inner<T, S, D: DecoderAdapter> {
    engine: Engine,
    target: SyncTarget,
    transport: T,
    synchronizer: S,
    decoder_adapter: D,
    settings: NodeSettings,
    active: ActiveFlag,
    decoder: OnceCell<Arc<D::Handle>>,
    started: AtomicBool,
    killer_started: AtomicBool,
    /// Cancelled by `shutdown()`; the initializer stops retrying
    cancel: CancellationToken,
    /// Cancelled when the initializer task ends
    initializer_done: CancellationToken,
    initializer_spawned: AtomicBool,
    outcome: watch::Sender<Option<Outcome>>,
}

/// A worker node in the translation cluster.
///
/// Boots inactive, synchronizes its engine with the master and only then
/// becomes active. A reset broadcast deactivates it and asks the process to
/// restart. Cloning is cheap; clones share the same node.
pub struct WorkerNode<T, S, D: DecoderAdapter> {
    inner: Arc<Inner<T, S, D>>,
}

impl<T, S, D: DecoderAdapter> Clone for WorkerNode<T, S, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, S, D> WorkerNode<T, S, D>
where
    T: Transport,
    S: EngineSynchronizer,
    D: DecoderAdapter,
{
    pub fn new(
        engine: Engine,
        target: SyncTarget,
        deps: NodeDeps<T, S, D>,
        settings: NodeSettings,
    ) -> Self {
        let (outcome, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                engine,
                target,
                transport: deps.transport,
                synchronizer: deps.synchronizer,
                decoder_adapter: deps.decoder,
                settings,
                active: ActiveFlag::new(),
                decoder: OnceCell::new(),
                started: AtomicBool::new(false),
                killer_started: AtomicBool::new(false),
                cancel: CancellationToken::new(),
                initializer_done: CancellationToken::new(),
                initializer_spawned: AtomicBool::new(false),
                outcome,
            }),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.inner.engine
    }

    pub fn target(&self) -> &SyncTarget {
        &self.inner.target
    }

    pub fn settings(&self) -> &NodeSettings {
        &self.inner.settings
    }

    pub(crate) fn transport(&self) -> &T {
        &self.inner.transport
    }

    pub(crate) fn cancellation(&self) -> &CancellationToken {
        &self.inner.cancel
    }

    /// Join the cluster and start synchronizing with the master
    pub async fn start(&self) -> Result<(), NodeError> {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return Err(NodeError::AlreadyStarted);
        }

        let broadcasts = self.inner.transport.join().await?;
        tokio::spawn(dispatch(self.clone(), broadcasts));

        self.inner.initializer_spawned.store(true, Ordering::Release);
        let node = self.clone();
        let done = self.inner.initializer_done.clone().drop_guard();
        tokio::spawn(async move {
            let _done = done;
            initializer::run(&node).await;
        });

        tracing::info!(
            engine = %self.inner.engine.name,
            master = %self.inner.target,
            "worker node started"
        );
        Ok(())
    }

    /// Leave the cluster and stop the initializer.
    ///
    /// An in-flight synchronization is left to finish. Idempotent.
    pub fn shutdown(&self) {
        if self.inner.cancel.is_cancelled() {
            return;
        }
        self.inner.cancel.cancel();
        self.inner.transport.leave();
        tracing::info!("worker node shutdown");
    }

    /// Wait for the transport, then the initializer, within `timeout` overall.
    ///
    /// Returns whether both finished in time.
    pub async fn await_termination(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;

        let transport_done = tokio::time::timeout_at(deadline, self.inner.transport.terminated())
            .await
            .is_ok();

        let initializer_done = if self.inner.initializer_spawned.load(Ordering::Acquire) {
            tokio::time::timeout_at(deadline, self.inner.initializer_done.cancelled())
                .await
                .is_ok()
        } else {
            true
        };

        transport_done && initializer_done
    }

    /// The decoder, built and launched on first use
    pub async fn decoder(&self) -> Result<Arc<D::Handle>, NodeError> {
        self.inner
            .decoder
            .get_or_try_init(|| self.launch_decoder())
            .await
            .cloned()
    }

    async fn launch_decoder(&self) -> Result<Arc<D::Handle>, NodeError> {
        let engine = self.inner.engine.clone();
        let sizing = self.inner.settings.sizing;
        let runtime_dir = self.inner.settings.runtime_dir.clone();
        let path = tokio::task::spawn_blocking(move || {
            DecoderIni::for_engine(&engine, sizing)?.write_to(&runtime_dir)
        })
        .await??;
        let handle = self.inner.decoder_adapter.launch(&path).await?;
        Ok(Arc::new(handle))
    }

    /// Tokenizer pool for the engine's source language
    pub fn tokenizer(&self) -> Arc<TextPool> {
        pools::tokenizer(&self.inner.engine.source)
    }

    /// Detokenizer pool for the engine's target language
    pub fn detokenizer(&self) -> Arc<TextPool> {
        pools::detokenizer(&self.inner.engine.target)
    }

    /// Synchronize the engine from `remote_path` and activate on success
    pub async fn on_sync_path_received(&self, remote_path: &str) -> Result<(), NodeError> {
        let host = self.inner.target.host();
        tracing::info!(host, remote_path, "synchronizing models");

        if let Err(e) = self
            .inner
            .synchronizer
            .sync(remote_path, &self.inner.engine)
            .await
        {
            tracing::error!(host, error = %e, "error while synchronizing");
            self.on_activation_failed();
            return Err(e.into());
        }

        if self.inner.settings.preload_decoder {
            if let Err(e) = self.decoder().await {
                tracing::error!(error = %e, "failed to preload decoder");
                self.on_activation_failed();
                return Err(e);
            }
        }

        if self.inner.cancel.is_cancelled() {
            tracing::info!("synchronization complete, node is shutting down");
            return Ok(());
        }

        if !self.inner.active.activate() {
            tracing::info!("synchronization complete, reset pending; staying inactive");
            return Ok(());
        }
        tracing::info!("synchronization complete");
        Ok(())
    }

    fn on_activation_failed(&self) {
        if self.inner.settings.restart_on_sync_failure {
            self.spawn_killer();
        }
    }

    /// Handle a cluster broadcast. Only reset is recognized.
    pub fn on_broadcast_signal(&self, code: u8, payload: &[u8], offset: usize, length: usize) {
        match Signal::from(code) {
            Signal::Reset => {
                tracing::info!("reset signal received");
                self.inner.active.retire();
                self.spawn_killer();
            }
            Signal::Unknown(_) => {
                tracing::warn!(
                    signal = %Signal::from(code),
                    payload_len = payload.len(),
                    offset,
                    length,
                    "unknown broadcast signal received"
                );
            }
        }
    }

    fn spawn_killer(&self) {
        if self.inner.killer_started.swap(true, Ordering::SeqCst) {
            tracing::debug!("restart already in progress");
            return;
        }
        tokio::spawn(killer::run(self.clone()));
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.is_active()
    }

    pub fn state(&self) -> NodeState {
        self.inner.active.state()
    }

    /// Shared handle to the active flag for the serving layer
    pub fn active_flag(&self) -> ActiveFlag {
        self.inner.active.clone()
    }

    pub(crate) fn request_outcome(&self, outcome: Outcome) {
        self.inner.outcome.send_replace(Some(outcome));
    }

    /// The outcome requested so far, if any
    pub fn try_outcome(&self) -> Option<Outcome> {
        *self.inner.outcome.borrow()
    }

    /// Wait until the node asks the process to end
    pub async fn outcome(&self) -> Outcome {
        let mut rx = self.inner.outcome.subscribe();
        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(outcome) => *outcome,
            Err(_) => None,
        };
        outcome.unwrap_or(Outcome::Stopped)
    }
}

/// Forward broadcasts to the node until the transport closes the channel
async fn dispatch<T, S, D>(
    node: WorkerNode<T, S, D>,
    mut broadcasts: mpsc::Receiver<BroadcastEnvelope>,
) where
    T: Transport,
    S: EngineSynchronizer,
    D: DecoderAdapter,
{
    while let Some(envelope) = broadcasts.recv().await {
        node.on_broadcast_signal(
            envelope.signal,
            &envelope.payload,
            envelope.offset,
            envelope.length,
        );
    }
    tracing::debug!("broadcast channel closed");
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;
