// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::decoder::{DecoderAdapter, DecoderError};
use crate::sync::{EngineSynchronizer, SyncError};
use crate::transport::{Transport, TransportError};
use async_trait::async_trait;
use mtn_core::{BroadcastEnvelope, Engine};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::Instrument;

/// Wrapper that adds tracing to any Transport
#[derive(Clone)]
pub struct TracedTransport<T> {
    inner: T,
}

impl<T> TracedTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: Transport> Transport for TracedTransport<T> {
    async fn join(&self) -> Result<mpsc::Receiver<BroadcastEnvelope>, TransportError> {
        let result = self.inner.join().await;
        match &result {
            Ok(_) => tracing::info!("joined cluster"),
            Err(e) => tracing::error!(error = %e, "join failed"),
        }
        result
    }

    async fn request(
        &self,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        let span = tracing::debug_span!(
            "transport.request",
            kind = request.first().copied().unwrap_or_default(),
            timeout_ms = timeout.as_millis() as u64
        );

        async {
            let start = std::time::Instant::now();
            let result = self.inner.request(request, timeout).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(Some(reply)) => {
                    tracing::debug!(elapsed_ms, reply_len = reply.len(), "reply received")
                }
                Ok(None) => tracing::debug!(elapsed_ms, "no reply before timeout"),
                Err(e) => tracing::debug!(elapsed_ms, error = %e, "request failed"),
            }

            result
        }
        .instrument(span)
        .await
    }

    fn leave(&self) {
        tracing::info!("leaving cluster");
        self.inner.leave();
    }

    async fn terminated(&self) {
        self.inner.terminated().await;
        tracing::debug!("transport terminated");
    }
}

/// Wrapper that adds tracing to any EngineSynchronizer
#[derive(Clone)]
pub struct TracedSynchronizer<S> {
    inner: S,
}

impl<S> TracedSynchronizer<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: EngineSynchronizer> EngineSynchronizer for TracedSynchronizer<S> {
    async fn sync(&self, remote_path: &str, engine: &Engine) -> Result<(), SyncError> {
        let span = tracing::info_span!(
            "engine.sync",
            remote_path,
            local = %engine.root().display()
        );

        async {
            tracing::info!("starting");
            let start = std::time::Instant::now();
            let result = self.inner.sync(remote_path, engine).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "synchronized"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "sync failed"),
            }

            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any DecoderAdapter
#[derive(Clone)]
pub struct TracedDecoderAdapter<D> {
    inner: D,
}

impl<D> TracedDecoderAdapter<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<D: DecoderAdapter> DecoderAdapter for TracedDecoderAdapter<D> {
    type Handle = D::Handle;

    async fn launch(&self, config_path: &Path) -> Result<D::Handle, DecoderError> {
        let span = tracing::info_span!("decoder.launch", config = %config_path.display());

        async {
            // Precondition: config must have been written
            if !config_path.exists() {
                tracing::error!("decoder config does not exist");
                return Err(DecoderError::ConfigNotFound(
                    config_path.display().to_string(),
                ));
            }

            let start = std::time::Instant::now();
            let result = self.inner.launch(config_path).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(_) => tracing::info!(elapsed_ms, "decoder ready"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "launch failed"),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
