// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster transport adapters

mod tcp;
pub mod wire;

pub use tcp::TcpTransport;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeReply, FakeTransport, TransportCall};

use async_trait::async_trait;
use mtn_core::BroadcastEnvelope;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from transport operations
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("connection closed by peer")]
    ConnectionClosed,
    #[error("frame too large: {0} bytes")]
    FrameTooLarge(usize),
    #[error("transport already joined")]
    AlreadyJoined,
    #[error("transport has left the cluster")]
    Closed,
}

/// Request/response and broadcast delivery between a node and its master
#[async_trait]
pub trait Transport: Clone + Send + Sync + 'static {
    /// Join the cluster.
    ///
    /// Broadcasts are delivered on the returned channel until the transport
    /// leaves; the channel closes afterwards.
    async fn join(&self) -> Result<mpsc::Receiver<BroadcastEnvelope>, TransportError>;

    /// Send `request` to the master and wait up to `timeout` for its reply.
    ///
    /// Returns `Ok(None)` when no reply arrived in time.
    async fn request(
        &self,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>, TransportError>;

    /// Ask the transport to leave the cluster. Returns without waiting.
    fn leave(&self);

    /// Resolves once the transport has stopped. Immediate if it never joined.
    async fn terminated(&self);
}
