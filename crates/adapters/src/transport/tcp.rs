// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TCP transport
//!
//! Requests go over one reusable connection to the request port; broadcasts
//! are read from a long-lived subscription to the broadcast port, which is
//! re-established after a short pause whenever it drops.

use super::{wire, Transport, TransportError};
use async_trait::async_trait;
use mtn_core::BroadcastEnvelope;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

const BROADCAST_BUFFER: usize = 64;
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// TCP-based cluster transport
#[derive(Clone)]
pub struct TcpTransport {
    inner: Arc<Inner>,
}

struct Inner {
    host: String,
    request_port: u16,
    broadcast_port: u16,
    reconnect_delay: Duration,
    request_conn: Mutex<Option<TcpStream>>,
    joined: AtomicBool,
    leave: CancellationToken,
    stopped: CancellationToken,
}

impl TcpTransport {
    /// Transport to `host`, using `ports[0]` for requests and `ports[1]` for broadcasts
    pub fn new(host: impl Into<String>, ports: [u16; 2]) -> Self {
        Self {
            inner: Arc::new(Inner {
                host: host.into(),
                request_port: ports[0],
                broadcast_port: ports[1],
                reconnect_delay: RECONNECT_DELAY,
                request_conn: Mutex::new(None),
                joined: AtomicBool::new(false),
                leave: CancellationToken::new(),
                stopped: CancellationToken::new(),
            }),
        }
    }

    pub fn host(&self) -> &str {
        &self.inner.host
    }
}

impl Inner {
    async fn exchange(
        &self,
        conn: &mut Option<TcpStream>,
        request: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        if conn.is_none() {
            let stream = match TcpStream::connect((self.host.as_str(), self.request_port)).await {
                Ok(stream) => stream,
                Err(e) => {
                    // Callers retry immediately; pace attempts against a master that is down
                    tokio::time::sleep(self.reconnect_delay).await;
                    return Err(e.into());
                }
            };
            stream.set_nodelay(true)?;
            *conn = Some(stream);
        }
        let stream = conn.as_mut().ok_or(TransportError::ConnectionClosed)?;
        wire::write_frame(stream, request).await?;
        wire::read_frame(stream).await
    }

    async fn subscribe(&self, tx: mpsc::Sender<BroadcastEnvelope>) {
        loop {
            tokio::select! {
                _ = self.leave.cancelled() => break,
                result = self.pump(&tx) => match result {
                    Ok(()) => {
                        tracing::debug!("broadcast receiver dropped, stopping subscriber");
                        break;
                    }
                    Err(e) => tracing::warn!(
                        host = %self.host,
                        port = self.broadcast_port,
                        error = %e,
                        "broadcast subscription lost"
                    ),
                },
            }

            tokio::select! {
                _ = self.leave.cancelled() => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }
    }

    /// Forward broadcasts until the connection fails or the receiver goes away
    async fn pump(&self, tx: &mpsc::Sender<BroadcastEnvelope>) -> Result<(), TransportError> {
        let mut stream = TcpStream::connect((self.host.as_str(), self.broadcast_port)).await?;
        tracing::info!(host = %self.host, port = self.broadcast_port, "subscribed to broadcasts");

        loop {
            let frame = wire::read_frame(&mut stream).await?;
            match BroadcastEnvelope::from_frame(frame) {
                Ok(envelope) => {
                    if tx.send(envelope).await.is_err() {
                        return Ok(());
                    }
                }
                Err(e) => tracing::warn!(error = %e, "dropping malformed broadcast"),
            }
        }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn join(&self) -> Result<mpsc::Receiver<BroadcastEnvelope>, TransportError> {
        if self.inner.joined.swap(true, Ordering::AcqRel) {
            return Err(TransportError::AlreadyJoined);
        }

        let (tx, rx) = mpsc::channel(BROADCAST_BUFFER);
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let _stopped = inner.stopped.clone().drop_guard();
            inner.subscribe(tx).await;
        });

        Ok(rx)
    }

    async fn request(
        &self,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        if self.inner.leave.is_cancelled() {
            return Err(TransportError::Closed);
        }

        let mut conn = self.inner.request_conn.lock().await;
        let result = tokio::time::timeout(timeout, self.inner.exchange(&mut conn, request)).await;

        match result {
            Ok(Ok(reply)) => Ok(Some(reply)),
            Ok(Err(e)) => {
                // Next attempt starts from a fresh connection
                *conn = None;
                Err(e)
            }
            Err(_) => {
                // A late reply would otherwise be read by the next request
                *conn = None;
                Ok(None)
            }
        }
    }

    fn leave(&self) {
        self.inner.leave.cancel();
        if let Ok(mut conn) = self.inner.request_conn.try_lock() {
            *conn = None;
        }
    }

    async fn terminated(&self) {
        if self.inner.joined.load(Ordering::Acquire) {
            self.inner.stopped.cancelled().await;
        }
    }
}

#[cfg(test)]
#[path = "tcp_tests.rs"]
mod tests;
