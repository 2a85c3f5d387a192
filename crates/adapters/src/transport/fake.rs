// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake transport for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Transport, TransportError};
use async_trait::async_trait;
use mtn_core::BroadcastEnvelope;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Scripted outcome of one request
#[derive(Debug, Clone)]
pub enum FakeReply {
    /// Transient I/O failure
    IoFault,
    /// No reply within the timeout
    Timeout,
    /// Reply bytes (`[type][payload]`)
    Reply(Vec<u8>),
}

/// Recorded transport call
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Join,
    Request { bytes: Vec<u8>, timeout: Duration },
    Leave,
}

/// Fake transport for testing.
///
/// Requests consume scripted replies in order; once the script runs out,
/// requests block until the caller gives up.
#[derive(Clone, Default)]
pub struct FakeTransport {
    replies: Arc<Mutex<VecDeque<FakeReply>>>,
    calls: Arc<Mutex<Vec<TransportCall>>>,
    broadcasts: Arc<Mutex<Option<mpsc::Sender<BroadcastEnvelope>>>>,
    joined: Arc<AtomicBool>,
    stall_termination: Arc<AtomicBool>,
    left: CancellationToken,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies for upcoming requests
    pub fn script(&self, replies: impl IntoIterator<Item = FakeReply>) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(replies);
    }

    /// Never report termination, even after leaving
    pub fn stall_termination(&self) {
        self.stall_termination.store(true, Ordering::SeqCst);
    }

    /// Deliver a broadcast to the joined node. Returns false if nobody is listening.
    pub async fn broadcast(&self, envelope: BroadcastEnvelope) -> bool {
        let tx = self
            .broadcasts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        match tx {
            Some(tx) => tx.send(envelope).await.is_ok(),
            None => false,
        }
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn request_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, TransportCall::Request { .. }))
            .count()
    }

    pub fn has_left(&self) -> bool {
        self.left.is_cancelled()
    }

    fn record(&self, call: TransportCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn join(&self) -> Result<mpsc::Receiver<BroadcastEnvelope>, TransportError> {
        self.record(TransportCall::Join);
        if self.joined.swap(true, Ordering::SeqCst) {
            return Err(TransportError::AlreadyJoined);
        }

        let (tx, rx) = mpsc::channel(16);
        *self.broadcasts.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);
        Ok(rx)
    }

    async fn request(
        &self,
        request: &[u8],
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        self.record(TransportCall::Request {
            bytes: request.to_vec(),
            timeout,
        });

        let next = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match next {
            Some(FakeReply::IoFault) => Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "injected fault",
            ))),
            Some(FakeReply::Timeout) => Ok(None),
            Some(FakeReply::Reply(bytes)) => Ok(Some(bytes)),
            None => std::future::pending().await,
        }
    }

    fn leave(&self) {
        self.record(TransportCall::Leave);
        self.left.cancel();
        self.broadcasts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
    }

    async fn terminated(&self) {
        if self.stall_termination.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.joined.load(Ordering::SeqCst) {
            self.left.cancelled().await;
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
