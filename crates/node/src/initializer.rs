// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot task that obtains the sync path from the master

use crate::node::WorkerNode;
use mtn_adapters::{DecoderAdapter, EngineSynchronizer, Transport};
use mtn_core::SyncEnvelope;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Fetch the sync path and hand it off to the node, at most once
pub(crate) async fn run<T, S, D>(node: &WorkerNode<T, S, D>)
where
    T: Transport,
    S: EngineSynchronizer,
    D: DecoderAdapter,
{
    let timeout = node.settings().request_timeout;
    let Some(remote_path) = fetch_sync_path(node.transport(), node.cancellation(), timeout).await
    else {
        tracing::debug!("initializer cancelled");
        return;
    };

    // Failures are logged by the node
    let _ = node.on_sync_path_received(&remote_path).await;
}

/// Ask the master for the sync path until it answers or `cancel` fires.
///
/// I/O faults, timeouts and malformed replies are retried without backoff.
/// Returns `None` only when cancelled.
pub(crate) async fn fetch_sync_path<T: Transport>(
    transport: &T,
    cancel: &CancellationToken,
    timeout: Duration,
) -> Option<String> {
    let request = SyncEnvelope::sync_path_request().encode();
    let mut attempt: u64 = 0;

    loop {
        attempt += 1;
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            response = transport.request(&request, timeout) => response,
        };

        match response {
            Ok(Some(bytes)) => {
                match SyncEnvelope::decode(&bytes).and_then(SyncEnvelope::into_sync_path) {
                    Ok(remote_path) => {
                        tracing::debug!(attempt, remote_path = %remote_path, "sync path received");
                        return Some(remote_path);
                    }
                    Err(e) => tracing::warn!(attempt, error = %e, "discarding sync path reply"),
                }
            }
            Ok(None) => tracing::debug!(attempt, "no sync path reply before timeout"),
            Err(e) => {
                tracing::warn!(attempt, error = %e, "exception while requesting sync path");
                tokio::task::yield_now().await;
            }
        }
    }
}

#[cfg(test)]
#[path = "initializer_tests.rs"]
mod tests;
