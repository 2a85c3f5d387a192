// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Restart after a reset: bounded shutdown, then exit with the restart status

use crate::node::WorkerNode;
use mtn_adapters::{DecoderAdapter, EngineSynchronizer, Transport};
use mtn_core::Outcome;

pub(crate) async fn run<T, S, D>(node: WorkerNode<T, S, D>)
where
    T: Transport,
    S: EngineSynchronizer,
    D: DecoderAdapter,
{
    let grace = node.settings().shutdown_grace;
    tracing::info!(grace_ms = grace.as_millis() as u64, "shutting down for restart");

    node.shutdown();
    if !node.await_termination(grace).await {
        tracing::warn!(
            grace_ms = grace.as_millis() as u64,
            "node did not terminate within grace period"
        );
    }

    node.request_outcome(Outcome::RestartRequested);
}
