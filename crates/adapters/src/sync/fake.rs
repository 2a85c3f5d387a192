// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake synchronizer for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{EngineSynchronizer, SyncError};
use async_trait::async_trait;
use mtn_core::Engine;
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};

/// Fake synchronizer for testing.
///
/// Records every remote path it is asked to sync. A gated fake blocks inside
/// `sync` until [`FakeSynchronizer::release`] is called.
#[derive(Clone, Default)]
pub struct FakeSynchronizer {
    calls: Arc<Mutex<Vec<String>>>,
    failure: Arc<Mutex<Option<String>>>,
    gate: Option<Arc<Semaphore>>,
    entered: Arc<Notify>,
}

impl FakeSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A synchronizer that blocks until released
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::default()
        }
    }

    /// Make subsequent syncs fail with `message`
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.into());
    }

    /// Let one blocked sync complete
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    /// Wait until a sync has started
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Get all recorded remote paths
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl EngineSynchronizer for FakeSynchronizer {
    async fn sync(&self, remote_path: &str, _engine: &Engine) -> Result<(), SyncError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(remote_path.to_string());
        self.entered.notify_one();

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let failure = self
            .failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        match failure {
            Some(message) => Err(SyncError::CommandFailed(message)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
