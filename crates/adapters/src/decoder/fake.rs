// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake decoder adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{DecoderAdapter, DecoderError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Decoder handle produced by [`FakeDecoderAdapter`]
#[derive(Debug, Clone)]
pub struct FakeDecoder {
    /// 1-based launch number
    pub id: usize,
    pub config_path: PathBuf,
    /// Config file contents at launch time
    pub config: String,
}

/// Fake decoder adapter for testing
#[derive(Clone, Default)]
pub struct FakeDecoderAdapter {
    launches: Arc<AtomicUsize>,
    configs: Arc<Mutex<Vec<PathBuf>>>,
    fail_next: Arc<AtomicBool>,
    delay: Option<Duration>,
}

impl FakeDecoderAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make each launch take `delay`, widening the window for racing callers
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Fail the next launch
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Number of launches attempted
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    /// Config paths passed to successful launches
    pub fn configs(&self) -> Vec<PathBuf> {
        self.configs.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl DecoderAdapter for FakeDecoderAdapter {
    type Handle = FakeDecoder;

    async fn launch(&self, config_path: &Path) -> Result<FakeDecoder, DecoderError> {
        let id = self.launches.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(DecoderError::Launch("injected failure".to_string()));
        }

        let config = std::fs::read_to_string(config_path)
            .map_err(|_| DecoderError::ConfigNotFound(config_path.display().to_string()))?;

        self.configs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(config_path.to_path_buf());

        Ok(FakeDecoder {
            id,
            config_path: config_path.to_path_buf(),
            config,
        })
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
