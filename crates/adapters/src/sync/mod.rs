// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Model synchronization adapters

mod rsync;

pub use rsync::RsyncSynchronizer;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSynchronizer;

use async_trait::async_trait;
use mtn_core::Engine;
use thiserror::Error;

/// Errors from synchronization
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("command failed: {0}")]
    CommandFailed(String),
    #[error("validation failed: {0}")]
    Validation(String),
}

/// Pulls model artifacts from a remote path into the engine's directory.
///
/// Implementations must be idempotent: syncing twice from the same path
/// converges to the same local state.
#[async_trait]
pub trait EngineSynchronizer: Clone + Send + Sync + 'static {
    async fn sync(&self, remote_path: &str, engine: &Engine) -> Result<(), SyncError>;
}
