// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decoder adapters

mod process;

pub use process::{ProcessDecoder, ProcessDecoderAdapter};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeDecoder, FakeDecoderAdapter};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors from decoder construction
#[derive(Debug, Error)]
pub enum DecoderError {
    #[error("failed to launch decoder: {0}")]
    Launch(String),
    #[error("decoder config not found: {0}")]
    ConfigNotFound(String),
}

/// Constructs decoder handles from a generated configuration file
#[async_trait]
pub trait DecoderAdapter: Clone + Send + Sync + 'static {
    type Handle: Send + Sync + 'static;

    async fn launch(&self, config_path: &Path) -> Result<Self::Handle, DecoderError>;
}
