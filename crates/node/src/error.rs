// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the worker node

use mtn_adapters::{DecoderError, SyncError, TransportError};
use mtn_core::EngineError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the worker node
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("node already started")]
    AlreadyStarted,
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),
    #[error("decoder error: {0}")]
    Decoder(#[from] DecoderError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("failed to write {0}: {1}")]
    Write(PathBuf, #[source] std::io::Error),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
