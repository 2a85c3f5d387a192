// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mtn-core: shared types for the translation worker node
//!
//! This crate provides:
//! - Control-plane envelopes (sync-path requests, broadcast signals)
//! - Engine layout, languages and the master descriptor
//! - Node configuration
//! - Lifecycle state and the decoder sizing policy
//! - Process-wide tokenizer/detokenizer pools

pub mod config;
pub mod engine;
pub mod envelope;
pub mod language;
pub mod lifecycle;
pub mod master;
pub mod pools;
pub mod sizing;

// Re-exports
pub use config::{
    ClusterConfig, ConfigError, DecoderConfig, NodeConfig, NodeOptions, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_SHUTDOWN_GRACE,
};
pub use engine::{DecoderWeights, Engine, EngineError};
pub use envelope::{BroadcastEnvelope, EnvelopeError, Signal, SyncEnvelope, SIGNAL_RESET, SYNC_PATH};
pub use language::{Language, LanguageError};
pub use lifecycle::{ActiveFlag, NodeState, Outcome, RESTART_EXIT_CODE};
pub use master::{MasterDescriptor, SyncTarget};
pub use pools::{PoolKind, TextPool};
pub use sizing::DecoderSizing;
