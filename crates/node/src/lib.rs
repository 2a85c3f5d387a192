// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Translation worker node: lifecycle, master synchronization and reset handling

pub mod decoder_config;
mod error;
mod initializer;
mod killer;
mod node;

pub use decoder_config::DecoderIni;
pub use error::NodeError;
pub use node::{NodeDeps, NodeSettings, WorkerNode};
