// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the node's external collaborators

pub mod decoder;
pub mod sync;
pub mod traced;
pub mod transport;

pub use decoder::{DecoderAdapter, DecoderError, ProcessDecoder, ProcessDecoderAdapter};
pub use sync::{EngineSynchronizer, RsyncSynchronizer, SyncError};
pub use traced::{TracedDecoderAdapter, TracedSynchronizer, TracedTransport};
pub use transport::{TcpTransport, Transport, TransportError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use decoder::{FakeDecoder, FakeDecoderAdapter};
#[cfg(any(test, feature = "test-support"))]
pub use sync::FakeSynchronizer;
#[cfg(any(test, feature = "test-support"))]
pub use transport::{FakeReply, FakeTransport, TransportCall};
