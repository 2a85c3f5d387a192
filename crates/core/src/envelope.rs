// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-plane envelopes exchanged with the master.
//!
//! Both envelopes share the same shape on the wire: a single leading byte
//! (request type or signal code) followed by an opaque payload.

use thiserror::Error;

/// Request type asking the master where the node should sync its models from.
pub const SYNC_PATH: u8 = 0x01;

/// Broadcast signal asking every node to restart.
pub const SIGNAL_RESET: u8 = 0x01;

/// Errors decoding an envelope
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvelopeError {
    #[error("empty envelope")]
    Empty,
    #[error("unexpected envelope type: {0:#04x}")]
    UnexpectedType(u8),
    #[error("payload is not valid UTF-8")]
    InvalidUtf8,
}

/// Point-to-point request or response: `[type][payload]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEnvelope {
    pub kind: u8,
    pub payload: Vec<u8>,
}

impl SyncEnvelope {
    /// Request for the sync path (empty payload)
    pub fn sync_path_request() -> Self {
        Self {
            kind: SYNC_PATH,
            payload: Vec::new(),
        }
    }

    /// Response carrying the remote path the node should sync from
    pub fn sync_path_response(remote_path: &str) -> Self {
        Self {
            kind: SYNC_PATH,
            payload: remote_path.as_bytes().to_vec(),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + self.payload.len());
        bytes.push(self.kind);
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        let (&kind, payload) = bytes.split_first().ok_or(EnvelopeError::Empty)?;
        Ok(Self {
            kind,
            payload: payload.to_vec(),
        })
    }

    /// Interpret this envelope as a sync-path response.
    ///
    /// Fails when the type tag is not [`SYNC_PATH`] or the payload is not UTF-8.
    pub fn into_sync_path(self) -> Result<String, EnvelopeError> {
        if self.kind != SYNC_PATH {
            return Err(EnvelopeError::UnexpectedType(self.kind));
        }
        String::from_utf8(self.payload).map_err(|_| EnvelopeError::InvalidUtf8)
    }
}

/// Known broadcast signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Reset,
    /// Reserved for other collaborators; tolerated and ignored
    Unknown(u8),
}

impl From<u8> for Signal {
    fn from(code: u8) -> Self {
        match code {
            SIGNAL_RESET => Signal::Reset,
            other => Signal::Unknown(other),
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Reset => write!(f, "reset"),
            Signal::Unknown(code) => write!(f, "{:#04x}", code),
        }
    }
}

/// Cluster-wide broadcast: `[signal][payload]`
///
/// The payload is kept as the full frame plus an `offset`/`length` window so
/// receivers can forward it without copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastEnvelope {
    pub signal: u8,
    pub payload: Vec<u8>,
    pub offset: usize,
    pub length: usize,
}

impl BroadcastEnvelope {
    pub fn new(signal: u8, payload: Vec<u8>) -> Self {
        let length = payload.len();
        Self {
            signal,
            payload,
            offset: 0,
            length,
        }
    }

    pub fn reset() -> Self {
        Self::new(SIGNAL_RESET, Vec::new())
    }

    /// Wrap a received frame without copying the payload out of it
    pub fn from_frame(frame: Vec<u8>) -> Result<Self, EnvelopeError> {
        let signal = *frame.first().ok_or(EnvelopeError::Empty)?;
        let length = frame.len() - 1;
        Ok(Self {
            signal,
            payload: frame,
            offset: 1,
            length,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + self.length);
        bytes.push(self.signal);
        bytes.extend_from_slice(self.body());
        bytes
    }

    /// The payload window, clamped to the backing buffer
    pub fn body(&self) -> &[u8] {
        let start = self.offset.min(self.payload.len());
        let end = self.offset.saturating_add(self.length).min(self.payload.len());
        &self.payload[start..end]
    }

    pub fn signal(&self) -> Signal {
        Signal::from(self.signal)
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
