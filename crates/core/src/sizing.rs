// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decoder sizing derived from hardware parallelism.
//!
//! Machines with more than three cores keep two cores of headroom for the
//! control plane and transport; smaller machines use every core.

use std::sync::OnceLock;

/// Threshold above which the headroom rule applies
const HEADROOM_MIN_CORES: usize = 4;
/// Cores reserved for non-decoder work on larger machines
const HEADROOM_CORES: usize = 2;

/// Decoder thread and secondary worker counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderSizing {
    pub threads: usize,
    pub workers: usize,
}

impl DecoderSizing {
    pub fn for_cores(cores: usize) -> Self {
        if cores >= HEADROOM_MIN_CORES {
            Self {
                threads: cores - HEADROOM_CORES,
                workers: 2,
            }
        } else {
            Self {
                threads: cores,
                workers: 1,
            }
        }
    }

    /// Sizing for this machine, computed once per process
    pub fn detect() -> Self {
        static SIZING: OnceLock<DecoderSizing> = OnceLock::new();
        *SIZING.get_or_init(|| Self::for_cores(available_cores()))
    }
}

/// Available hardware parallelism, falling back to a single core
pub fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
#[path = "sizing_tests.rs"]
mod tests;
