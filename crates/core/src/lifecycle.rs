// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node lifecycle state shared across tasks

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Exit status asking the supervisor to relaunch the process
pub const RESTART_EXIT_CODE: i32 = 101;

/// Lifecycle state of a worker node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Inactive,
    Active,
}

impl std::fmt::Display for NodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeState::Inactive => write!(f, "inactive"),
            NodeState::Active => write!(f, "active"),
        }
    }
}

const INACTIVE: u8 = 0;
const ACTIVE: u8 = 1;
const RETIRED: u8 = 2;

/// Shared active flag.
///
/// Writes use release ordering and reads acquire, so everything that happened
/// before activation (the model sync) is visible to whoever observes `true`.
/// Once retired by a reset the flag never becomes active again.
#[derive(Debug, Clone, Default)]
pub struct ActiveFlag(Arc<AtomicU8>);

impl ActiveFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire) == ACTIVE
    }

    /// Become active unless retired. Returns whether the flag is now active.
    pub fn activate(&self) -> bool {
        match self
            .0
            .compare_exchange(INACTIVE, ACTIVE, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => true,
            Err(current) => current == ACTIVE,
        }
    }

    /// Go inactive for good
    pub fn retire(&self) {
        self.0.store(RETIRED, Ordering::Release);
    }

    pub fn is_retired(&self) -> bool {
        self.0.load(Ordering::Acquire) == RETIRED
    }

    pub fn state(&self) -> NodeState {
        if self.is_active() {
            NodeState::Active
        } else {
            NodeState::Inactive
        }
    }
}

/// How a node asks the hosting process to end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Clean stop (external shutdown)
    Stopped,
    /// Voluntary restart: the supervisor should relaunch us
    RestartRequested,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Stopped => 0,
            Outcome::RestartRequested => RESTART_EXIT_CODE,
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
