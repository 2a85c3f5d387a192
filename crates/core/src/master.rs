// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster master descriptor

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Host a worker synchronizes against.
///
/// A node without a master runs standalone and syncs from localhost.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MasterDescriptor {
    pub host: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub key_file: Option<PathBuf>,
}

impl MasterDescriptor {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: None,
            password: None,
            key_file: None,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_key_file(mut self, key_file: impl Into<PathBuf>) -> Self {
        self.key_file = Some(key_file.into());
        self
    }
}

// Password stays out of logs
impl fmt::Debug for MasterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterDescriptor")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("key_file", &self.key_file)
            .finish()
    }
}

/// Where synchronization pulls from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTarget {
    Local,
    Remote(MasterDescriptor),
}

impl SyncTarget {
    pub fn from_master(master: Option<&MasterDescriptor>) -> Self {
        match master {
            Some(master) => SyncTarget::Remote(master.clone()),
            None => SyncTarget::Local,
        }
    }

    /// Host name used for logging and transport connections
    pub fn host(&self) -> &str {
        match self {
            SyncTarget::Local => "localhost",
            SyncTarget::Remote(master) => &master.host,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, SyncTarget::Local)
    }
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host())
    }
}

#[cfg(test)]
#[path = "master_tests.rs"]
mod tests;
