// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decoder running as a child process

use super::{DecoderAdapter, DecoderError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

/// Launches `command [args..] -f <config>`
#[derive(Clone, Debug)]
pub struct ProcessDecoderAdapter {
    command: String,
    args: Vec<String>,
}

impl ProcessDecoderAdapter {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }
}

/// Handle to a running decoder process. The process is killed on drop.
#[derive(Debug)]
pub struct ProcessDecoder {
    child: Mutex<Child>,
    pid: Option<u32>,
    config_path: PathBuf,
}

impl ProcessDecoder {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Whether the process is still running
    pub async fn is_running(&self) -> bool {
        matches!(self.child.lock().await.try_wait(), Ok(None))
    }
}

#[async_trait]
impl DecoderAdapter for ProcessDecoderAdapter {
    type Handle = ProcessDecoder;

    async fn launch(&self, config_path: &Path) -> Result<ProcessDecoder, DecoderError> {
        if !config_path.is_file() {
            return Err(DecoderError::ConfigNotFound(
                config_path.display().to_string(),
            ));
        }

        let child = Command::new(&self.command)
            .args(&self.args)
            .arg("-f")
            .arg(config_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DecoderError::Launch(format!("{}: {}", self.command, e)))?;

        Ok(ProcessDecoder {
            pid: child.id(),
            child: Mutex::new(child),
            config_path: config_path.to_path_buf(),
        })
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
