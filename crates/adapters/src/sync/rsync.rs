// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! rsync-based synchronizer
//!
//! Remote masters are mirrored with `rsync` over `ssh`. Standalone nodes copy
//! from a local path instead, which is a no-op when the path already is the
//! engine directory.

use super::{EngineSynchronizer, SyncError};
use async_trait::async_trait;
use mtn_core::{Engine, MasterDescriptor, SyncTarget};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Synchronizer backed by `rsync` (remote) or a local copy (standalone)
#[derive(Clone, Debug)]
pub struct RsyncSynchronizer {
    target: SyncTarget,
}

impl RsyncSynchronizer {
    pub fn new(target: SyncTarget) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &SyncTarget {
        &self.target
    }

    /// Build the command mirroring `remote_path` on `master` into `local`
    pub(crate) fn remote_command(
        master: &MasterDescriptor,
        remote_path: &str,
        local: &Path,
    ) -> Command {
        let mut ssh = String::from("ssh -o StrictHostKeyChecking=no -o BatchMode=");
        ssh.push_str(if master.password.is_some() { "no" } else { "yes" });
        if let Some(key) = &master.key_file {
            ssh.push_str(&format!(" -i {}", key.display()));
        }

        let source = match &master.user {
            Some(user) => format!("{}@{}:{}", user, master.host, with_trailing_slash(remote_path)),
            None => format!("{}:{}", master.host, with_trailing_slash(remote_path)),
        };

        let mut cmd = match &master.password {
            Some(password) => {
                let mut cmd = Command::new("sshpass");
                cmd.arg("-e").arg("rsync").env("SSHPASS", password);
                cmd
            }
            None => Command::new("rsync"),
        };
        cmd.arg("-a")
            .arg("--delete")
            .arg("-e")
            .arg(ssh)
            .arg(source)
            .arg(format!("{}/", local.display()));
        cmd
    }

    async fn sync_remote(
        &self,
        master: &MasterDescriptor,
        remote_path: &str,
        local: &Path,
    ) -> Result<(), SyncError> {
        tokio::fs::create_dir_all(local).await?;

        let output = Self::remote_command(master, remote_path, local)
            .output()
            .await
            .map_err(|e| SyncError::CommandFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SyncError::CommandFailed(format!(
                "rsync from {} exited with {}: {}",
                master.host,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }

    async fn sync_local(&self, remote_path: &str, local: &Path) -> Result<(), SyncError> {
        let source = PathBuf::from(remote_path);
        let local = local.to_path_buf();

        tokio::task::spawn_blocking(move || {
            if same_location(&source, &local) {
                tracing::debug!(
                    path = %local.display(),
                    "local sync source is the engine directory"
                );
                return Ok(());
            }
            if !source.is_dir() {
                return Err(SyncError::Validation(format!(
                    "sync source is not a directory: {}",
                    source.display()
                )));
            }
            std::fs::create_dir_all(&local)?;
            let source = source.canonicalize()?;
            let local = local.canonicalize()?;
            copy_tree(&source, &local, &local)
        })
        .await
        .map_err(|e| SyncError::Io(std::io::Error::other(e)))?
    }
}

#[async_trait]
impl EngineSynchronizer for RsyncSynchronizer {
    async fn sync(&self, remote_path: &str, engine: &Engine) -> Result<(), SyncError> {
        match &self.target {
            SyncTarget::Local => self.sync_local(remote_path, engine.root()).await?,
            SyncTarget::Remote(master) => {
                self.sync_remote(master, remote_path, engine.root()).await?
            }
        }

        if !engine.has_decoder_template() {
            return Err(SyncError::Validation(format!(
                "decoder template missing after sync: {}",
                engine.decoder_template().display()
            )));
        }

        Ok(())
    }
}

fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Recursively copy `source` into `dest`, overwriting existing files.
///
/// `engine_root` is never descended into, so a source that contains the
/// engine directory does not copy into itself.
fn copy_tree(source: &Path, dest: &Path, engine_root: &Path) -> Result<(), SyncError> {
    std::fs::create_dir_all(dest)?;
    for entry in std::fs::read_dir(source)? {
        let entry = entry?;
        let path = entry.path();
        if path == engine_root {
            tracing::debug!(
                path = %path.display(),
                "skipping engine directory inside sync source"
            );
            continue;
        }
        let target = dest.join(entry.file_name());
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            copy_tree(&path, &target, engine_root)?;
        } else if file_type.is_file() {
            std::fs::copy(&path, &target)?;
        } else {
            tracing::warn!(path = %path.display(), "skipping non-regular file");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "rsync_tests.rs"]
mod tests;
