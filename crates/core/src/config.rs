// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Node configuration file
//!
//! ```toml
//! [engine]
//! name = "default"
//! path = "/opt/engines/default"
//! source = "en"
//! target = "it"
//!
//! [master]            # omit to run standalone
//! host = "10.0.0.1"
//! user = "mmt"
//! key_file = "/etc/mtn/master.pem"
//!
//! [cluster]
//! ports = [5016, 5017]
//! request_timeout = "1m"
//! shutdown_grace = "2s"
//! ```

use crate::engine::Engine;
use crate::language::Language;
use crate::master::{MasterDescriptor, SyncTarget};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Per-attempt wait for the master's sync-path reply
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Wait for shutdown before a reset forces the restart
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete node configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    pub engine: EngineConfig,
    #[serde(default)]
    pub master: Option<MasterDescriptor>,
    #[serde(default)]
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub node: NodeOptions,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default = "default_engine_name")]
    pub name: String,
    pub path: PathBuf,
    pub source: Language,
    pub target: Language,
}

/// Transport ports and control-plane timings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterConfig {
    /// Request port, then broadcast port
    #[serde(default = "default_ports")]
    pub ports: [u16; 2],
    /// Per-attempt wait for the master's sync-path response
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
    /// How long a reset waits for a clean shutdown before exiting
    #[serde(default = "default_shutdown_grace", with = "humantime_serde")]
    pub shutdown_grace: Duration,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            ports: default_ports(),
            request_timeout: default_request_timeout(),
            shutdown_grace: default_shutdown_grace(),
        }
    }
}

/// External decoder process
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecoderConfig {
    #[serde(default = "default_decoder_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Build the decoder before the node turns active
    #[serde(default)]
    pub preload: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            command: default_decoder_command(),
            args: Vec::new(),
            preload: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeOptions {
    /// Where generated configuration is written; defaults to `<engine>/runtime/worker`
    #[serde(default)]
    pub runtime_dir: Option<PathBuf>,
    /// Restart the process (exit 101) when synchronization fails
    #[serde(default)]
    pub restart_on_sync_failure: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log file; stderr when unset
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl NodeConfig {
    /// Load and validate a config file.
    ///
    /// Relative paths are resolved against the directory holding the file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let mut config = Self::parse(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_relative(base);
        }
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let [request, broadcast] = self.cluster.ports;
        if request == 0 || broadcast == 0 {
            return Err(ConfigError::Invalid("cluster ports must be non-zero".into()));
        }
        if request == broadcast {
            return Err(ConfigError::Invalid(format!(
                "request and broadcast ports must differ (both {})",
                request
            )));
        }
        if self.cluster.request_timeout.is_zero() {
            return Err(ConfigError::Invalid("request_timeout must be positive".into()));
        }
        if let Some(master) = &self.master {
            if master.host.trim().is_empty() {
                return Err(ConfigError::Invalid("master host must not be empty".into()));
            }
        }
        if self.decoder.command.trim().is_empty() {
            return Err(ConfigError::Invalid("decoder command must not be empty".into()));
        }
        Ok(())
    }

    fn resolve_relative(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.engine.path);
        if let Some(dir) = self.node.runtime_dir.as_mut() {
            resolve(dir);
        }
        if let Some(file) = self.logging.file.as_mut() {
            resolve(file);
        }
        if let Some(key) = self.master.as_mut().and_then(|m| m.key_file.as_mut()) {
            resolve(key);
        }
    }

    pub fn engine(&self) -> Engine {
        Engine::new(
            self.engine.name.clone(),
            self.engine.path.clone(),
            self.engine.source.clone(),
            self.engine.target.clone(),
        )
    }

    pub fn runtime_dir(&self) -> PathBuf {
        self.node
            .runtime_dir
            .clone()
            .unwrap_or_else(|| self.engine().runtime_dir("worker"))
    }

    pub fn sync_target(&self) -> SyncTarget {
        SyncTarget::from_master(self.master.as_ref())
    }
}

fn default_engine_name() -> String {
    "default".to_string()
}

fn default_ports() -> [u16; 2] {
    [5016, 5017]
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_shutdown_grace() -> Duration {
    DEFAULT_SHUTDOWN_GRACE
}

fn default_decoder_command() -> String {
    "moses".to_string()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
