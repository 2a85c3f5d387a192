// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translation engine on disk

use crate::language::Language;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Decoder feature weights, keyed by feature name
pub type DecoderWeights = BTreeMap<String, Vec<f32>>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("invalid decoder weights in {0}: {1}")]
    Weights(PathBuf, #[source] serde_json::Error),
}

/// A translation engine: its models live under `root`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engine {
    pub name: String,
    pub root: PathBuf,
    pub source: Language,
    pub target: Language,
}

impl Engine {
    pub fn new(
        name: impl Into<String>,
        root: impl Into<PathBuf>,
        source: Language,
        target: Language,
    ) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            source,
            target,
        }
    }

    pub fn decoder_dir(&self) -> PathBuf {
        self.root.join("models").join("decoder")
    }

    /// Decoder configuration template, with `${ENGINE_PATH}` placeholders
    pub fn decoder_template(&self) -> PathBuf {
        self.decoder_dir().join("decoder.ini")
    }

    pub fn weights_path(&self) -> PathBuf {
        self.decoder_dir().join("weights.json")
    }

    /// Default runtime directory for a node role (e.g. `worker`)
    pub fn runtime_dir(&self, role: &str) -> PathBuf {
        self.root.join("runtime").join(role)
    }

    /// Stored decoder weights, if the engine has been tuned
    pub fn decoder_weights(&self) -> Result<Option<DecoderWeights>, EngineError> {
        let path = self.weights_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(EngineError::Read(path, e)),
        };
        let weights = serde_json::from_str(&content).map_err(|e| EngineError::Weights(path, e))?;
        Ok(Some(weights))
    }

    pub fn read_decoder_template(&self) -> Result<String, EngineError> {
        let path = self.decoder_template();
        std::fs::read_to_string(&path).map_err(|e| EngineError::Read(path, e))
    }

    pub fn has_decoder_template(&self) -> bool {
        self.decoder_template().is_file()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
