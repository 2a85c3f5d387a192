// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decoder configuration generated from the engine's template
//!
//! The template is an INI-style file made of `[section]` headers, each
//! followed by one value per line. Lines before the first header are kept
//! verbatim. `${ENGINE_PATH}` is replaced by the engine root before parsing.

use crate::error::NodeError;
use mtn_core::{DecoderSizing, DecoderWeights, Engine};
use std::fmt;
use std::path::{Path, PathBuf};

/// Placeholder for the engine root in the decoder template
pub const ENGINE_PATH_VAR: &str = "${ENGINE_PATH}";
/// Name of the generated file inside the runtime directory
pub const DECODER_CONFIG_FILE: &str = "decoder.ini";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    name: String,
    lines: Vec<String>,
}

/// Parsed decoder configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecoderIni {
    preamble: Vec<String>,
    sections: Vec<Section>,
}

impl DecoderIni {
    /// Load a template, substituting the engine root for `${ENGINE_PATH}`
    pub fn load(template: &str, engine_root: &Path) -> Self {
        let expanded = template.replace(ENGINE_PATH_VAR, &engine_root.display().to_string());
        Self::parse(&expanded)
    }

    pub fn parse(content: &str) -> Self {
        let mut ini = Self::default();

        for line in content.lines() {
            let trimmed = line.trim();
            if let Some(name) = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
            {
                ini.sections.push(Section {
                    name: name.trim().to_string(),
                    lines: Vec::new(),
                });
                continue;
            }

            match ini.sections.last_mut() {
                Some(section) if !trimmed.is_empty() => section.lines.push(trimmed.to_string()),
                Some(_) => {}
                None => ini.preamble.push(line.to_string()),
            }
        }

        while ini.preamble.last().is_some_and(|l| l.trim().is_empty()) {
            ini.preamble.pop();
        }
        ini
    }

    /// Build the configuration for `engine`: template, stored weights, sizing
    pub fn for_engine(engine: &Engine, sizing: DecoderSizing) -> Result<Self, NodeError> {
        let template = engine.read_decoder_template()?;
        let mut ini = Self::load(&template, engine.root());

        if let Some(weights) = engine.decoder_weights()? {
            ini.set_weights(&weights);
        }
        ini.set_threads(sizing.threads);
        ini.set_workers(sizing.workers);
        Ok(ini)
    }

    /// Values of `name`, if the section exists
    pub fn section(&self, name: &str) -> Option<&[String]> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.lines.as_slice())
    }

    /// Replace the values of `name`, appending the section when missing
    pub fn set_section(&mut self, name: &str, lines: Vec<String>) {
        match self.sections.iter_mut().find(|s| s.name == name) {
            Some(section) => section.lines = lines,
            None => self.sections.push(Section {
                name: name.to_string(),
                lines,
            }),
        }
    }

    /// Replace the `[weight]` section with `Feature= w1 w2 ...` lines
    pub fn set_weights(&mut self, weights: &DecoderWeights) {
        let lines = weights
            .iter()
            .map(|(feature, values)| {
                let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                format!("{}= {}", feature, values.join(" "))
            })
            .collect();
        self.set_section("weight", lines);
    }

    pub fn set_threads(&mut self, threads: usize) {
        self.set_section("threads", vec![threads.to_string()]);
    }

    pub fn set_workers(&mut self, workers: usize) {
        self.set_section("workers", vec![workers.to_string()]);
    }

    /// Write the rendered configuration into `dir`, returning the file path
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, NodeError> {
        std::fs::create_dir_all(dir).map_err(|e| NodeError::Write(dir.to_path_buf(), e))?;
        let path = dir.join(DECODER_CONFIG_FILE);
        std::fs::write(&path, self.to_string()).map_err(|e| NodeError::Write(path.clone(), e))?;
        Ok(path)
    }
}

impl fmt::Display for DecoderIni {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.preamble {
            writeln!(f, "{}", line)?;
        }
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "[{}]", section.name)?;
            for line in &section.lines {
                writeln!(f, "{}", line)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "decoder_config_tests.rs"]
mod tests;
