// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide text processing pools.
//!
//! Tokenizers and detokenizers are shared by every request handler in the
//! process. Pools are created on first use for a language and then reused.

use crate::language::Language;
use crate::sizing::available_cores;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

/// Which side of the translation a pool serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    Tokenizer,
    Detokenizer,
}

/// A pool of text processors for one language
#[derive(Debug)]
pub struct TextPool {
    kind: PoolKind,
    language: Language,
    capacity: usize,
}

impl TextPool {
    fn new(kind: PoolKind, language: Language) -> Self {
        Self {
            kind,
            language,
            capacity: available_cores(),
        }
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Maximum concurrent processors
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

type PoolMap = Mutex<HashMap<(PoolKind, Language), Arc<TextPool>>>;

fn registry() -> &'static PoolMap {
    static POOLS: OnceLock<PoolMap> = OnceLock::new();
    POOLS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Cached pool for `kind` and `language`, created on first request
pub fn cached(kind: PoolKind, language: &Language) -> Arc<TextPool> {
    let mut pools = registry().lock().unwrap_or_else(|e| e.into_inner());
    let pool = pools
        .entry((kind, language.clone()))
        .or_insert_with(|| {
            tracing::debug!(?kind, %language, "creating text pool");
            Arc::new(TextPool::new(kind, language.clone()))
        });
    Arc::clone(pool)
}

pub fn tokenizer(language: &Language) -> Arc<TextPool> {
    cached(PoolKind::Tokenizer, language)
}

pub fn detokenizer(language: &Language) -> Arc<TextPool> {
    cached(PoolKind::Detokenizer, language)
}

#[cfg(test)]
#[path = "pools_tests.rs"]
mod tests;
