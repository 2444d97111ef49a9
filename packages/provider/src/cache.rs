/**
 * Evaluator cache
 *
 * Append-only map from raw annotation text to its compiled evaluator. It is
 * injected into the compiler rather than living in a global so tests and
 * hosts can share, inspect or reset it.
 */
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::compiler::Evaluator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug, Default)]
pub struct EvaluatorCache {
    entries: DashMap<String, Arc<Evaluator>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EvaluatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached evaluator for `text`; counts a hit or a miss
    pub fn get(&self, text: &str) -> Option<Arc<Evaluator>> {
        match self.entries.get(text) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(entry.value()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store `evaluator` unless another thread got there first; returns the stored one
    pub fn insert_if_absent(&self, text: &str, evaluator: Arc<Evaluator>) -> Arc<Evaluator> {
        let entry = self.entries.entry(text.to_string()).or_insert(evaluator);
        Arc::clone(entry.value())
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains_key(text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry and reset the counters
    pub fn clear(&self) {
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}
