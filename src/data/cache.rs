use crate::error::MixfftError;
use crate::types::{EvaluationResult, GenomeDigest};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Digest-keyed store of measured results, shared by concurrent evaluation
/// tasks. Writes are last-writer-wins.
pub trait ResultCache: Send + Sync {
    fn get(&self, digest: &GenomeDigest) -> Option<EvaluationResult>;
    fn put(&self, digest: GenomeDigest, result: EvaluationResult);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

pub struct InMemoryResultCache {
    data: RwLock<HashMap<GenomeDigest, EvaluationResult>>,
    capacity: Option<usize>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for InMemoryResultCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl InMemoryResultCache {
    pub fn unbounded() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            capacity: None,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: RwLock::new(HashMap::with_capacity(capacity)),
            capacity: Some(capacity),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn from_capacity(capacity: Option<usize>) -> Self {
        match capacity {
            Some(capacity) => Self::with_capacity(capacity),
            None => Self::unbounded(),
        }
    }
}

impl ResultCache for InMemoryResultCache {
    fn get(&self, digest: &GenomeDigest) -> Option<EvaluationResult> {
        let data = self.data.read().unwrap_or_else(|e| e.into_inner());
        let found = data.get(digest).copied();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        found
    }

    fn put(&self, digest: GenomeDigest, result: EvaluationResult) {
        let mut data = self.data.write().unwrap_or_else(|e| e.into_inner());

        if let Some(previous) = data.get(&digest) {
            if *previous != result {
                log::warn!(
                    "{}",
                    MixfftError::CacheInconsistency(format!(
                        "{} already held {:?}, keeping newer {:?}",
                        digest.short(),
                        previous,
                        result
                    ))
                );
            }
        } else if let Some(capacity) = self.capacity {
            if data.len() >= capacity {
                // A simple eviction strategy: clear the cache when full.
                log::debug!("Result cache full ({} entries), clearing", data.len());
                data.clear();
            }
        }

        data.insert(digest, result);
    }

    fn len(&self) -> usize {
        self.data.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
