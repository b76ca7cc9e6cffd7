//! In-memory cache of built graphs, keyed by normalized repository root

use crate::config::CacheConfig;
use crate::graph::DependencyGraph;
use dashmap::DashMap;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

struct CacheEntry {
    graph: Arc<DependencyGraph>,
    inserted_at: Instant,
    last_access: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| self.inserted_at.elapsed() >= ttl)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub builds: u64,
    pub evictions: u64,
    pub roots: Vec<PathBuf>,
}

/// Holds at most one graph per repository root.
///
/// Builds for the same root are serialized by a per-root lock, so two
/// callers asking for a missing graph build it once. Readers only clone an
/// `Arc`, so a rebuild never disturbs a snapshot that is already handed out.
pub struct GraphCache {
    entries: DashMap<PathBuf, CacheEntry>,
    build_locks: DashMap<PathBuf, Arc<Mutex<()>>>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
    evictions: AtomicU64,
}

impl Default for GraphCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl GraphCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            build_locks: DashMap::new(),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            builds: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    fn ttl(&self) -> Option<Duration> {
        self.config.ttl_secs.map(Duration::from_secs)
    }

    fn root_lock(&self, key: &Path) -> Arc<Mutex<()>> {
        self.build_locks
            .entry(key.to_path_buf())
            .or_default()
            .clone()
    }

    /// Current graph for `root`, if cached and not expired.
    pub fn get(&self, root: &Path) -> Option<Arc<DependencyGraph>> {
        let graph = self.lookup(&normalize_root(root));
        if graph.is_none() {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        graph
    }

    /// Live entry for `key`. Counts hits and expiries, never misses.
    fn lookup(&self, key: &Path) -> Option<Arc<DependencyGraph>> {
        match self.entries.get_mut(key) {
            Some(mut entry) if !entry.is_expired(self.ttl()) => {
                entry.last_access = Instant::now();
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(Arc::clone(&entry.graph));
            }
            Some(_) => {}
            None => return None,
        }

        tracing::debug!("Cached graph for {} expired", key.display());
        self.entries.remove(key);
        self.evictions.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Return the cached graph or build one under the root's lock.
    pub fn get_or_build<F, E>(&self, root: &Path, build: F) -> Result<Arc<DependencyGraph>, E>
    where
        F: FnOnce(&Path) -> Result<DependencyGraph, E>,
    {
        let key = normalize_root(root);
        if let Some(graph) = self.lookup(&key) {
            return Ok(graph);
        }

        let lock = self.root_lock(&key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have finished the build while we waited.
        if let Some(graph) = self.lookup(&key) {
            return Ok(graph);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.build_and_insert(key, build)
    }

    /// Drop the cached graph for `root` and build a fresh one.
    pub fn rebuild<F, E>(&self, root: &Path, build: F) -> Result<Arc<DependencyGraph>, E>
    where
        F: FnOnce(&Path) -> Result<DependencyGraph, E>,
    {
        let key = normalize_root(root);
        let lock = self.root_lock(&key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.invalidate(&key);
        self.build_and_insert(key, build)
    }

    fn build_and_insert<F, E>(&self, key: PathBuf, build: F) -> Result<Arc<DependencyGraph>, E>
    where
        F: FnOnce(&Path) -> Result<DependencyGraph, E>,
    {
        let graph = Arc::new(build(&key)?);
        self.builds.fetch_add(1, Ordering::Relaxed);
        self.insert(key, Arc::clone(&graph));
        Ok(graph)
    }

    fn insert(&self, key: PathBuf, graph: Arc<DependencyGraph>) {
        if !self.entries.contains_key(&key) {
            while self.entries.len() >= self.config.max_entries.max(1) {
                if !self.evict_least_recent() {
                    break;
                }
            }
        }
        let now = Instant::now();
        self.entries.insert(
            key,
            CacheEntry {
                graph,
                inserted_at: now,
                last_access: now,
            },
        );
    }

    fn evict_least_recent(&self) -> bool {
        let victim = self
            .entries
            .iter()
            .min_by_key(|entry| entry.last_access)
            .map(|entry| entry.key().clone());
        match victim {
            Some(key) => {
                tracing::debug!("Evicting cached graph for {}", key.display());
                self.entries.remove(&key);
                self.evictions.fetch_add(1, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Remove the graph for `root`. Returns whether one was cached.
    pub fn invalidate(&self, root: &Path) -> bool {
        let removed = self.entries.remove(&normalize_root(root)).is_some();
        if removed {
            tracing::debug!("Invalidated cached graph for {}", root.display());
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
        // A lock still referenced elsewhere guards a build in progress.
        self.build_locks.retain(|_, lock| Arc::strong_count(lock) == 1);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let mut roots: Vec<PathBuf> = self.entries.iter().map(|e| e.key().clone()).collect();
        roots.sort();
        CacheStats {
            entries: roots.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            roots,
        }
    }
}

/// Canonical form of a root path used as the cache key.
///
/// Falls back to lexical normalization when the path cannot be resolved.
pub fn normalize_root(root: &Path) -> PathBuf {
    if let Ok(canonical) = std::fs::canonicalize(root) {
        return canonical;
    }
    let mut normalized = PathBuf::new();
    for component in root.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
