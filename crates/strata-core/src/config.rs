//! Analysis configuration.
//!
//! Every section falls back to its defaults when absent, so an empty
//! `strata.toml` is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default name of the per-repository config file.
pub const CONFIG_FILE: &str = "strata.toml";

/// Top-level configuration for a build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub resolver: ResolverConfig,
    pub orchestrator: OrchestratorConfig,
    pub layers: LayerConfig,
    pub cache: CacheConfig,
}

impl AnalysisConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Load `strata.toml` from `root` if present, defaults otherwise.
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        let candidate = root.join(CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!("Loading config from {}", candidate.display());
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `STRATA_*` overrides from an environment lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse(key: &str, value: String) -> Result<usize, ConfigError> {
            value.trim().parse().map_err(|_| ConfigError::InvalidOverride {
                key: key.to_string(),
                value,
            })
        }

        if let Some(value) = lookup("STRATA_LARGE_REPO_THRESHOLD") {
            self.orchestrator.large_repo_threshold = parse("STRATA_LARGE_REPO_THRESHOLD", value)?;
        }
        if let Some(value) = lookup("STRATA_MAX_PARALLEL_CHUNKS") {
            let chunks = parse("STRATA_MAX_PARALLEL_CHUNKS", value)?;
            self.orchestrator.max_parallel_chunks = chunks.max(1);
        }
        Ok(())
    }
}

/// Reference extraction and resolution limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Files above this size are treated as generated and skipped.
    pub max_file_size_bytes: u64,
    pub max_references_per_file: usize,
    /// Basename fallback only fires for final segments longer than this.
    pub basename_min_len: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 500 * 1024,
            max_references_per_file: 200,
            basename_min_len: 5,
        }
    }
}

/// Chunked parallel resolution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Chunked processing is used when the file count exceeds this.
    pub large_repo_threshold: usize,
    pub max_parallel_chunks: usize,
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
    /// Target number of chunks before clamping.
    pub chunk_divisor: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            large_repo_threshold: 1000,
            max_parallel_chunks: 4,
            min_chunk_size: 50,
            max_chunk_size: 500,
            chunk_divisor: 100,
        }
    }
}

impl OrchestratorConfig {
    /// `clamp(file_count / chunk_divisor, min_chunk_size, max_chunk_size)`.
    pub fn chunk_size(&self, file_count: usize) -> usize {
        let min = self.min_chunk_size.max(1);
        let max = self.max_chunk_size.max(min);
        (file_count / self.chunk_divisor.max(1)).clamp(min, max)
    }
}

/// Semantic layering thresholds and visibility ceilings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Below this file count every file is its own unit.
    pub file_tier_limit: usize,
    /// Below this file count directories are units; clusters above.
    pub folder_tier_limit: usize,
    pub max_initial_units: usize,
    pub max_visible_nodes: usize,
    pub max_detail_nodes: usize,
    /// Minimum adjacency score for a node to join an existing cluster.
    pub cluster_join_threshold: usize,
    /// Upstream/downstream set size above which a risk is flagged.
    pub impact_risk_threshold: usize,
    pub default_impact_depth: usize,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            file_tier_limit: 80,
            folder_tier_limit: 500,
            max_initial_units: 20,
            max_visible_nodes: 300,
            max_detail_nodes: 150,
            cluster_join_threshold: 2,
            impact_risk_threshold: 10,
            default_impact_depth: 3,
        }
    }
}

/// Graph instance cache limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: usize,
    /// Entries older than this are rebuilt on next access. `None` keeps them.
    pub ttl_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 16,
            ttl_secs: None,
        }
    }
}
