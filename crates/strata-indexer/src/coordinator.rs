//! Orchestrates dependency resolution, sequentially or in parallel chunks

use std::fs;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use strata_core::{DependencyEdge, FileNode, OrchestratorConfig, ResolverConfig};

use crate::error::{BuildError, FileError};
use crate::languages::ExtractorRegistry;
use crate::resolver::{FileIndex, ImportResolver};

/// How a resolution pass went.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    pub total_files: usize,
    pub chunk_count: usize,
    pub chunk_size: usize,
    pub files_failed: usize,
    pub files_skipped: usize,
    pub elapsed_ms: u64,
    pub chunked: bool,
}

/// Merged edges of a resolution pass, sorted by `(source, target)`.
#[derive(Debug, Default)]
pub struct Resolution {
    pub edges: Vec<DependencyEdge>,
    pub stats: ResolutionStats,
}

/// What one worker produced. Workers never share state.
#[derive(Default)]
struct ChunkOutcome {
    edges: Vec<DependencyEdge>,
    failed: usize,
    skipped: usize,
}

impl ChunkOutcome {
    fn absorb(&mut self, other: ChunkOutcome) {
        self.edges.extend(other.edges);
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

/// Turns file nodes into dependency edges.
pub struct Coordinator<'a> {
    registry: &'a ExtractorRegistry,
    resolver: &'a ResolverConfig,
    orchestrator: &'a OrchestratorConfig,
}

impl<'a> Coordinator<'a> {
    pub fn new(
        registry: &'a ExtractorRegistry,
        resolver: &'a ResolverConfig,
        orchestrator: &'a OrchestratorConfig,
    ) -> Self {
        Self {
            registry,
            resolver,
            orchestrator,
        }
    }

    /// Resolve every file's references. Node ids must already be final.
    pub fn resolve(&self, nodes: &[FileNode]) -> Result<Resolution, BuildError> {
        let start = Instant::now();
        let index = FileIndex::new(nodes);

        let chunked = nodes.len() > self.orchestrator.large_repo_threshold;
        let (outcome, chunk_count, chunk_size) = if chunked {
            self.resolve_chunked(nodes, &index)?
        } else {
            let outcome = self.resolve_files(nodes, &index);
            (outcome, usize::from(!nodes.is_empty()), nodes.len())
        };

        let ChunkOutcome {
            mut edges,
            failed,
            skipped,
        } = outcome;
        edges.sort_unstable_by_key(DependencyEdge::key);
        edges.dedup_by_key(|e| e.key());

        let stats = ResolutionStats {
            total_files: nodes.len(),
            chunk_count,
            chunk_size,
            files_failed: failed,
            files_skipped: skipped,
            elapsed_ms: start.elapsed().as_millis() as u64,
            chunked,
        };
        tracing::info!(
            "Resolved {} edges across {} files in {}ms (chunked: {}, failed: {}, skipped: {})",
            edges.len(),
            stats.total_files,
            stats.elapsed_ms,
            chunked,
            failed,
            skipped
        );
        Ok(Resolution { edges, stats })
    }

    fn resolve_chunked(
        &self,
        nodes: &[FileNode],
        index: &FileIndex,
    ) -> Result<(ChunkOutcome, usize, usize), BuildError> {
        let chunk_size = self.orchestrator.chunk_size(nodes.len());
        let chunk_count = nodes.len().div_ceil(chunk_size);
        let threads = self.orchestrator.max_parallel_chunks.max(1);
        tracing::info!(
            "Large repository: {} files in {} chunks of {} on {} threads",
            nodes.len(),
            chunk_count,
            chunk_size,
            threads
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("strata-chunk-{i}"))
            .build()?;

        let outcomes: Vec<ChunkOutcome> = pool.install(|| {
            nodes
                .par_chunks(chunk_size)
                .enumerate()
                .map(|(chunk_index, chunk)| {
                    let outcome = self.resolve_files(chunk, index);
                    tracing::debug!(
                        "Chunk {}/{}: {} files, {} edges",
                        chunk_index + 1,
                        chunk_count,
                        chunk.len(),
                        outcome.edges.len()
                    );
                    outcome
                })
                .collect()
        });

        let mut merged = ChunkOutcome::default();
        for outcome in outcomes {
            merged.absorb(outcome);
        }
        Ok((merged, chunk_count, chunk_size))
    }

    fn resolve_files(&self, files: &[FileNode], index: &FileIndex) -> ChunkOutcome {
        let resolver = ImportResolver::new(index, self.resolver.basename_min_len);
        let mut outcome = ChunkOutcome::default();
        for node in files {
            match self.resolve_file(node, &resolver) {
                Ok(Some(edges)) => outcome.edges.extend(edges),
                Ok(None) => outcome.skipped += 1,
                Err(err) => {
                    tracing::warn!("{}", err);
                    outcome.failed += 1;
                }
            }
        }
        outcome
    }

    /// Edges out of one file. `Ok(None)` means the file was too large to read.
    fn resolve_file(
        &self,
        node: &FileNode,
        resolver: &ImportResolver<'_>,
    ) -> Result<Option<Vec<DependencyEdge>>, FileError> {
        let Some(extractor) = self.registry.for_language(node.language) else {
            return Ok(Some(Vec::new()));
        };

        let limit = self.resolver.max_file_size_bytes;
        if node.size_bytes > limit {
            let skipped = FileError::TooLarge {
                path: node.absolute_path.clone(),
                size: node.size_bytes,
                limit,
            };
            tracing::debug!("Skipping: {}", skipped);
            return Ok(None);
        }

        let bytes = fs::read(&node.absolute_path).map_err(|source| FileError::Read {
            path: node.absolute_path.clone(),
            source,
        })?;
        let content = String::from_utf8_lossy(&bytes);

        let mut references = extractor.extract_references(&content);
        references.truncate(self.resolver.max_references_per_file);

        let edges = references
            .iter()
            .filter_map(|specifier| resolver.resolve(node, specifier))
            .filter_map(|target| DependencyEdge::import(node.id, target))
            .collect();
        Ok(Some(edges))
    }
}
