//! Full graph builds: extraction, resolution, assembly

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use strata_core::{normalize_separators, AnalysisConfig, DependencyGraph};

use crate::coordinator::{Coordinator, ResolutionStats};
use crate::error::BuildError;
use crate::extractor::StructuralExtractor;
use crate::languages::ExtractorRegistry;

/// Builds a [`DependencyGraph`] from scratch for a list of paths.
pub struct GraphBuilder {
    config: AnalysisConfig,
    registry: ExtractorRegistry,
}

impl GraphBuilder {
    pub fn new(config: AnalysisConfig) -> Self {
        Self::with_registry(config, ExtractorRegistry::default())
    }

    pub fn with_registry(config: AnalysisConfig, registry: ExtractorRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn build(&self, root: &Path, paths: &[String]) -> Result<DependencyGraph, BuildError> {
        self.build_with_stats(root, paths).map(|(graph, _)| graph)
    }

    /// Node ids follow the order of `paths`; repeated paths keep their first position.
    pub fn build_with_stats(
        &self,
        root: &Path,
        paths: &[String],
    ) -> Result<(DependencyGraph, ResolutionStats), BuildError> {
        let start = Instant::now();
        tracing::info!("Building dependency graph for {}", root.display());

        let paths = normalize_paths(paths);
        let extraction = StructuralExtractor.extract(root, &paths)?;

        let coordinator = Coordinator::new(
            &self.registry,
            &self.config.resolver,
            &self.config.orchestrator,
        );
        let resolution = coordinator.resolve(&extraction.nodes)?;

        let elapsed = start.elapsed().as_millis() as u64;
        let graph = DependencyGraph::assemble(root, extraction.nodes, resolution.edges, elapsed)?;

        tracing::info!(
            "Graph ready: {} nodes, {} edges in {}ms",
            graph.node_count(),
            graph.edge_count(),
            elapsed
        );
        Ok((graph, resolution.stats))
    }
}

fn normalize_paths(paths: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(paths.len());
    paths
        .iter()
        .map(|p| {
            let p = normalize_separators(p);
            p.strip_prefix("./").map(str::to_string).unwrap_or(p)
        })
        .filter(|p| !p.is_empty() && seen.insert(p.clone()))
        .collect()
}
