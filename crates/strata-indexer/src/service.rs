//! Cached analysis entry points used by the CLI and other front ends

use std::path::Path;
use std::sync::Arc;

use strata_core::{
    AnalysisConfig, DependencyEdge, DependencyGraph, Expansion, FileNode, GraphCache,
    ImpactChain, SemanticLayerEngine, SemanticLayers, UnitProjection,
};

use crate::builder::GraphBuilder;
use crate::complexity::{ComplexityAnalyzer, ComplexityReport};
use crate::error::BuildError;
use crate::scanner::{RepositoryScanner, WalkScanner};

/// Owns the build pipeline and shares graphs through an injected [`GraphCache`].
pub struct AnalysisService {
    cache: Arc<GraphCache>,
    builder: GraphBuilder,
    engine: SemanticLayerEngine,
    scanner: Box<dyn RepositoryScanner>,
}

impl AnalysisService {
    pub fn new(config: AnalysisConfig, cache: Arc<GraphCache>) -> Result<Self, BuildError> {
        Ok(Self::with_scanner(config, cache, Box::new(WalkScanner::new()?)))
    }

    pub fn with_scanner(
        config: AnalysisConfig,
        cache: Arc<GraphCache>,
        scanner: Box<dyn RepositoryScanner>,
    ) -> Self {
        Self {
            engine: SemanticLayerEngine::new(config.layers.clone()),
            builder: GraphBuilder::new(config),
            cache,
            scanner,
        }
    }

    pub fn cache(&self) -> &Arc<GraphCache> {
        &self.cache
    }

    pub fn engine(&self) -> &SemanticLayerEngine {
        &self.engine
    }

    /// The cached graph for `root`, building it on first use.
    pub fn build_graph(&self, root: &Path) -> Result<Arc<DependencyGraph>, BuildError> {
        self.cache.get_or_build(root, |root| self.build_fresh(root))
    }

    /// Discard any cached graph for `root` and build a new one.
    pub fn recompute(&self, root: &Path) -> Result<Arc<DependencyGraph>, BuildError> {
        tracing::info!("Recomputing graph for {}", root.display());
        self.cache.rebuild(root, |root| self.build_fresh(root))
    }

    pub fn semantic_layers(&self, root: &Path) -> Result<SemanticLayers, BuildError> {
        Ok(self.engine.select(self.projection(root)?))
    }

    /// Files of one unit plus neighbours. `depth` defaults to the tier's reveal depth.
    /// Returns `None` for an unknown unit id.
    pub fn expand_unit(
        &self,
        root: &Path,
        unit_id: &str,
        depth: Option<usize>,
    ) -> Result<Option<Expansion>, BuildError> {
        let graph = self.build_graph(root)?;
        let (nodes, edges) = graph_parts(&graph);
        let projection = self.engine.project(&nodes, &edges, nodes.len());

        let Some(unit) = projection.unit(unit_id) else {
            return Ok(None);
        };
        let depth = depth.unwrap_or_else(|| projection.tier.reveal_depth());
        Ok(Some(self.engine.expand_unit(unit, &nodes, &edges, depth)))
    }

    /// Upstream and downstream units of `unit_id`. Returns `None` for an unknown unit id.
    pub fn unit_impact(
        &self,
        root: &Path,
        unit_id: &str,
        max_depth: Option<usize>,
    ) -> Result<Option<ImpactChain>, BuildError> {
        let projection = self.projection(root)?;
        let depth = max_depth.unwrap_or(self.engine.config().default_impact_depth);
        Ok(self
            .engine
            .impact_chain(unit_id, &projection.units, &projection.edges, depth))
    }

    pub fn complexity(&self, root: &Path) -> Result<ComplexityReport, BuildError> {
        let paths = self.scanner.scan(root)?;
        let analyzer = ComplexityAnalyzer::new(self.builder.config().resolver.max_file_size_bytes);
        Ok(analyzer.analyze(root, &paths))
    }

    /// Every unit of the graph's tier, before visibility limits.
    fn projection(&self, root: &Path) -> Result<UnitProjection, BuildError> {
        let graph = self.build_graph(root)?;
        let (nodes, edges) = graph_parts(&graph);
        Ok(self.engine.project(&nodes, &edges, nodes.len()))
    }

    fn build_fresh(&self, root: &Path) -> Result<DependencyGraph, BuildError> {
        let paths = self.scanner.scan(root)?;
        self.builder.build(root, &paths)
    }
}

fn graph_parts(graph: &DependencyGraph) -> (Vec<FileNode>, Vec<DependencyEdge>) {
    (graph.nodes().cloned().collect(), graph.edges().copied().collect())
}
