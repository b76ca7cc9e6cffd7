//! Strata Core — file dependency graph, semantic layers, and graph cache

pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod layers;
pub mod model;


#[cfg(test)]
pub mod test_utils;

pub use cache::{normalize_root, CacheStats, GraphCache};
pub use config::{
    AnalysisConfig, CacheConfig, LayerConfig, OrchestratorConfig, ResolverConfig, CONFIG_FILE,
};
pub use error::{ConfigError, GraphError};
pub use graph::{
    CentralityEntry, CentralityReport, CentralitySummary, Cycle, DependencyGraph, GraphExport,
    GraphStats, MemoryStats, ModuleInsights, NodeEdges, NodeSummary, RankedNode, EXPORT_VERSION,
};
pub use layers::{
    Expansion, ImpactChain, LayerMetadata, RiskIndicator, RiskKind, SemanticLayerEngine,
    SemanticLayers, Severity, Tier, Unit, UnitEdge, UnitKind, UnitMetrics, UnitProjection,
    UnitRole, UnitSummary,
};
pub use model::{
    normalize_separators, parent_directory, DependencyEdge, EdgeKind, FileNode, FileRole,
    Language, NodeId,
};
