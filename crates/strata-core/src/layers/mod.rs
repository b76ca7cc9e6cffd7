//! Semantic layering: projects a dependency graph into a bounded set of
//! navigable units.
//!
//! Small repositories show one unit per file, medium repositories one unit
//! per directory, and large repositories one unit per connectivity cluster.
//! Whatever the tier, the visible projection is capped so that a consumer
//! never has to lay out more than a few hundred elements at once.

mod clustering;
mod expand;
mod impact;
mod summary;
mod tiers;

pub use expand::Expansion;
pub use impact::{ImpactChain, RiskIndicator, RiskKind, Severity};
pub use summary::{UnitMetrics, UnitRole, UnitSummary};

use crate::config::LayerConfig;
use crate::model::{DependencyEdge, FileNode, FileRole, Language, NodeId};
use serde::Serialize;
use std::collections::HashSet;

/// Size bracket that decides unit granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    File,
    Folder,
    Cluster,
}

impl Tier {
    /// Default number of hops a consumer should reveal when expanding.
    pub fn reveal_depth(self) -> usize {
        match self {
            Tier::File => 3,
            Tier::Folder => 2,
            Tier::Cluster => 1,
        }
    }
}

/// What a unit stands for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UnitKind {
    File {
        node: NodeId,
        path: String,
        language: Language,
        role: FileRole,
    },
    Folder {
        path: String,
    },
    Cluster {
        index: usize,
        common_prefix: String,
    },
}

/// A visualization-level grouping of one or more files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unit {
    /// `file:<path>`, `folder:<dir>` or `cluster:<n>`.
    pub id: String,
    pub label: String,
    pub kind: UnitKind,
    pub members: Vec<NodeId>,
    /// Distinct incoming unit edges.
    pub in_degree: usize,
    /// Distinct outgoing unit edges.
    pub out_degree: usize,
    pub summary: UnitSummary,
}

impl Unit {
    pub fn total_degree(&self) -> usize {
        self.in_degree + self.out_degree
    }
}

/// Directed edge between two units. `weight` counts the file edges it collapses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UnitEdge {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

/// Every unit of a tier before visibility limits are applied.
#[derive(Debug, Clone, Serialize)]
pub struct UnitProjection {
    pub tier: Tier,
    pub units: Vec<Unit>,
    pub edges: Vec<UnitEdge>,
}

impl UnitProjection {
    pub fn unit(&self, unit_id: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == unit_id)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LayerMetadata {
    pub tier: Tier,
    pub total_units: usize,
    pub visible_units: usize,
    pub reveal_depth: usize,
    pub max_visible_nodes: usize,
    pub max_detail_nodes: usize,
    pub max_initial_units: usize,
}

/// The bounded first-level view of a repository.
#[derive(Debug, Clone, Serialize)]
pub struct SemanticLayers {
    pub units: Vec<Unit>,
    pub edges: Vec<UnitEdge>,
    pub metadata: LayerMetadata,
}

/// Builds unit projections and answers expansion / impact queries.
#[derive(Debug, Clone, Default)]
pub struct SemanticLayerEngine {
    config: LayerConfig,
}

impl SemanticLayerEngine {
    pub fn new(config: LayerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    pub fn tier_for(&self, file_count: usize) -> Tier {
        if file_count < self.config.file_tier_limit {
            Tier::File
        } else if file_count < self.config.folder_tier_limit {
            Tier::Folder
        } else {
            Tier::Cluster
        }
    }

    /// All units for the tier implied by `file_count`, sorted by total degree.
    pub fn project(
        &self,
        nodes: &[FileNode],
        edges: &[DependencyEdge],
        file_count: usize,
    ) -> UnitProjection {
        let tier = self.tier_for(file_count);
        let (mut units, edges) = match tier {
            Tier::File => tiers::file_units(nodes, edges),
            Tier::Folder => tiers::folder_units(nodes, edges),
            Tier::Cluster => {
                let clusters =
                    clustering::assign(nodes, edges, self.config.cluster_join_threshold);
                tiers::cluster_units(nodes, edges, &clusters)
            }
        };

        for unit in &mut units {
            unit.summary = UnitSummary::for_degrees(
                unit.in_degree,
                unit.out_degree,
                unit.members.len(),
            );
        }
        // Stable sort keeps construction order among equal degrees.
        units.sort_by(|a, b| b.total_degree().cmp(&a.total_degree()));

        tracing::debug!(
            "Projected {} files into {} {:?} units",
            nodes.len(),
            units.len(),
            tier
        );
        UnitProjection { tier, units, edges }
    }

    /// Project and apply the initial-unit cap and the visible-node ceiling.
    pub fn process(
        &self,
        nodes: &[FileNode],
        edges: &[DependencyEdge],
        file_count: usize,
    ) -> SemanticLayers {
        self.select(self.project(nodes, edges, file_count))
    }

    /// Apply visibility limits to a full projection.
    pub fn select(&self, projection: UnitProjection) -> SemanticLayers {
        let UnitProjection { tier, mut units, edges } = projection;
        let total_units = units.len();

        units.truncate(self.config.max_initial_units);
        units.truncate(self.config.max_visible_nodes);

        let visible: HashSet<&str> = units.iter().map(|u| u.id.as_str()).collect();
        let edges: Vec<UnitEdge> = edges
            .into_iter()
            .filter(|e| visible.contains(e.source.as_str()) && visible.contains(e.target.as_str()))
            .collect();

        let metadata = LayerMetadata {
            tier,
            total_units,
            visible_units: units.len(),
            reveal_depth: tier.reveal_depth(),
            max_visible_nodes: self.config.max_visible_nodes,
            max_detail_nodes: self.config.max_detail_nodes,
            max_initial_units: self.config.max_initial_units,
        };
        SemanticLayers {
            units,
            edges,
            metadata,
        }
    }

    /// Reveal a unit's files plus `depth - 1` hops of neighbours.
    pub fn expand_unit(
        &self,
        unit: &Unit,
        nodes: &[FileNode],
        edges: &[DependencyEdge],
        depth: usize,
    ) -> Expansion {
        expand::expand(unit, nodes, edges, depth, self.config.max_detail_nodes)
    }

    /// Upstream and downstream units of `unit_id`, with risk flags.
    /// Returns `None` when `unit_id` is not among `units`.
    pub fn impact_chain(
        &self,
        unit_id: &str,
        units: &[Unit],
        edges: &[UnitEdge],
        max_depth: usize,
    ) -> Option<ImpactChain> {
        if !units.iter().any(|u| u.id == unit_id) {
            return None;
        }
        Some(impact::chain(
            unit_id,
            edges,
            max_depth,
            self.config.impact_risk_threshold,
        ))
    }
}
