//! Dependency graph wrapper using petgraph::DiGraph indexed by NodeId

use crate::error::GraphError;
use crate::model::*;
use chrono::{DateTime, Utc};
use fixedbitset::FixedBitSet;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Version tag written into every [`GraphExport`].
pub const EXPORT_VERSION: &str = "1.0";

/// The file-level dependency graph of one repository.
///
/// Built once by [`DependencyGraph::assemble`] and never mutated afterwards;
/// a rebuild produces a new instance. The petgraph node index of every file
/// equals its [`NodeId`].
pub struct DependencyGraph {
    root: PathBuf,
    inner: DiGraph<FileNode, DependencyEdge>,
    path_index: HashMap<String, NodeId>,
    built_at: DateTime<Utc>,
    build_duration_ms: u64,
    stats: GraphStats,
}

impl std::fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("root", &self.root)
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

/// Incoming and outgoing edges of one node.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct NodeEdges {
    pub incoming: Vec<DependencyEdge>,
    pub outgoing: Vec<DependencyEdge>,
}

/// A node together with the degree it was ranked by.
#[derive(Debug, Clone, Serialize)]
pub struct RankedNode<'a> {
    #[serde(flatten)]
    pub node: &'a FileNode,
    pub degree: usize,
}

/// A dependency cycle. The first node is repeated at the end, so every
/// consecutive pair is an edge of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle {
    pub nodes: Vec<NodeId>,
}

impl Cycle {
    /// Number of distinct nodes on the cycle.
    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// The cycle rendered as repository-relative paths.
    pub fn paths(&self, graph: &DependencyGraph) -> Vec<String> {
        self.nodes
            .iter()
            .filter_map(|id| graph.node(*id))
            .map(|n| n.relative_path.clone())
            .collect()
    }
}

/// Aggregate statistics, computed once when the graph is assembled.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub languages: BTreeMap<Language, usize>,
    pub roles: BTreeMap<FileRole, usize>,
    pub total_lines: u64,
    pub total_size_bytes: u64,
    pub average_in_degree: f64,
    pub average_out_degree: f64,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
    /// Nodes with neither incoming nor outgoing edges.
    pub orphan_count: usize,
    pub cycle_count: usize,
}

/// Whole-graph snapshot for export.
#[derive(Debug, Serialize)]
pub struct GraphExport<'a> {
    pub version: &'static str,
    pub exported_at: DateTime<Utc>,
    pub root: &'a Path,
    pub built_at: DateTime<Utc>,
    pub build_duration_ms: u64,
    pub nodes: Vec<&'a FileNode>,
    pub edges: Vec<DependencyEdge>,
    pub stats: &'a GraphStats,
}

/// Approximate serialized size of the graph.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MemoryStats {
    pub node_bytes: usize,
    pub edge_bytes: usize,
    pub total_bytes: usize,
    pub estimated_kb: usize,
}

/// Hub/leaf classification of a single node.
#[derive(Debug, Clone, Serialize)]
pub struct CentralityEntry<'a> {
    #[serde(flatten)]
    pub node: &'a FileNode,
    pub depends_on: usize,
    pub depended_by: usize,
    /// `2 * depended_by + depends_on`.
    pub score: usize,
    pub is_hub: bool,
    pub is_leaf: bool,
    pub is_orphan: bool,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CentralitySummary {
    pub total_nodes: usize,
    pub hub_count: usize,
    pub leaf_count: usize,
    pub orphan_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CentralityReport<'a> {
    /// Sorted by score, highest first.
    pub nodes: Vec<CentralityEntry<'a>>,
    pub summary: CentralitySummary,
}

/// Short reference to a neighbouring node.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NodeSummary {
    pub id: NodeId,
    pub name: String,
    pub path: String,
}

impl From<&FileNode> for NodeSummary {
    fn from(node: &FileNode) -> Self {
        NodeSummary {
            id: node.id,
            name: node.name.clone(),
            path: node.relative_path.clone(),
        }
    }
}

/// One-hop view of a node with plain-language observations.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleInsights<'a> {
    pub node: &'a FileNode,
    pub depends_on: Vec<NodeSummary>,
    pub depended_by: Vec<NodeSummary>,
    pub observations: Vec<String>,
}

/// In-degree above which a node counts as a hub.
const HUB_IN_DEGREE: usize = 3;

fn index(id: NodeId) -> NodeIndex {
    NodeIndex::new(id.index())
}

fn node_id(idx: NodeIndex) -> NodeId {
    NodeId(idx.index() as u32)
}

impl DependencyGraph {
    /// Assemble a graph from extracted nodes and resolved edges.
    ///
    /// Node ids must equal their position in `nodes`. Self-loops and repeated
    /// `(source, target)` pairs are dropped; the surviving edges are stored
    /// in `(source, target)` order.
    pub fn assemble(
        root: impl Into<PathBuf>,
        nodes: Vec<FileNode>,
        edges: impl IntoIterator<Item = DependencyEdge>,
        build_duration_ms: u64,
    ) -> Result<Self, GraphError> {
        let mut inner = DiGraph::with_capacity(nodes.len(), 0);
        let mut path_index = HashMap::with_capacity(nodes.len());

        for (position, node) in nodes.into_iter().enumerate() {
            let expected = NodeId(position as u32);
            if node.id != expected {
                return Err(GraphError::NonDenseId {
                    expected,
                    found: node.id,
                });
            }
            path_index.insert(node.relative_path.clone(), node.id);
            inner.add_node(node);
        }

        let node_count = inner.node_count();
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for edge in edges {
            if edge.source.index() >= node_count || edge.target.index() >= node_count {
                return Err(GraphError::DanglingEdge {
                    from: edge.source,
                    to: edge.target,
                });
            }
            if edge.source == edge.target {
                tracing::debug!("Dropping self-reference on {}", edge.source);
                continue;
            }
            if seen.insert(edge.key()) {
                unique.push(edge);
            }
        }
        unique.sort_unstable_by_key(DependencyEdge::key);
        for edge in unique {
            inner.add_edge(index(edge.source), index(edge.target), edge);
        }

        let mut graph = DependencyGraph {
            root: root.into(),
            inner,
            path_index,
            built_at: Utc::now(),
            build_duration_ms,
            stats: GraphStats::default(),
        };
        graph.stats = graph.compute_stats();
        Ok(graph)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn build_duration_ms(&self) -> u64 {
        self.build_duration_ms
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.inner.node_count()
    }

    /// Iterate over all nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &FileNode> {
        self.inner.node_weights()
    }

    /// Iterate over all edges in `(source, target)` order.
    pub fn edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.inner.edge_weights()
    }

    pub fn node(&self, id: NodeId) -> Option<&FileNode> {
        self.inner.node_weight(index(id))
    }

    /// Find a node by repository-relative or absolute path.
    pub fn node_by_path(&self, path: &str) -> Option<&FileNode> {
        let normalized = normalize_separators(path);
        let relative = match Path::new(&normalized).strip_prefix(&self.root) {
            Ok(rest) => normalize_separators(&rest.to_string_lossy()),
            Err(_) => normalized.trim_start_matches("./").to_string(),
        };
        self.path_index.get(&relative).and_then(|id| self.node(*id))
    }

    /// Find a node by `node_<n>` id token or by path.
    pub fn lookup(&self, key: &str) -> Option<&FileNode> {
        NodeId::parse(key)
            .and_then(|id| self.node(id))
            .or_else(|| self.node_by_path(key))
    }

    pub fn nodes_by_role(&self, role: FileRole) -> Vec<&FileNode> {
        self.nodes().filter(|n| n.role == role).collect()
    }

    pub fn nodes_by_language(&self, language: Language) -> Vec<&FileNode> {
        self.nodes().filter(|n| n.language == language).collect()
    }

    fn neighbors(&self, id: NodeId, direction: Direction) -> Vec<NodeId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut out: Vec<NodeId> = self
            .inner
            .neighbors_directed(index(id), direction)
            .map(node_id)
            .collect();
        out.sort_unstable();
        out
    }

    pub fn edges_for_node(&self, id: NodeId) -> NodeEdges {
        let edge_to = |source: NodeId, target: NodeId| DependencyEdge {
            source,
            target,
            kind: EdgeKind::Import,
        };
        NodeEdges {
            incoming: self
                .neighbors(id, Direction::Incoming)
                .into_iter()
                .map(|source| edge_to(source, id))
                .collect(),
            outgoing: self
                .neighbors(id, Direction::Outgoing)
                .into_iter()
                .map(|target| edge_to(id, target))
                .collect(),
        }
    }

    /// Nodes `id` imports directly.
    pub fn dependencies(&self, id: NodeId) -> Vec<&FileNode> {
        self.neighbors(id, Direction::Outgoing)
            .into_iter()
            .filter_map(|n| self.node(n))
            .collect()
    }

    /// Nodes that import `id` directly.
    pub fn dependents(&self, id: NodeId) -> Vec<&FileNode> {
        self.neighbors(id, Direction::Incoming)
            .into_iter()
            .filter_map(|n| self.node(n))
            .collect()
    }

    /// Every node reachable from `id` along outgoing edges, in DFS preorder.
    /// `id` itself is included only when it sits on a cycle.
    pub fn transitive_dependencies(&self, id: NodeId) -> Vec<&FileNode> {
        let mut visited = FixedBitSet::with_capacity(self.node_count());
        let mut stack: Vec<NodeId> = self.neighbors(id, Direction::Outgoing);
        stack.reverse();
        let mut reached = Vec::new();

        while let Some(next) = stack.pop() {
            if visited.put(next.index()) {
                continue;
            }
            reached.push(next);
            let mut further = self.neighbors(next, Direction::Outgoing);
            further.retain(|n| !visited.contains(n.index()));
            further.reverse();
            stack.extend(further);
        }

        reached.into_iter().filter_map(|n| self.node(n)).collect()
    }

    pub fn in_degree(&self, id: NodeId) -> usize {
        if !self.contains(id) {
            return 0;
        }
        self.inner
            .neighbors_directed(index(id), Direction::Incoming)
            .count()
    }

    pub fn out_degree(&self, id: NodeId) -> usize {
        if !self.contains(id) {
            return 0;
        }
        self.inner
            .neighbors_directed(index(id), Direction::Outgoing)
            .count()
    }

    fn ranked_by(&self, limit: usize, degree: impl Fn(NodeId) -> usize) -> Vec<RankedNode<'_>> {
        let mut ranked: Vec<RankedNode<'_>> = self
            .nodes()
            .map(|node| RankedNode {
                node,
                degree: degree(node.id),
            })
            .collect();
        ranked.sort_by(|a, b| b.degree.cmp(&a.degree).then(a.node.id.cmp(&b.node.id)));
        ranked.truncate(limit);
        ranked
    }

    /// Nodes with the highest in-degree.
    pub fn most_used(&self, limit: usize) -> Vec<RankedNode<'_>> {
        self.ranked_by(limit, |id| self.in_degree(id))
    }

    /// Nodes with the highest out-degree.
    pub fn most_dependent(&self, limit: usize) -> Vec<RankedNode<'_>> {
        self.ranked_by(limit, |id| self.out_degree(id))
    }

    /// Find dependency cycles with an iterative depth-first search.
    ///
    /// Whenever the search meets a node that is still on the DFS stack, the
    /// stack slice from that node plus the closing edge is reported. Each
    /// node is expanded once, so this reports the cycles closed by back
    /// edges, not every elementary cycle.
    pub fn find_cycles(&self) -> Vec<Cycle> {
        struct Frame {
            node: NodeId,
            neighbors: Vec<NodeId>,
            cursor: usize,
        }

        let mut cycles = Vec::new();
        if self.edge_count() == 0 {
            return cycles;
        }

        let count = self.node_count();
        let mut visited = FixedBitSet::with_capacity(count);
        let mut on_stack = FixedBitSet::with_capacity(count);
        let mut path: Vec<NodeId> = Vec::new();
        let mut frames: Vec<Frame> = Vec::new();

        for start in self.nodes().map(|n| n.id) {
            if visited.contains(start.index()) {
                continue;
            }
            visited.insert(start.index());
            on_stack.insert(start.index());
            path.push(start);
            frames.push(Frame {
                node: start,
                neighbors: self.neighbors(start, Direction::Outgoing),
                cursor: 0,
            });

            while let Some(frame) = frames.last_mut() {
                let Some(next) = frame.neighbors.get(frame.cursor).copied() else {
                    let done = frame.node;
                    frames.pop();
                    on_stack.set(done.index(), false);
                    path.pop();
                    continue;
                };
                frame.cursor += 1;

                if on_stack.contains(next.index()) {
                    if let Some(pos) = path.iter().position(|&p| p == next) {
                        let mut nodes = path[pos..].to_vec();
                        nodes.push(next);
                        cycles.push(Cycle { nodes });
                    }
                } else if !visited.contains(next.index()) {
                    visited.insert(next.index());
                    on_stack.insert(next.index());
                    path.push(next);
                    frames.push(Frame {
                        node: next,
                        neighbors: self.neighbors(next, Direction::Outgoing),
                        cursor: 0,
                    });
                }
            }
        }

        cycles
    }

    fn compute_stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            ..GraphStats::default()
        };

        let mut in_total = 0usize;
        let mut out_total = 0usize;
        for node in self.nodes() {
            *stats.languages.entry(node.language).or_insert(0) += 1;
            *stats.roles.entry(node.role).or_insert(0) += 1;
            stats.total_lines += u64::from(node.line_count);
            stats.total_size_bytes += node.size_bytes;

            let in_degree = self.in_degree(node.id);
            let out_degree = self.out_degree(node.id);
            in_total += in_degree;
            out_total += out_degree;
            stats.max_in_degree = stats.max_in_degree.max(in_degree);
            stats.max_out_degree = stats.max_out_degree.max(out_degree);
            if in_degree == 0 && out_degree == 0 {
                stats.orphan_count += 1;
            }
        }

        if stats.node_count > 0 {
            stats.average_in_degree = in_total as f64 / stats.node_count as f64;
            stats.average_out_degree = out_total as f64 / stats.node_count as f64;
        }
        stats.cycle_count = self.find_cycles().len();
        stats
    }

    pub fn stats(&self) -> &GraphStats {
        &self.stats
    }

    /// Snapshot of the whole graph for serialization.
    pub fn export(&self) -> GraphExport<'_> {
        GraphExport {
            version: EXPORT_VERSION,
            exported_at: Utc::now(),
            root: &self.root,
            built_at: self.built_at,
            build_duration_ms: self.build_duration_ms,
            nodes: self.nodes().collect(),
            edges: self.edges().copied().collect(),
            stats: &self.stats,
        }
    }

    pub fn memory_stats(&self) -> Result<MemoryStats, GraphError> {
        let nodes: Vec<&FileNode> = self.nodes().collect();
        let edges: Vec<&DependencyEdge> = self.edges().collect();
        let node_bytes = serde_json::to_vec(&nodes)?.len();
        let edge_bytes = serde_json::to_vec(&edges)?.len();
        let total_bytes = node_bytes + edge_bytes;
        Ok(MemoryStats {
            node_bytes,
            edge_bytes,
            total_bytes,
            estimated_kb: (total_bytes + 512) / 1024,
        })
    }

    /// Score every node by how central it is to the dependency structure.
    pub fn centrality(&self) -> CentralityReport<'_> {
        let mut entries: Vec<CentralityEntry<'_>> = self
            .nodes()
            .map(|node| {
                let depends_on = self.out_degree(node.id);
                let depended_by = self.in_degree(node.id);
                CentralityEntry {
                    node,
                    depends_on,
                    depended_by,
                    score: depended_by * 2 + depends_on,
                    is_hub: depended_by > HUB_IN_DEGREE,
                    is_leaf: depended_by > 0 && depends_on == 0,
                    is_orphan: depended_by == 0 && depends_on == 0,
                }
            })
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then(a.node.id.cmp(&b.node.id)));

        let summary = CentralitySummary {
            total_nodes: entries.len(),
            hub_count: entries.iter().filter(|e| e.is_hub).count(),
            leaf_count: entries.iter().filter(|e| e.is_leaf).count(),
            orphan_count: entries.iter().filter(|e| e.is_orphan).count(),
        };
        CentralityReport {
            nodes: entries,
            summary,
        }
    }

    /// Neighbours of `id` plus observations about its connectivity.
    pub fn insights(&self, id: NodeId) -> Option<ModuleInsights<'_>> {
        let node = self.node(id)?;
        let depends_on: Vec<NodeSummary> =
            self.dependencies(id).into_iter().map(NodeSummary::from).collect();
        let depended_by: Vec<NodeSummary> =
            self.dependents(id).into_iter().map(NodeSummary::from).collect();

        let mut observations = Vec::new();
        if depended_by.len() > 5 {
            observations.push(format!(
                "This file is referenced by {} other files.",
                depended_by.len()
            ));
        }
        if depends_on.len() > 10 {
            observations.push(format!(
                "This file depends on {} other files.",
                depends_on.len()
            ));
        }
        if depended_by.is_empty() && depends_on.is_empty() {
            observations.push("This file has no detected connections to other files.".to_string());
        }
        if !depended_by.is_empty() && depends_on.is_empty() {
            observations.push(
                "This file is a leaf node - it provides functionality without dependencies."
                    .to_string(),
            );
        }

        Some(ModuleInsights {
            node,
            depends_on,
            depended_by,
            observations,
        })
    }
}
