//! Unit expansion into member files and their neighbourhood

use super::Unit;
use crate::model::{DependencyEdge, FileNode, NodeId};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Files revealed by expanding a unit, with the edges among them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Expansion {
    pub nodes: Vec<FileNode>,
    pub edges: Vec<DependencyEdge>,
}

pub(super) fn expand(
    unit: &Unit,
    nodes: &[FileNode],
    edges: &[DependencyEdge],
    depth: usize,
    max_nodes: usize,
) -> Expansion {
    let by_id: HashMap<NodeId, &FileNode> = nodes.iter().map(|n| (n.id, n)).collect();

    let mut revealed: Vec<NodeId> = Vec::new();
    let mut seen: HashSet<NodeId> = HashSet::new();
    for id in &unit.members {
        if revealed.len() >= max_nodes {
            break;
        }
        if by_id.contains_key(id) && seen.insert(*id) {
            revealed.push(*id);
        }
    }
    if revealed.is_empty() {
        return Expansion::default();
    }

    let mut neighbors: HashMap<NodeId, BTreeSet<NodeId>> = HashMap::new();
    for edge in edges {
        neighbors.entry(edge.source).or_default().insert(edge.target);
        neighbors.entry(edge.target).or_default().insert(edge.source);
    }

    let mut frontier = revealed.clone();
    for _ in 1..depth {
        if frontier.is_empty() || revealed.len() >= max_nodes {
            break;
        }
        let mut next = Vec::new();
        'level: for id in &frontier {
            let Some(adjacent) = neighbors.get(id) else {
                continue;
            };
            for neighbor in adjacent {
                if revealed.len() >= max_nodes {
                    break 'level;
                }
                if by_id.contains_key(neighbor) && seen.insert(*neighbor) {
                    revealed.push(*neighbor);
                    next.push(*neighbor);
                }
            }
        }
        frontier = next;
    }

    let edges = edges
        .iter()
        .filter(|e| seen.contains(&e.source) && seen.contains(&e.target))
        .copied()
        .collect();
    let nodes = revealed
        .iter()
        .filter_map(|id| by_id.get(id).map(|n| (*n).clone()))
        .collect();

    Expansion { nodes, edges }
}
