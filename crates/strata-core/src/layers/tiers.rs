//! Unit construction for each tier

use super::{Unit, UnitEdge, UnitKind, UnitSummary};
use crate::model::{DependencyEdge, FileNode, NodeId};
use std::collections::{BTreeMap, HashMap};

/// One unit per file.
pub(super) fn file_units(
    nodes: &[FileNode],
    edges: &[DependencyEdge],
) -> (Vec<Unit>, Vec<UnitEdge>) {
    let mut owner = HashMap::with_capacity(nodes.len());
    let mut units = Vec::with_capacity(nodes.len());
    for node in nodes {
        owner.insert(node.id, units.len());
        units.push(unit(
            format!("file:{}", node.relative_path),
            node.name.clone(),
            UnitKind::File {
                node: node.id,
                path: node.relative_path.clone(),
                language: node.language,
                role: node.role,
            },
            vec![node.id],
        ));
    }
    let unit_edges = roll_up(&mut units, &owner, edges);
    (units, unit_edges)
}

/// One unit per directory. Edges inside a directory are discarded.
pub(super) fn folder_units(
    nodes: &[FileNode],
    edges: &[DependencyEdge],
) -> (Vec<Unit>, Vec<UnitEdge>) {
    let mut by_dir: HashMap<&str, usize> = HashMap::new();
    let mut owner = HashMap::with_capacity(nodes.len());
    let mut units: Vec<Unit> = Vec::new();

    for node in nodes {
        let dir = node.directory.as_str();
        let index = *by_dir.entry(dir).or_insert_with(|| {
            units.push(unit(
                format!("folder:{dir}"),
                folder_label(dir),
                UnitKind::Folder {
                    path: dir.to_string(),
                },
                Vec::new(),
            ));
            units.len() - 1
        });
        units[index].members.push(node.id);
        owner.insert(node.id, index);
    }

    let unit_edges = roll_up(&mut units, &owner, edges);
    (units, unit_edges)
}

/// One unit per connectivity cluster, in cluster index order.
pub(super) fn cluster_units(
    nodes: &[FileNode],
    edges: &[DependencyEdge],
    clusters: &[Vec<NodeId>],
) -> (Vec<Unit>, Vec<UnitEdge>) {
    let directories: HashMap<NodeId, &str> = nodes
        .iter()
        .map(|n| (n.id, n.directory.as_str()))
        .collect();
    let mut owner = HashMap::with_capacity(nodes.len());
    let mut units = Vec::with_capacity(clusters.len());

    for (index, members) in clusters.iter().enumerate() {
        let dirs: Vec<&str> = members
            .iter()
            .filter_map(|id| directories.get(id).copied())
            .collect();
        let common_prefix = common_directory(&dirs);
        let label = common_prefix
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Module {}", index + 1));

        for id in members {
            owner.insert(*id, index);
        }
        units.push(unit(
            format!("cluster:{index}"),
            label,
            UnitKind::Cluster {
                index,
                common_prefix,
            },
            members.clone(),
        ));
    }

    let unit_edges = roll_up(&mut units, &owner, edges);
    (units, unit_edges)
}

fn unit(id: String, label: String, kind: UnitKind, members: Vec<NodeId>) -> Unit {
    Unit {
        id,
        label,
        kind,
        members,
        in_degree: 0,
        out_degree: 0,
        summary: UnitSummary::default(),
    }
}

fn folder_label(dir: &str) -> String {
    if dir == "." || dir.is_empty() {
        return "root".to_string();
    }
    dir.rsplit('/').next().unwrap_or(dir).to_string()
}

/// Collapse file edges into weighted unit edges and set unit degrees.
///
/// Degrees count distinct unit edges, not the file edges behind them.
fn roll_up(
    units: &mut [Unit],
    owner: &HashMap<NodeId, usize>,
    edges: &[DependencyEdge],
) -> Vec<UnitEdge> {
    let mut weights: BTreeMap<(usize, usize), u32> = BTreeMap::new();
    for edge in edges {
        let (Some(&source), Some(&target)) = (owner.get(&edge.source), owner.get(&edge.target))
        else {
            continue;
        };
        if source != target {
            *weights.entry((source, target)).or_insert(0) += 1;
        }
    }

    weights
        .into_iter()
        .map(|((source, target), weight)| {
            units[source].out_degree += 1;
            units[target].in_degree += 1;
            UnitEdge {
                source: units[source].id.clone(),
                target: units[target].id.clone(),
                weight,
            }
        })
        .collect()
}

/// Longest common `/`-separated prefix. Root-level directories (`.`)
/// share nothing with anything.
pub(super) fn common_directory(dirs: &[&str]) -> String {
    let Some((first, rest)) = dirs.split_first() else {
        return String::new();
    };
    if dirs.iter().any(|d| *d == "." || d.is_empty()) {
        return String::new();
    }

    let mut common: Vec<&str> = first.split('/').collect();
    for dir in rest {
        let shared = common
            .iter()
            .zip(dir.split('/'))
            .take_while(|(a, b)| **a == *b)
            .count();
        common.truncate(shared);
        if common.is_empty() {
            break;
        }
    }
    common.join("/")
}
