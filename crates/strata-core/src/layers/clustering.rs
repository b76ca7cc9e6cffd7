//! Greedy connectivity clustering for the largest tier

use crate::model::{DependencyEdge, FileNode, NodeId};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Partition `nodes` into clusters, returned in cluster index order.
///
/// Nodes are visited by descending undirected degree (ties by id). A node
/// joins the cluster holding the most of its neighbours, preferring the
/// lower cluster index on ties, provided that count reaches
/// `join_threshold`; otherwise it seeds a new cluster.
pub(super) fn assign(
    nodes: &[FileNode],
    edges: &[DependencyEdge],
    join_threshold: usize,
) -> Vec<Vec<NodeId>> {
    let mut adjacency: HashMap<NodeId, BTreeSet<NodeId>> =
        nodes.iter().map(|n| (n.id, BTreeSet::new())).collect();
    for edge in edges {
        if !adjacency.contains_key(&edge.source) || !adjacency.contains_key(&edge.target) {
            continue;
        }
        if let Some(out) = adjacency.get_mut(&edge.source) {
            out.insert(edge.target);
        }
        if let Some(inc) = adjacency.get_mut(&edge.target) {
            inc.insert(edge.source);
        }
    }

    let degree = |id: &NodeId| adjacency.get(id).map_or(0, BTreeSet::len);
    let mut order: Vec<NodeId> = nodes.iter().map(|n| n.id).collect();
    order.sort_by(|a, b| degree(b).cmp(&degree(a)).then(a.cmp(b)));

    let mut clusters: Vec<Vec<NodeId>> = Vec::new();
    let mut cluster_of: HashMap<NodeId, usize> = HashMap::with_capacity(nodes.len());

    for id in order {
        let mut scores: BTreeMap<usize, usize> = BTreeMap::new();
        if let Some(neighbors) = adjacency.get(&id) {
            for neighbor in neighbors {
                if let Some(&cluster) = cluster_of.get(neighbor) {
                    *scores.entry(cluster).or_insert(0) += 1;
                }
            }
        }

        // Highest score; lower index wins ties.
        let best = scores
            .into_iter()
            .max_by(|(ia, sa), (ib, sb)| sa.cmp(sb).then(ib.cmp(ia)));

        match best {
            Some((cluster, score)) if score >= join_threshold => {
                clusters[cluster].push(id);
                cluster_of.insert(id, cluster);
            }
            _ => {
                cluster_of.insert(id, clusters.len());
                clusters.push(vec![id]);
            }
        }
    }

    clusters
}
