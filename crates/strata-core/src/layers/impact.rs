//! Upstream/downstream impact analysis over unit edges

use super::UnitEdge;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskKind {
    HighImpact,
    HighDependency,
    Cycle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskIndicator {
    #[serde(rename = "type")]
    pub kind: RiskKind,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactChain {
    pub unit_id: String,
    /// Units this one depends on, nearest first.
    pub upstream: Vec<String>,
    /// Units that depend on this one, nearest first.
    pub downstream: Vec<String>,
    pub risk_indicators: Vec<RiskIndicator>,
    pub total_impact: usize,
}

impl ImpactChain {
    pub fn has_risk(&self, kind: RiskKind) -> bool {
        self.risk_indicators.iter().any(|r| r.kind == kind)
    }
}

/// Breadth-first walk from `start`, at most `max_depth` hops, excluding `start`.
fn reach(start: &str, adjacency: &HashMap<&str, BTreeSet<&str>>, max_depth: usize) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::from([start]);
    let mut reached = Vec::new();
    let mut queue = VecDeque::from([(start, 0usize)]);

    while let Some((id, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        let Some(next) = adjacency.get(id) else {
            continue;
        };
        for &neighbor in next {
            if seen.insert(neighbor) {
                reached.push(neighbor.to_string());
                queue.push_back((neighbor, depth + 1));
            }
        }
    }
    reached
}

pub(super) fn chain(
    unit_id: &str,
    edges: &[UnitEdge],
    max_depth: usize,
    risk_threshold: usize,
) -> ImpactChain {
    let mut outgoing: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    let mut incoming: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for edge in edges {
        outgoing
            .entry(edge.source.as_str())
            .or_default()
            .insert(edge.target.as_str());
        incoming
            .entry(edge.target.as_str())
            .or_default()
            .insert(edge.source.as_str());
    }

    let upstream = reach(unit_id, &outgoing, max_depth);
    let downstream = reach(unit_id, &incoming, max_depth);

    let mut risk_indicators = Vec::new();
    if downstream.len() > risk_threshold {
        risk_indicators.push(RiskIndicator {
            kind: RiskKind::HighImpact,
            severity: Severity::Warning,
            message: format!("Changes here affect {} other units", downstream.len()),
        });
    }
    if upstream.len() > risk_threshold {
        risk_indicators.push(RiskIndicator {
            kind: RiskKind::HighDependency,
            severity: Severity::Info,
            message: format!("Depends on {} other units", upstream.len()),
        });
    }
    let downstream_set: HashSet<&str> = downstream.iter().map(String::as_str).collect();
    let shared = upstream
        .iter()
        .filter(|id| downstream_set.contains(id.as_str()))
        .count();
    if shared > 0 {
        risk_indicators.push(RiskIndicator {
            kind: RiskKind::Cycle,
            severity: Severity::Error,
            message: format!("Circular dependency detected with {shared} unit(s)"),
        });
    }

    ImpactChain {
        unit_id: unit_id.to_string(),
        total_impact: upstream.len() + downstream.len(),
        upstream,
        downstream,
        risk_indicators,
    }
}
