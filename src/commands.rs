//! CLI command implementations

use anyhow::Context;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use strata_core::{AnalysisConfig, GraphCache, GraphStats, MemoryStats, RankedNode};
use strata_indexer::AnalysisService;

/// Load configuration for `root` and wire up a service with a fresh cache.
pub fn service(root: &Path, config_path: Option<&Path>) -> anyhow::Result<AnalysisService> {
    let mut config = match config_path {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::discover(root)?,
    };
    config.apply_env(|key| std::env::var(key).ok())?;

    let cache = Arc::new(GraphCache::new(config.cache.clone()));
    Ok(AnalysisService::new(config, cache)?)
}

#[derive(Serialize)]
struct IndexSummary<'a> {
    root: String,
    node_count: usize,
    edge_count: usize,
    build_duration_ms: u64,
    stats: &'a GraphStats,
    memory: MemoryStats,
}

pub fn index(service: &AnalysisService, root: &Path) -> anyhow::Result<()> {
    let graph = service.build_graph(root)?;
    tracing::info!(
        "Indexed {} files, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    print_json(&IndexSummary {
        root: graph.root().display().to_string(),
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        build_duration_ms: graph.build_duration_ms(),
        stats: graph.stats(),
        memory: graph.memory_stats()?,
    })
}

pub fn layers(service: &AnalysisService, root: &Path) -> anyhow::Result<()> {
    print_json(&service.semantic_layers(root)?)
}

pub fn expand(
    service: &AnalysisService,
    root: &Path,
    unit: &str,
    depth: Option<usize>,
) -> anyhow::Result<()> {
    let expansion = service
        .expand_unit(root, unit, depth)?
        .with_context(|| format!("unknown unit '{unit}'"))?;
    print_json(&expansion)
}

pub fn impact(
    service: &AnalysisService,
    root: &Path,
    unit: &str,
    depth: Option<usize>,
) -> anyhow::Result<()> {
    let chain = service
        .unit_impact(root, unit, depth)?
        .with_context(|| format!("unknown unit '{unit}'"))?;
    print_json(&chain)
}

pub fn cycles(service: &AnalysisService, root: &Path) -> anyhow::Result<()> {
    let graph = service.build_graph(root)?;
    let cycles: Vec<Vec<String>> = graph
        .find_cycles()
        .iter()
        .map(|cycle| cycle.paths(&graph))
        .collect();
    tracing::info!("Found {} cycles", cycles.len());
    print_json(&cycles)
}

pub fn node(service: &AnalysisService, root: &Path, key: &str) -> anyhow::Result<()> {
    let graph = service.build_graph(root)?;
    let insights = graph
        .lookup(key)
        .and_then(|node| graph.insights(node.id))
        .with_context(|| format!("no file matches '{key}'"))?;
    print_json(&insights)
}

#[derive(Serialize)]
struct Rankings<'a> {
    most_used: Vec<RankedNode<'a>>,
    most_dependent: Vec<RankedNode<'a>>,
}

pub fn rank(service: &AnalysisService, root: &Path, limit: usize) -> anyhow::Result<()> {
    let graph = service.build_graph(root)?;
    print_json(&Rankings {
        most_used: graph.most_used(limit),
        most_dependent: graph.most_dependent(limit),
    })
}

pub fn centrality(service: &AnalysisService, root: &Path) -> anyhow::Result<()> {
    let graph = service.build_graph(root)?;
    print_json(&graph.centrality())
}

pub fn complexity(service: &AnalysisService, root: &Path) -> anyhow::Result<()> {
    print_json(&service.complexity(root)?)
}

pub fn export(service: &AnalysisService, root: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let graph = service.build_graph(root)?;
    let export = graph.export();
    match output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&export)?;
            fs::write(path, json)
                .with_context(|| format!("cannot write export to {}", path.display()))?;
            tracing::info!("Exported graph to {}", path.display());
            Ok(())
        }
        None => print_json(&export),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
