//! Integration tests for Strata
//!
//! These tests drive full builds over fixture repositories on disk.

use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use strata_core::{AnalysisConfig, GraphCache, OrchestratorConfig, RiskKind, Tier};
use strata_indexer::{AnalysisService, GraphBuilder, RepositoryScanner, WalkScanner};
use tempfile::TempDir;

fn write_repo<P: AsRef<str>, C: AsRef<str>>(files: &[(P, C)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (relative, content) in files {
        let path = dir.path().join(relative.as_ref());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content.as_ref()).unwrap();
    }
    dir
}

fn service() -> AnalysisService {
    AnalysisService::new(AnalysisConfig::default(), Arc::new(GraphCache::default())).unwrap()
}

fn scan(root: &Path) -> Vec<String> {
    WalkScanner::new().unwrap().scan(root).unwrap()
}

/// a → b → c: one unit per file, a is the entry point and c the leaf.
#[test]
fn test_linear_chain() {
    let repo = write_repo(&[
        ("a.js", "import b from './b';"),
        ("b.js", "import c from './c';"),
        ("c.js", "export default 3;"),
    ]);
    let service = service();
    let graph = service.build_graph(repo.path()).unwrap();
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);

    let layers = service.semantic_layers(repo.path()).unwrap();
    assert_eq!(layers.metadata.tier, Tier::File);
    assert_eq!(layers.metadata.reveal_depth, 3);
    let role = |id: &str| {
        layers
            .units
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.summary.role)
            .unwrap()
    };
    assert_eq!(role("file:a.js"), strata_core::UnitRole::EntryPoint);
    assert_eq!(role("file:c.js"), strata_core::UnitRole::LeafUnit);

    let impact = service.unit_impact(repo.path(), "file:a.js", None).unwrap().unwrap();
    assert_eq!(impact.upstream, vec!["file:b.js", "file:c.js"]);
    assert!(impact.downstream.is_empty());
}

/// `b.js` sits at the root, so `../sub/c` climbs to the root and lands on
/// `sub/c.js`.
#[test]
fn test_parent_import_from_root() {
    let repo = write_repo(&[
        ("a.js", "import b from './b';"),
        ("b.js", "import c from '../sub/c';"),
        ("sub/c.js", "export default 3;"),
    ]);
    let service = service();
    let graph = service.build_graph(repo.path()).unwrap();

    let pairs: Vec<(String, String)> = graph
        .edges()
        .map(|e| {
            (
                graph.node(e.source).unwrap().relative_path.clone(),
                graph.node(e.target).unwrap().relative_path.clone(),
            )
        })
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("a.js".to_string(), "b.js".to_string()),
            ("b.js".to_string(), "sub/c.js".to_string()),
        ]
    );

    let a = graph.node_by_path("a.js").unwrap().id;
    let reach: Vec<&str> = graph
        .transitive_dependencies(a)
        .iter()
        .map(|n| n.relative_path.as_str())
        .collect();
    assert_eq!(reach, vec!["b.js", "sub/c.js"]);

    let impact = service.unit_impact(repo.path(), "file:a.js", None).unwrap().unwrap();
    assert_eq!(impact.upstream, vec!["file:b.js", "file:sub/c.js"]);
    assert!(impact.downstream.is_empty());

    let impact = service
        .unit_impact(repo.path(), "file:sub/c.js", None)
        .unwrap()
        .unwrap();
    let mut downstream = impact.downstream.clone();
    downstream.sort();
    assert_eq!(downstream, vec!["file:a.js", "file:b.js"]);
    assert!(impact.upstream.is_empty());
}

/// x ↔ y is reported as a cycle, and impact analysis flags it.
#[test]
fn test_mutual_import_cycle() {
    let repo = write_repo(&[
        ("x.py", "from . import y\nimport y\n"),
        ("y.py", "import x\n"),
        ("__init__.py", ""),
    ]);
    let service = service();
    let graph = service.build_graph(repo.path()).unwrap();

    let cycles = graph.find_cycles();
    assert_eq!(cycles.len(), 1);
    let mut members = cycles[0].paths(&graph);
    members.pop();
    members.sort();
    assert_eq!(members, vec!["x.py", "y.py"]);

    let impact = service.unit_impact(repo.path(), "file:x.py", None).unwrap().unwrap();
    assert!(impact.has_risk(RiskKind::Cycle));
}

/// Above the large-repository threshold the chunked pass yields exactly the
/// edges of a sequential pass.
#[test]
fn test_chunked_build_matches_sequential() {
    let files: Vec<(String, String)> = (0..1500)
        .map(|i| {
            let dir = i % 15;
            let a = (i * 7 + 3) % 1500;
            let b = (i + 1) % 1500;
            (
                format!("pkg{dir}/mod{i}.ts"),
                format!(
                    "import {{ a }} from '../pkg{}/mod{a}';\nimport {{ b }} from '../pkg{}/mod{b}';\n",
                    a % 15,
                    b % 15
                ),
            )
        })
        .collect();
    let repo = write_repo(&files);
    let paths = scan(repo.path());
    assert_eq!(paths.len(), 1500);

    let chunked = GraphBuilder::new(AnalysisConfig::default());
    let sequential = GraphBuilder::new(AnalysisConfig {
        orchestrator: OrchestratorConfig {
            large_repo_threshold: 10_000,
            ..Default::default()
        },
        ..Default::default()
    });

    let (chunked_graph, chunked_stats) = chunked.build_with_stats(repo.path(), &paths).unwrap();
    let (sequential_graph, sequential_stats) =
        sequential.build_with_stats(repo.path(), &paths).unwrap();

    assert!(chunked_stats.chunked);
    assert_eq!(chunked_stats.chunk_size, 50);
    assert_eq!(chunked_stats.chunk_count, 30);
    assert!(!sequential_stats.chunked);

    let edges = |g: &strata_core::DependencyGraph| g.edges().copied().collect::<Vec<_>>();
    assert_eq!(edges(&chunked_graph), edges(&sequential_graph));
    assert_eq!(chunked_graph.edge_count(), 3000);

    // 1500 files land in the cluster tier and stay within the visibility caps.
    let nodes: Vec<_> = chunked_graph.nodes().cloned().collect();
    let layers = strata_core::SemanticLayerEngine::default().process(
        &nodes,
        &edges(&chunked_graph),
        nodes.len(),
    );
    assert_eq!(layers.metadata.tier, Tier::Cluster);
    assert!(layers.units.len() <= 20);
}

/// Two files named `helpers.ts` make the basename fallback ambiguous.
#[test]
fn test_ambiguous_basename_is_dropped() {
    let repo = write_repo(&[
        ("app/main.ts", "import { h } from 'shared/lib/helpers';"),
        ("modules/a/helpers.ts", ""),
        ("modules/b/helpers.ts", ""),
    ]);
    let graph = service().build_graph(repo.path()).unwrap();
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_cli_index_prints_json() {
    let repo = write_repo(&[("a.js", "require('./b')"), ("b.js", "")]);
    let output = Command::new(env!("CARGO_BIN_EXE_strata"))
        .args(["--root"])
        .arg(repo.path())
        .arg("index")
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["node_count"], 2);
    assert_eq!(summary["edge_count"], 1);
}

#[test]
fn test_cli_unknown_unit_fails() {
    let repo = write_repo(&[("a.js", "")]);
    let output = Command::new(env!("CARGO_BIN_EXE_strata"))
        .arg("--root")
        .arg(repo.path())
        .args(["expand", "file:missing.js"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown unit"));
}
