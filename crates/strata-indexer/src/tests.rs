//! Unit tests for strata-indexer: full builds over on-disk fixture repositories

use crate::builder::GraphBuilder;
use crate::scanner::{RepositoryScanner, WalkScanner};
use crate::test_utils::{owned, write_repo};
use strata_core::{AnalysisConfig, FileRole, Language, NodeId, SemanticLayerEngine, Tier};

fn build(files: &[(&str, &str)]) -> (tempfile::TempDir, strata_core::DependencyGraph) {
    let repo = write_repo(files);
    let paths = WalkScanner::new().unwrap().scan(repo.path()).unwrap();
    let graph = GraphBuilder::new(AnalysisConfig::default())
        .build(repo.path(), &paths)
        .unwrap();
    (repo, graph)
}

fn pairs(graph: &strata_core::DependencyGraph) -> Vec<(String, String)> {
    graph
        .edges()
        .map(|e| {
            (
                graph.node(e.source).unwrap().relative_path.clone(),
                graph.node(e.target).unwrap().relative_path.clone(),
            )
        })
        .collect()
}

#[test]
fn test_chain_build() {
    let (_repo, graph) = build(&[
        ("a.js", "import b from './b';\n"),
        ("b.js", "const c = require('./c');\n"),
        ("c.js", "module.exports = 1;\n"),
    ]);

    assert_eq!(graph.node_count(), 3);
    assert_eq!(
        pairs(&graph),
        vec![
            ("a.js".to_string(), "b.js".to_string()),
            ("b.js".to_string(), "c.js".to_string())
        ]
    );
    let a = graph.node_by_path("a.js").unwrap().id;
    let reach: Vec<&str> = graph
        .transitive_dependencies(a)
        .iter()
        .map(|n| n.relative_path.as_str())
        .collect();
    assert_eq!(reach, vec!["b.js", "c.js"]);
    assert!(graph.find_cycles().is_empty());
}

#[test]
fn test_parent_import_clamps_at_root() {
    let (_repo, graph) = build(&[
        ("a.js", "import b from './b';\n"),
        ("b.js", "import c from '../sub/c';\n"),
        ("sub/c.js", "export default 3;\n"),
    ]);

    assert_eq!(
        pairs(&graph),
        vec![
            ("a.js".to_string(), "b.js".to_string()),
            ("b.js".to_string(), "sub/c.js".to_string())
        ]
    );
    let a = graph.node_by_path("a.js").unwrap().id;
    let reach: Vec<&str> = graph
        .transitive_dependencies(a)
        .iter()
        .map(|n| n.relative_path.as_str())
        .collect();
    assert_eq!(reach, vec!["b.js", "sub/c.js"]);
}

#[test]
fn test_cycle_build() {
    let (_repo, graph) = build(&[
        ("x.ts", "import { y } from './y';\nexport const x = 1;\n"),
        ("y.ts", "import { x } from './x';\nexport const y = 2;\n"),
    ]);

    let cycles = graph.find_cycles();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].len(), 2);
    assert_eq!(graph.stats().cycle_count, 1);

    let nodes: Vec<_> = graph.nodes().cloned().collect();
    let edges: Vec<_> = graph.edges().copied().collect();
    let engine = SemanticLayerEngine::default();
    let projection = engine.project(&nodes, &edges, nodes.len());
    let chain = engine
        .impact_chain("file:x.ts", &projection.units, &projection.edges, 3)
        .unwrap();
    assert!(chain.has_risk(strata_core::RiskKind::Cycle));
}

#[test]
fn test_ids_follow_path_order() {
    let repo = write_repo(&[("b.js", ""), ("a.js", "")]);
    let graph = GraphBuilder::new(AnalysisConfig::default())
        .build(repo.path(), &owned(&["b.js", "./a.js", "b.js"]))
        .unwrap();
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.node_by_path("b.js").unwrap().id, NodeId(0));
    assert_eq!(graph.node_by_path("a.js").unwrap().id, NodeId(1));
}

#[test]
fn test_mixed_language_repository() {
    let (_repo, graph) = build(&[
        ("svc/app/__init__.py", ""),
        ("svc/app/views.py", "from .models import User\nimport svc.app.util\n"),
        ("svc/app/models.py", "import os\n"),
        ("svc/app/util.py", ""),
        (
            "android/src/main/kotlin/com/acme/MainActivity.kt",
            "import android.os.Bundle\nimport com.acme.data.Repo\n",
        ),
        ("android/src/main/kotlin/com/acme/data/Repo.kt", ""),
        ("web/main.go", "import \"fmt\"\n"),
    ]);

    assert_eq!(
        pairs(&graph),
        vec![
            (
                "android/src/main/kotlin/com/acme/MainActivity.kt".to_string(),
                "android/src/main/kotlin/com/acme/data/Repo.kt".to_string()
            ),
            ("svc/app/views.py".to_string(), "svc/app/models.py".to_string()),
            ("svc/app/views.py".to_string(), "svc/app/util.py".to_string()),
        ]
    );
    assert_eq!(graph.nodes_by_language(Language::Python).len(), 4);
    assert_eq!(graph.nodes_by_language(Language::Go).len(), 1);
    assert_eq!(
        graph.node_by_path("svc/app/models.py").unwrap().role,
        FileRole::Module
    );
}

#[test]
fn test_ambiguous_basename_produces_no_edge() {
    let (_repo, graph) = build(&[
        ("src/app.ts", "import a from '@shared/helpers';\nimport b from '@shared/formatters';\n"),
        ("packages/one/helpers.ts", ""),
        ("packages/two/helpers.ts", ""),
        ("packages/three/formatters.ts", ""),
    ]);
    assert_eq!(
        pairs(&graph),
        vec![(
            "src/app.ts".to_string(),
            "packages/three/formatters.ts".to_string()
        )]
    );
}

#[test]
fn test_build_is_deterministic() {
    let files: Vec<(String, String)> = (0..40)
        .map(|i| {
            (
                format!("lib/f{i}.js"),
                format!("require('./f{}');\nrequire('./f{}');\n", (i * 3) % 40, (i + 11) % 40),
            )
        })
        .collect();
    let borrowed: Vec<(&str, &str)> = files
        .iter()
        .map(|(p, c)| (p.as_str(), c.as_str()))
        .collect();
    let repo = write_repo(&borrowed);
    let paths = WalkScanner::new().unwrap().scan(repo.path()).unwrap();
    let builder = GraphBuilder::new(AnalysisConfig::default());

    let first = builder.build(repo.path(), &paths).unwrap();
    let second = builder.build(repo.path(), &paths).unwrap();
    let edges = |g: &strata_core::DependencyGraph| g.edges().copied().collect::<Vec<_>>();
    assert_eq!(edges(&first), edges(&second));
}

#[test]
fn test_folder_tier_on_disk() {
    let mut files = Vec::new();
    for dir in ["api", "core", "ui", "db", "jobs"] {
        for i in 0..20 {
            let content = if dir == "api" {
                format!("import x from '../core/c{i}';\n")
            } else {
                String::new()
            };
            files.push((format!("{dir}/c{i}.ts"), content));
        }
    }
    let borrowed: Vec<(&str, &str)> = files
        .iter()
        .map(|(p, c)| (p.as_str(), c.as_str()))
        .collect();
    let repo = write_repo(&borrowed);
    let paths = WalkScanner::new().unwrap().scan(repo.path()).unwrap();
    let graph = GraphBuilder::new(AnalysisConfig::default())
        .build(repo.path(), &paths)
        .unwrap();

    let nodes: Vec<_> = graph.nodes().cloned().collect();
    let edges: Vec<_> = graph.edges().copied().collect();
    let layers = SemanticLayerEngine::default().process(&nodes, &edges, nodes.len());
    assert_eq!(layers.metadata.tier, Tier::Folder);
    assert_eq!(layers.metadata.total_units, 5);
    assert_eq!(layers.edges.len(), 1);
    assert_eq!(layers.edges[0].source, "folder:api");
    assert_eq!(layers.edges[0].target, "folder:core");
    assert_eq!(layers.edges[0].weight, 20);
}
