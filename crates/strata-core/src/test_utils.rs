//! Test utilities for strata-core

use crate::graph::DependencyGraph;
use crate::model::*;
use std::path::Path;

/// Build a file node from a relative path, deriving name, directory and language.
pub fn file_node(id: u32, relative_path: &str) -> FileNode {
    let path = Path::new(relative_path);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    FileNode {
        id: NodeId(id),
        absolute_path: Path::new("/virtual").join(relative_path),
        relative_path: relative_path.to_string(),
        name: path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(relative_path)
            .to_string(),
        directory: parent_directory(relative_path),
        extension,
        language: Language::from_path(path),
        role: FileRole::Module,
        size_bytes: 100,
        line_count: 10,
    }
}

pub fn edge(source: u32, target: u32) -> DependencyEdge {
    DependencyEdge {
        source: NodeId(source),
        target: NodeId(target),
        kind: EdgeKind::Import,
    }
}

/// Assemble a graph from paths (ids by position) and `(source, target)` pairs.
pub fn graph_from(root: &Path, paths: &[&str], edges: &[(u32, u32)]) -> DependencyGraph {
    let nodes = paths
        .iter()
        .enumerate()
        .map(|(i, p)| file_node(i as u32, p))
        .collect();
    DependencyGraph::assemble(
        root,
        nodes,
        edges.iter().map(|&(s, t)| edge(s, t)),
        0,
    )
    .unwrap()
}

/// Graph rooted at `/virtual`.
pub fn virtual_graph(paths: &[&str], edges: &[(u32, u32)]) -> DependencyGraph {
    graph_from(Path::new("/virtual"), paths, edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_node_derives_fields() {
        let node = file_node(3, "src/api/client.ts");
        assert_eq!(node.id, NodeId(3));
        assert_eq!(node.name, "client.ts");
        assert_eq!(node.directory, "src/api");
        assert_eq!(node.extension, ".ts");
        assert_eq!(node.language, Language::TypeScript);

        let root_file = file_node(0, "README");
        assert_eq!(root_file.directory, ".");
        assert_eq!(root_file.extension, "");
    }
}
