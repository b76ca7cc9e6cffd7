//! Test utilities for strata-indexer

use std::fs;
use std::path::Path;

use strata_core::{parent_directory, FileNode, Language, NodeId};
use tempfile::TempDir;

use crate::roles::classify_role;

/// Write `(relative path, content)` pairs into a fresh temporary directory.
pub fn write_repo(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (relative, content) in files {
        let path = dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
    }
    dir
}

/// In-memory node for resolver tests; nothing is read from disk.
pub fn node(id: u32, relative_path: &str) -> FileNode {
    let name = relative_path
        .rsplit('/')
        .next()
        .unwrap_or(relative_path)
        .to_string();
    let extension = name
        .rfind('.')
        .map(|idx| name[idx..].to_string())
        .unwrap_or_default();
    FileNode {
        id: NodeId(id),
        absolute_path: Path::new("/virtual").join(relative_path),
        relative_path: relative_path.to_string(),
        directory: parent_directory(relative_path),
        language: Language::from_extension(&extension),
        role: classify_role(relative_path),
        name,
        extension,
        size_bytes: 0,
        line_count: 0,
    }
}

pub fn owned(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}
