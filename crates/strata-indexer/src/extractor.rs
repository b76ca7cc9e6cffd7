//! Structural extraction: one `FileNode` per scanned path

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use rayon::prelude::*;
use strata_core::{parent_directory, FileNode, Language, NodeId};

use crate::error::{BuildError, FileError};
use crate::roles::classify_role;

/// Nodes in input order plus a relative-path index.
#[derive(Debug, Default)]
pub struct StructuralExtraction {
    pub nodes: Vec<FileNode>,
    pub path_to_id: HashMap<String, NodeId>,
}

/// Describes files: size, line count, language and role.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralExtractor;

impl StructuralExtractor {
    /// Ids follow input position and are fixed before any file is read.
    pub fn extract(
        &self,
        root: &Path,
        relative_paths: &[String],
    ) -> Result<StructuralExtraction, BuildError> {
        validate_root(root)?;

        let nodes: Vec<FileNode> = relative_paths
            .par_iter()
            .enumerate()
            .map(|(position, relative)| describe(root, NodeId(position as u32), relative))
            .collect();

        let path_to_id = nodes
            .iter()
            .map(|n| (n.relative_path.clone(), n.id))
            .collect();

        tracing::debug!("Extracted {} file nodes", nodes.len());
        Ok(StructuralExtraction { nodes, path_to_id })
    }
}

/// Fails when `root` is missing or is not a directory.
pub fn validate_root(root: &Path) -> Result<(), BuildError> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(BuildError::NotADirectory(root.to_path_buf())),
        Err(_) => Err(BuildError::RootNotFound(root.to_path_buf())),
    }
}

fn describe(root: &Path, id: NodeId, relative: &str) -> FileNode {
    let absolute_path = root.join(relative);
    let name = relative.rsplit('/').next().unwrap_or(relative).to_string();
    let extension = match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_string(),
        _ => String::new(),
    };

    let (size_bytes, line_count) = match measure(&absolute_path) {
        Ok(measured) => measured,
        Err(source) => {
            let err = FileError::Read {
                path: absolute_path.clone(),
                source,
            };
            tracing::warn!("{}", err);
            (0, 0)
        }
    };

    FileNode {
        id,
        language: Language::from_extension(&extension),
        role: classify_role(relative),
        directory: parent_directory(relative),
        relative_path: relative.to_string(),
        absolute_path,
        name,
        extension,
        size_bytes,
        line_count,
    }
}

/// Size from metadata and line count from a buffered scan, so large files
/// are never held in memory.
fn measure(path: &Path) -> io::Result<(u64, u32)> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    let mut newlines = 0usize;
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            break;
        }
        newlines += buf.iter().filter(|&&b| b == b'\n').count();
        let consumed = buf.len();
        reader.consume(consumed);
    }
    Ok((size, (newlines + 1) as u32))
}
