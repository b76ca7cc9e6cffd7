//! Repository file discovery

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use strata_core::{normalize_separators, Language};

use crate::error::BuildError;
use crate::extractor::validate_root;

/// Directory names that never contain first-party source.
pub const IGNORED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "coverage",
    "__pycache__",
    ".next",
    ".nuxt",
    ".cache",
    "vendor",
    "target",
    ".venv",
    "out",
];

pub const IGNORED_FILE_GLOBS: &[&str] = &["*.min.js", "*.min.css"];

/// Produces the repository-relative paths a graph is built from.
pub trait RepositoryScanner: Send + Sync {
    /// Forward-slash relative paths. Implementations should return them in a
    /// stable order, since node ids follow that order.
    fn scan(&self, root: &Path) -> Result<Vec<String>, BuildError>;
}

/// Gitignore-aware walker over recognised source files.
pub struct WalkScanner {
    ignored_files: GlobSet,
    hidden: bool,
}

impl WalkScanner {
    pub fn new() -> Result<Self, BuildError> {
        Self::with_ignored_globs(IGNORED_FILE_GLOBS)
    }

    pub fn with_ignored_globs(patterns: &[&str]) -> Result<Self, BuildError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern)?);
        }
        Ok(Self {
            ignored_files: builder.build()?,
            hidden: true,
        })
    }

    /// Whether hidden files and directories are skipped (default `true`).
    pub fn hidden(mut self, yes: bool) -> Self {
        self.hidden = yes;
        self
    }
}

impl RepositoryScanner for WalkScanner {
    fn scan(&self, root: &Path) -> Result<Vec<String>, BuildError> {
        validate_root(root)?;

        let walker = WalkBuilder::new(root)
            .hidden(self.hidden)
            .require_git(false)
            .filter_entry(|entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && entry.depth() > 0 && is_ignored_dir(entry.file_name()))
            })
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!("Skipping unreadable entry: {}", err);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            if Language::from_path(path) == Language::Unknown {
                continue;
            }
            let Some(name) = path.file_name() else {
                continue;
            };
            if self.ignored_files.is_match(name) {
                continue;
            }
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            files.push(normalize_separators(&relative.to_string_lossy()));
        }

        files.sort();
        tracing::debug!("Scanned {} files under {}", files.len(), root.display());
        Ok(files)
    }
}

fn is_ignored_dir(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|n| IGNORED_DIRS.contains(&n))
}
