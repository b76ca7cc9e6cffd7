//! Error types for graph builds

use std::path::PathBuf;

use strata_core::{ConfigError, GraphError};

/// Failures that abort a whole build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("repository path does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to start resolution pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid scan pattern: {0}")]
    Scan(#[from] globset::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Per-file failures. These are logged and absorbed, never returned from a build.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is {size} bytes, above the {limit} byte limit", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
}
