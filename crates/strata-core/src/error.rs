//! Error types for graph assembly and configuration loading

use std::path::PathBuf;

use crate::model::NodeId;

/// Errors raised while assembling or serializing a [`crate::DependencyGraph`].
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("node ids must be dense: expected {expected}, found {found}")]
    NonDenseId { expected: NodeId, found: NodeId },

    #[error("edge {from} -> {to} references a node outside the graph")]
    DanglingEdge { from: NodeId, to: NodeId },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while loading an [`crate::AnalysisConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidOverride { key: String, value: String },
}
