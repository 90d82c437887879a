// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowdagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// An edge references a node that was never registered in the graph.
    ///
    /// This means the persisted workflow data is inconsistent; the current
    /// tick is abandoned and state is re-fetched on the next one.
    #[error("Node not found in graph: {0}")]
    MissingNode(String),

    #[error("Cycle detected in workflow graph: {0}")]
    DagCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, FlowdagError>;
