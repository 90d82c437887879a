// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::{RawWorkflowFile, WorkflowFile};
use crate::errors::Result;

/// Load a workflow file from a given path and return the raw `RawWorkflowFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (edge targets, cycles, etc.). Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawWorkflowFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawWorkflowFile = toml::from_str(&contents)?;
    debug!(path = %path.display(), nodes = config.node.len(), "loaded workflow file");

    Ok(config)
}

/// Load a workflow file from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - unknown edge targets and self-edges,
///   - duplicate job ids,
///   - cycles,
///   - a sane tick interval.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<WorkflowFile> {
    let raw = load_from_path(&path)?;
    let config = WorkflowFile::try_from(raw)?;
    Ok(config)
}
