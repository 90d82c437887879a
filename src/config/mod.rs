// src/config/mod.rs

//! Workflow snapshot files for the CLI.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a file from disk (`loader.rs`).
//! - Validate edge targets, job ids and acyclicity (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    CoordinatorSection, JobConfig, MAX_TICK_INTERVAL, NodeConfig, RawWorkflowFile, TemplateConfig,
    WorkflowFile, WorkflowSection, parse_duration,
};
pub use validate::validate_config;
