// src/dag/mod.rs

//! Workflow graph representation and scheduling decisions.
//!
//! - [`graph`] holds a generic directed graph with typed edges.
//! - [`workflow`] defines the workflow snapshot types and builds a
//!   [`WorkflowDag`] from them.
//! - [`traversal`] answers the per-tick questions: which nodes can start,
//!   whether the workflow is done (and failed), and cancellation.

pub mod graph;
pub mod traversal;
pub mod workflow;

pub use graph::{Graph, Metadata, NodeRecord};
pub use traversal::JobCanceller;
pub use workflow::{JobRef, TemplateRef, WorkflowDag, WorkflowJob, WorkflowNode};
