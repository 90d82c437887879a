// src/exec/backend.rs

//! Pluggable job backend abstraction.
//!
//! The coordinator talks to a `JobBackend` instead of a concrete job store.
//! This keeps the tick loop independent of where workflow state lives:
//!
//! - [`SimulatedBackend`](super::SimulatedBackend) keeps everything in memory
//!   and advances job statuses on its own; the CLI uses it.
//! - Tests provide their own `JobBackend` that records what was launched and
//!   canceled and reports whatever statuses the test needs.

use std::future::Future;
use std::pin::Pin;

use crate::dag::WorkflowJob;
use crate::errors::Result;
use crate::types::{JobId, NodeId, WorkflowJobStatus};

/// Boxed future returned by [`JobBackend`] methods.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Trait abstracting the external job store and job runner.
pub trait JobBackend: Send {
    /// Fetch the current state of the workflow and all of its nodes.
    ///
    /// Called once per tick; the coordinator never caches the result.
    fn fetch_workflow(&mut self) -> BackendFuture<'_, WorkflowJob>;

    /// Create and start jobs for the given nodes.
    fn launch_nodes(&mut self, nodes: Vec<NodeId>) -> BackendFuture<'_, ()>;

    /// Ask the job store to cancel these jobs. Repeated requests are fine.
    fn cancel_jobs(&mut self, jobs: Vec<JobId>) -> BackendFuture<'_, ()>;

    /// Record the final status of the workflow run.
    fn finish_workflow(&mut self, status: WorkflowJobStatus) -> BackendFuture<'_, ()>;
}
