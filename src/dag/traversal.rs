// src/dag/traversal.rs

//! Scheduling decisions over a [`WorkflowDag`].
//!
//! All three operations walk the graph breadth-first from the root nodes
//! with an explicit FIFO worklist. Each node is processed at most once per
//! call, so cyclic edge data cannot make a traversal loop. For acyclic
//! graphs this gives the same answers as walking every path; a node joined
//! by two branches (a diamond) is simply reported once.

use std::collections::VecDeque;

use tracing::{debug, trace, warn};

use crate::dag::graph::Graph;
use crate::dag::workflow::{WorkflowDag, WorkflowNode};
use crate::errors::Result;
use crate::types::{EdgeKind, JobId, JobStatus, NodeId};

/// Receives cancel requests for running jobs.
///
/// The job store owns the actual cancel semantics; a request may take
/// several ticks to be honoured and may be repeated safely.
pub trait JobCanceller {
    fn cancel(&mut self, job: JobId) -> Result<()>;
}

/// Collects the ids of jobs to cancel so the caller can act on them later.
impl JobCanceller for Vec<JobId> {
    fn cancel(&mut self, job: JobId) -> Result<()> {
        self.push(job);
        Ok(())
    }
}

/// FIFO worklist that hands out each node ordinal at most once.
struct Worklist {
    queue: VecDeque<usize>,
    visited: Vec<bool>,
}

impl Worklist {
    fn from_roots(graph: &Graph<NodeId, WorkflowNode>) -> Self {
        Self {
            queue: graph.root_ords().collect(),
            visited: vec![false; graph.len()],
        }
    }

    fn next(&mut self) -> Option<usize> {
        while let Some(ord) = self.queue.pop_front() {
            if !std::mem::replace(&mut self.visited[ord], true) {
                return Some(ord);
            }
        }
        None
    }

    fn extend(&mut self, ords: impl IntoIterator<Item = usize>) {
        self.queue.extend(ords);
    }
}

impl WorkflowDag {
    /// Nodes whose job has not been started yet and whose upstream outcomes
    /// make them eligible now, in discovery order.
    ///
    /// Branches below a node with an active job are not explored; the
    /// workflow never races ahead of an in-flight job.
    pub fn nodes_ready_to_run(&self) -> Vec<&WorkflowNode> {
        let graph = &self.graph;
        let mut work = Worklist::from_roots(graph);
        let mut ready = Vec::new();

        while let Some(ord) = work.next() {
            let node = &graph.record(ord).node;

            match node.job_status() {
                None => {
                    trace!(node = %node.id, "no job yet; ready to run");
                    ready.push(node);
                }
                Some(status) => match status.branch() {
                    Some(kind) => {
                        work.extend(graph.dependency_ords(ord, kind));
                        work.extend(graph.dependency_ords(ord, EdgeKind::Always));
                    }
                    None => {
                        trace!(node = %node.id, %status, "job selects no branch; stopping here");
                    }
                },
            }
        }

        debug!(
            ready = ?ready.iter().map(|n| n.id.as_str()).collect::<Vec<_>>(),
            "computed nodes ready to run"
        );
        ready
    }

    /// Returns `(is_done, is_failed)`.
    ///
    /// `(false, false)` is returned as soon as a reachable node has no job
    /// or an active one. A node without a template fails the workflow but
    /// the scan continues. A node that did not succeed only fails the
    /// workflow if none of its children was ever started, so a branch
    /// rescued through a failure or always edge does not count.
    pub fn is_workflow_done(&self) -> (bool, bool) {
        let graph = &self.graph;
        let mut work = Worklist::from_roots(graph);
        let mut is_failed = false;

        while let Some(ord) = work.next() {
            let node = &graph.record(ord).node;

            if node.unified_job_template.is_none() {
                debug!(node = %node.id, "node has no template; workflow failed");
                is_failed = true;
                continue;
            }

            let Some(job) = node.job else {
                trace!(node = %node.id, "reachable node not started; workflow not done");
                return (false, false);
            };

            if !is_failed && job.status != JobStatus::Successful {
                let mut children_all = EdgeKind::ALL
                    .into_iter()
                    .flat_map(move |kind| graph.dependency_ords(ord, kind))
                    .peekable();
                let has_children = children_all.peek().is_some();
                let any_started = children_all.any(|c| graph.record(c).node.job.is_some());

                if !any_started {
                    // A childless node only fails the run once it has finished.
                    is_failed = has_children || job.status.is_finished();
                    if is_failed {
                        debug!(
                            node = %node.id,
                            status = %job.status,
                            "branch ended without success and nothing downstream started"
                        );
                    }
                }
            }

            if let Some(kind) = job.status.branch() {
                work.extend(graph.dependency_ords(ord, kind));
                work.extend(graph.dependency_ords(ord, EdgeKind::Always));
            } else if !job.status.is_finished() {
                trace!(node = %node.id, status = %job.status, "job still active; workflow not done");
                return (false, false);
            }
        }

        debug!(is_failed, "workflow graph fully resolved");
        (true, is_failed)
    }

    /// Ask `canceller` to cancel every cancelable job in the graph.
    ///
    /// Every node is considered, reachable or not. Returns `true` once no
    /// cancelable job is left; callers re-poll until then, since canceling a
    /// running job completes asynchronously.
    pub fn cancel_all_running<C>(&self, canceller: &mut C) -> bool
    where
        C: JobCanceller + ?Sized,
    {
        let mut cancel_finished = true;

        for record in self.graph.nodes() {
            let Some(job) = record.node.job else {
                continue;
            };
            if !job.can_cancel() {
                continue;
            }

            cancel_finished = false;
            match canceller.cancel(job.id) {
                Ok(()) => {
                    debug!(node = %record.key, job_id = job.id, status = %job.status, "requested job cancel");
                }
                Err(e) => {
                    warn!(node = %record.key, job_id = job.id, error = %e, "failed to request job cancel");
                }
            }
        }

        cancel_finished
    }
}
