// src/exec/simulated.rs

//! In-memory job backend used by the CLI.
//!
//! Jobs move one step per fetch: `pending -> running -> <outcome>`, where the
//! outcome comes from the node's `simulate` setting. Cancel requests land on
//! the following fetch, so the coordinator has to re-poll like it would
//! against a real job store.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::config::WorkflowFile;
use crate::dag::{JobRef, WorkflowJob};
use crate::exec::backend::{BackendFuture, JobBackend};
use crate::types::{JobId, JobStatus, NodeId, WorkflowJobStatus};

#[derive(Debug)]
pub struct SimulatedBackend {
    workflow: WorkflowJob,
    outcomes: HashMap<NodeId, JobStatus>,
    cancel_pending: HashSet<JobId>,
    next_job_id: JobId,
    launched: Vec<NodeId>,
    finished: Option<WorkflowJobStatus>,
}

impl SimulatedBackend {
    /// Seed the simulation from a validated workflow file.
    pub fn from_config(cfg: &WorkflowFile) -> Self {
        let outcomes = cfg
            .node
            .iter()
            .map(|(id, node)| (id.clone(), node.simulated_outcome()))
            .collect();

        Self::new(cfg.to_workflow_job(), outcomes)
    }

    /// Nodes missing from `outcomes` succeed.
    pub fn new(workflow: WorkflowJob, outcomes: HashMap<NodeId, JobStatus>) -> Self {
        let next_job_id = workflow
            .nodes
            .iter()
            .filter_map(|n| n.job.map(|j| j.id))
            .max()
            .unwrap_or(0)
            + 1;

        Self {
            workflow,
            outcomes,
            cancel_pending: HashSet::new(),
            next_job_id,
            launched: Vec::new(),
            finished: None,
        }
    }

    /// Nodes launched so far, in launch order.
    pub fn launched(&self) -> &[NodeId] {
        &self.launched
    }

    /// Final workflow status, once recorded.
    pub fn finished(&self) -> Option<WorkflowJobStatus> {
        self.finished
    }

    /// Current snapshot without advancing the simulation.
    pub fn workflow(&self) -> &WorkflowJob {
        &self.workflow
    }

    /// Move every job one step forward.
    fn advance(&mut self) {
        for node in self.workflow.nodes.iter_mut() {
            let Some(job) = node.job.as_mut() else {
                continue;
            };

            let next = if self.cancel_pending.remove(&job.id) && job.status.can_cancel() {
                JobStatus::Canceled
            } else {
                match job.status {
                    JobStatus::New => JobStatus::Pending,
                    JobStatus::Pending | JobStatus::Waiting => JobStatus::Running,
                    JobStatus::Running => self
                        .outcomes
                        .get(&node.id)
                        .copied()
                        .unwrap_or(JobStatus::Successful),
                    finished => finished,
                }
            };

            if next != job.status {
                debug!(node = %node.id, job_id = job.id, from = %job.status, to = %next, "simulated job transition");
                job.status = next;
            }
        }
    }
}

impl JobBackend for SimulatedBackend {
    fn fetch_workflow(&mut self) -> BackendFuture<'_, WorkflowJob> {
        self.advance();
        let snapshot = self.workflow.clone();
        Box::pin(async move { Ok(snapshot) })
    }

    fn launch_nodes(&mut self, nodes: Vec<NodeId>) -> BackendFuture<'_, ()> {
        for id in nodes {
            let Some(node) = self.workflow.nodes.iter_mut().find(|n| n.id == id) else {
                warn!(node = %id, "launch requested for unknown node; ignoring");
                continue;
            };
            if node.job.is_some() {
                warn!(node = %id, "node already has a job; not launching again");
                continue;
            }

            let job_id = self.next_job_id;
            self.next_job_id += 1;
            node.job = Some(JobRef::new(job_id, JobStatus::Pending));
            self.launched.push(id.clone());
            info!(node = %id, job_id, "launched job");
        }

        Box::pin(async { Ok(()) })
    }

    fn cancel_jobs(&mut self, jobs: Vec<JobId>) -> BackendFuture<'_, ()> {
        for job_id in jobs {
            if self.cancel_pending.insert(job_id) {
                info!(job_id, "cancel requested");
            }
        }

        Box::pin(async { Ok(()) })
    }

    fn finish_workflow(&mut self, status: WorkflowJobStatus) -> BackendFuture<'_, ()> {
        info!(
            workflow = %self.workflow.name,
            workflow_id = self.workflow.id,
            %status,
            "workflow finished"
        );
        self.finished = Some(status);

        Box::pin(async { Ok(()) })
    }
}

/// Outcome map helper for callers building a simulation by hand.
pub fn outcomes<I, S>(pairs: I) -> HashMap<NodeId, JobStatus>
where
    I: IntoIterator<Item = (S, JobStatus)>,
    S: Into<NodeId>,
{
    pairs.into_iter().map(|(id, s)| (id.into(), s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::{TemplateRef, WorkflowNode};
    use crate::types::TemplateKind;

    fn workflow(ids: &[&str]) -> WorkflowJob {
        WorkflowJob {
            id: 1,
            name: "sim".to_string(),
            cancel_requested: false,
            nodes: ids
                .iter()
                .map(|id| WorkflowNode {
                    id: id.to_string(),
                    job: None,
                    unified_job_template: Some(TemplateRef {
                        kind: TemplateKind::JobTemplate,
                        id: 1,
                    }),
                    success_nodes: Vec::new(),
                    failure_nodes: Vec::new(),
                    always_nodes: Vec::new(),
                })
                .collect(),
        }
    }

    fn status_of(backend: &SimulatedBackend, id: &str) -> Option<JobStatus> {
        backend
            .workflow()
            .nodes
            .iter()
            .find(|n| n.id == id)
            .and_then(|n| n.job_status())
    }

    #[tokio::test]
    async fn launched_jobs_progress_to_their_outcome() {
        let mut backend = SimulatedBackend::new(
            workflow(&["A", "B"]),
            outcomes([("B", JobStatus::Failed)]),
        );

        backend.launch_nodes(vec!["A".into(), "B".into()]).await.unwrap();
        assert_eq!(backend.launched(), ["A".to_string(), "B".to_string()]);
        assert_eq!(status_of(&backend, "A"), Some(JobStatus::Pending));

        backend.fetch_workflow().await.unwrap();
        assert_eq!(status_of(&backend, "A"), Some(JobStatus::Running));

        let snapshot = backend.fetch_workflow().await.unwrap();
        assert_eq!(snapshot.nodes[0].job_status(), Some(JobStatus::Successful));
        assert_eq!(snapshot.nodes[1].job_status(), Some(JobStatus::Failed));
    }

    #[tokio::test]
    async fn relaunching_a_started_node_is_ignored() {
        let mut backend = SimulatedBackend::new(workflow(&["A"]), HashMap::new());

        backend.launch_nodes(vec!["A".into()]).await.unwrap();
        backend.launch_nodes(vec!["A".into(), "ghost".into()]).await.unwrap();

        assert_eq!(backend.launched(), ["A".to_string()]);
    }

    #[tokio::test]
    async fn cancel_lands_on_next_fetch() {
        let mut backend = SimulatedBackend::new(workflow(&["A"]), HashMap::new());
        backend.launch_nodes(vec!["A".into()]).await.unwrap();
        let job_id = backend.workflow().nodes[0].job.map(|j| j.id).unwrap();

        backend.cancel_jobs(vec![job_id]).await.unwrap();
        assert_eq!(status_of(&backend, "A"), Some(JobStatus::Pending));

        backend.fetch_workflow().await.unwrap();
        assert_eq!(status_of(&backend, "A"), Some(JobStatus::Canceled));
    }
}
