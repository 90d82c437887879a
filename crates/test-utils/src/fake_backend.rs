use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use flowdag::dag::{JobRef, WorkflowJob};
use flowdag::exec::{BackendFuture, JobBackend};
use flowdag::types::{JobId, JobStatus, NodeId, WorkflowJobStatus};

/// Everything a [`FakeBackend`] was asked to do.
#[derive(Debug, Default, Clone)]
pub struct FakeLog {
    pub launched: Vec<NodeId>,
    pub canceled: Vec<JobId>,
    pub finished: Option<WorkflowJobStatus>,
    pub fetches: usize,
}

/// A fake job backend that:
/// - records which nodes were launched and which jobs were canceled
/// - gives launched jobs their scripted status right away
///   (`successful` unless told otherwise; `running` jobs stay running)
/// - turns canceled jobs into `canceled` immediately.
pub struct FakeBackend {
    workflow: WorkflowJob,
    outcomes: HashMap<NodeId, JobStatus>,
    next_job_id: JobId,
    log: Arc<Mutex<FakeLog>>,
}

impl FakeBackend {
    pub fn new(workflow: WorkflowJob, log: Arc<Mutex<FakeLog>>) -> Self {
        let next_job_id = workflow
            .nodes
            .iter()
            .filter_map(|n| n.job.map(|j| j.id))
            .max()
            .unwrap_or(0)
            + 1;

        Self {
            workflow,
            outcomes: HashMap::new(),
            next_job_id,
            log,
        }
    }

    /// Status the job of `node` reports as soon as it is launched.
    pub fn with_outcome(mut self, node: &str, status: JobStatus) -> Self {
        self.outcomes.insert(node.to_string(), status);
        self
    }
}

impl JobBackend for FakeBackend {
    fn fetch_workflow(&mut self) -> BackendFuture<'_, WorkflowJob> {
        self.log.lock().unwrap().fetches += 1;
        let snapshot = self.workflow.clone();
        Box::pin(async move { Ok(snapshot) })
    }

    fn launch_nodes(&mut self, nodes: Vec<NodeId>) -> BackendFuture<'_, ()> {
        for id in nodes {
            let status = self
                .outcomes
                .get(&id)
                .copied()
                .unwrap_or(JobStatus::Successful);

            if let Some(node) = self.workflow.nodes.iter_mut().find(|n| n.id == id) {
                node.job = Some(JobRef::new(self.next_job_id, status));
                self.next_job_id += 1;
            }
            self.log.lock().unwrap().launched.push(id);
        }
        Box::pin(async { Ok(()) })
    }

    fn cancel_jobs(&mut self, jobs: Vec<JobId>) -> BackendFuture<'_, ()> {
        for job_id in jobs {
            for node in self.workflow.nodes.iter_mut() {
                if let Some(job) = node.job.as_mut() {
                    if job.id == job_id && job.status.can_cancel() {
                        job.status = JobStatus::Canceled;
                    }
                }
            }
            self.log.lock().unwrap().canceled.push(job_id);
        }
        Box::pin(async { Ok(()) })
    }

    fn finish_workflow(&mut self, status: WorkflowJobStatus) -> BackendFuture<'_, ()> {
        self.log.lock().unwrap().finished = Some(status);
        Box::pin(async { Ok(()) })
    }
}
