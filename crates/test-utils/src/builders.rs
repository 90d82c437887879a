#![allow(dead_code)]

use flowdag::dag::{JobRef, TemplateRef, WorkflowJob, WorkflowNode};
use flowdag::types::{JobId, JobStatus, TemplateKind};

/// Builder for `WorkflowJob` to simplify test setup.
///
/// Nodes keep the order they were added in.
pub struct WorkflowBuilder {
    workflow: WorkflowJob,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self {
            workflow: WorkflowJob {
                id: 1,
                name: "test-workflow".to_string(),
                cancel_requested: false,
                nodes: Vec::new(),
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.workflow.name = name.to_string();
        self
    }

    pub fn with_node(mut self, node: WorkflowNode) -> Self {
        self.workflow.nodes.push(node);
        self
    }

    pub fn cancel_requested(mut self, val: bool) -> Self {
        self.workflow.cancel_requested = val;
        self
    }

    pub fn build(self) -> WorkflowJob {
        self.workflow
    }
}

impl Default for WorkflowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `WorkflowNode`.
///
/// Nodes start with a job template and no job.
pub struct NodeBuilder {
    node: WorkflowNode,
}

impl NodeBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            node: WorkflowNode {
                id: id.to_string(),
                job: None,
                unified_job_template: Some(TemplateRef {
                    kind: TemplateKind::JobTemplate,
                    id: 1,
                }),
                success_nodes: vec![],
                failure_nodes: vec![],
                always_nodes: vec![],
            },
        }
    }

    pub fn on_success(mut self, target: &str) -> Self {
        self.node.success_nodes.push(target.to_string());
        self
    }

    pub fn on_failure(mut self, target: &str) -> Self {
        self.node.failure_nodes.push(target.to_string());
        self
    }

    pub fn always(mut self, target: &str) -> Self {
        self.node.always_nodes.push(target.to_string());
        self
    }

    pub fn job(mut self, id: JobId, status: JobStatus) -> Self {
        self.node.job = Some(JobRef::new(id, status));
        self
    }

    pub fn template(mut self, kind: TemplateKind, id: u64) -> Self {
        self.node.unified_job_template = Some(TemplateRef { kind, id });
        self
    }

    pub fn no_template(mut self) -> Self {
        self.node.unified_job_template = None;
        self
    }

    pub fn build(self) -> WorkflowNode {
        self.node
    }
}
