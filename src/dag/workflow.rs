// src/dag/workflow.rs

//! Workflow snapshot types and construction of the per-tick graph.

use tracing::{debug, warn};

use crate::dag::graph::Graph;
use crate::errors::Result;
use crate::types::{EdgeKind, JobId, JobStatus, NodeId, TemplateKind};

/// Reference to the job run attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobRef {
    pub id: JobId,
    pub status: JobStatus,
}

impl JobRef {
    pub fn new(id: JobId, status: JobStatus) -> Self {
        Self { id, status }
    }

    pub fn can_cancel(&self) -> bool {
        self.status.can_cancel()
    }
}

/// Reference to the template a node launches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateRef {
    pub kind: TemplateKind,
    pub id: u64,
}

/// One step of a workflow as persisted by the job store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowNode {
    pub id: NodeId,
    /// Job run for this node; `None` until the coordinator launches it.
    pub job: Option<JobRef>,
    /// `None` means the node is misconfigured (its template was deleted).
    pub unified_job_template: Option<TemplateRef>,
    pub success_nodes: Vec<NodeId>,
    pub failure_nodes: Vec<NodeId>,
    pub always_nodes: Vec<NodeId>,
}

impl WorkflowNode {
    /// Related nodes reached over edges of the given kind.
    pub fn related(&self, kind: EdgeKind) -> &[NodeId] {
        match kind {
            EdgeKind::Success => &self.success_nodes,
            EdgeKind::Failure => &self.failure_nodes,
            EdgeKind::Always => &self.always_nodes,
        }
    }

    pub fn job_status(&self) -> Option<JobStatus> {
        self.job.map(|j| j.status)
    }
}

/// Snapshot of a workflow run handed to the engine on each tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowJob {
    pub id: u64,
    pub name: String,
    /// Set when somebody asked for the whole workflow to be canceled.
    pub cancel_requested: bool,
    /// Nodes in persisted iteration order.
    pub nodes: Vec<WorkflowNode>,
}

/// Graph of a single workflow run, rebuilt from a [`WorkflowJob`] snapshot.
///
/// The scheduling decisions live in [`crate::dag::traversal`].
#[derive(Debug, Clone, Default)]
pub struct WorkflowDag {
    pub(crate) graph: Graph<NodeId, WorkflowNode>,
}

impl WorkflowDag {
    /// An empty graph; equivalent to a workflow without nodes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for `workflow`.
    ///
    /// All nodes are added first, then edges kind by kind (success, failure,
    /// always), node by node. The result is a pure function of the snapshot.
    pub fn from_workflow(workflow: &WorkflowJob) -> Result<Self> {
        Self::from_nodes(workflow.nodes.iter().cloned())
    }

    /// Build the graph from a node collection.
    pub fn from_nodes<I>(nodes: I) -> Result<Self>
    where
        I: IntoIterator<Item = WorkflowNode>,
    {
        let mut graph: Graph<NodeId, WorkflowNode> = Graph::new();

        for node in nodes {
            let id = node.id.clone();
            if !graph.add_node(id.clone(), node) {
                warn!(node = %id, "duplicate workflow node in snapshot; keeping first");
            }
        }

        let mut pending: Vec<(NodeId, NodeId, EdgeKind)> = Vec::new();
        for kind in EdgeKind::ALL {
            for record in graph.nodes() {
                for related in record.node.related(kind) {
                    pending.push((record.key.clone(), related.clone(), kind));
                }
            }
        }
        graph.add_edges(pending.iter().map(|(from, to, kind)| (from, to, *kind)))?;

        if let Some(node) = graph.find_cycle() {
            warn!(
                node = %node,
                "workflow graph contains a cycle; traversal visits each node once"
            );
        }

        debug!(
            nodes = graph.len(),
            edges = graph.edges().count(),
            "built workflow graph"
        );

        Ok(Self { graph })
    }

    /// Access the underlying generic graph.
    pub fn graph(&self) -> &Graph<NodeId, WorkflowNode> {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
        self.graph.get(id).map(|r| &r.node)
    }

    /// Graphviz rendering with each node labelled by id and job status.
    pub fn to_dot(&self) -> String {
        self.graph.to_dot_with(|record| {
            let node = &record.node;
            match (node.job, node.unified_job_template) {
                (_, None) => format!("{} (no template)", node.id),
                (None, Some(_)) => node.id.clone(),
                (Some(job), Some(_)) => format!("{} [{}]", node.id, job.status),
            }
        })
    }
}
