use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Identity of a workflow node, stable across ticks and distinct from the
/// job it eventually runs.
pub type NodeId = String;

/// Identity of a job run in the external job store.
pub type JobId = u64;

/// Which outcome of a node's job makes a downstream node eligible.
///
/// - `Success`: follow the edge when the job finished `successful`.
/// - `Failure`: follow the edge when the job finished `failed`.
/// - `Always`: follow the edge for either of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Success,
    Failure,
    Always,
}

impl EdgeKind {
    /// All edge kinds in graph construction order.
    pub const ALL: [EdgeKind; 3] = [EdgeKind::Success, EdgeKind::Failure, EdgeKind::Always];

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Success => "success",
            EdgeKind::Failure => "failure",
            EdgeKind::Always => "always",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "success" | "success_nodes" => Ok(EdgeKind::Success),
            "failure" | "failure_nodes" => Ok(EdgeKind::Failure),
            "always" | "always_nodes" => Ok(EdgeKind::Always),
            other => Err(format!(
                "invalid edge kind: {other} (expected \"success\", \"failure\" or \"always\")"
            )),
        }
    }
}

/// Status of a job run as reported by the external job store.
///
/// A node whose job has not been created yet has no status at all; that
/// state is modelled as `Option<JobRef>::None` on the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    New,
    Pending,
    Waiting,
    Running,
    Successful,
    Failed,
    Error,
    Canceled,
}

impl JobStatus {
    /// Edge kind selected by this outcome, besides `always`.
    ///
    /// Only `successful` and `failed` select a branch; every other status
    /// either has not finished or ends the path.
    pub fn branch(&self) -> Option<EdgeKind> {
        match self {
            JobStatus::Successful => Some(EdgeKind::Success),
            JobStatus::Failed => Some(EdgeKind::Failure),
            _ => None,
        }
    }

    pub fn is_branching(&self) -> bool {
        self.branch().is_some()
    }

    /// Finished in any way, including `error` and `canceled`.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            JobStatus::Successful | JobStatus::Failed | JobStatus::Error | JobStatus::Canceled
        )
    }

    /// Whether the job store would still accept a cancel request.
    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            JobStatus::New | JobStatus::Pending | JobStatus::Waiting | JobStatus::Running
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::New => "new",
            JobStatus::Pending => "pending",
            JobStatus::Waiting => "waiting",
            JobStatus::Running => "running",
            JobStatus::Successful => "successful",
            JobStatus::Failed => "failed",
            JobStatus::Error => "error",
            JobStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of unified job template a workflow node points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    JobTemplate,
    WorkflowJobTemplate,
    Project,
    InventorySource,
    WorkflowApprovalTemplate,
    SystemJobTemplate,
}

impl Default for TemplateKind {
    fn default() -> Self {
        TemplateKind::JobTemplate
    }
}

/// Final verdict recorded for a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowJobStatus {
    Successful,
    Failed,
    Canceled,
}

impl fmt::Display for WorkflowJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkflowJobStatus::Successful => "successful",
            WorkflowJobStatus::Failed => "failed",
            WorkflowJobStatus::Canceled => "canceled",
        };
        f.write_str(s)
    }
}
