// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::dag::{JobRef, TemplateRef, WorkflowJob, WorkflowNode};
use crate::types::{JobId, JobStatus, TemplateKind};

/// Workflow snapshot as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// tick_interval = "1s"
/// max_ticks = 100
///
/// [workflow]
/// id = 3
/// name = "deploy"
///
/// [node.build]
/// template = { kind = "job_template", id = 7 }
/// success = ["deploy"]
/// failure = ["notify"]
/// job = { id = 10, status = "successful" }
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawWorkflowFile {
    /// Coordinator behaviour from `[config]`.
    #[serde(default)]
    pub config: CoordinatorSection,

    /// Identity of the workflow run from `[workflow]`.
    #[serde(default)]
    pub workflow: WorkflowSection,

    /// All nodes from `[node.<id>]`, keyed by node id.
    #[serde(default)]
    pub node: BTreeMap<String, NodeConfig>,
}

/// A [`RawWorkflowFile`] that passed validation.
///
/// Obtain one through `WorkflowFile::try_from(raw)` or
/// [`crate::config::load_and_validate`].
#[derive(Debug, Clone)]
pub struct WorkflowFile {
    pub config: CoordinatorSection,
    pub workflow: WorkflowSection,
    pub node: BTreeMap<String, NodeConfig>,
}

impl WorkflowFile {
    pub(crate) fn new_unchecked(
        config: CoordinatorSection,
        workflow: WorkflowSection,
        node: BTreeMap<String, NodeConfig>,
    ) -> Self {
        Self {
            config,
            workflow,
            node,
        }
    }

    /// Build the engine-facing snapshot. Nodes come out in id order.
    pub fn to_workflow_job(&self) -> WorkflowJob {
        let nodes = self
            .node
            .iter()
            .map(|(id, cfg)| cfg.to_workflow_node(id))
            .collect();

        WorkflowJob {
            id: self.workflow.id,
            name: self.workflow.name.clone(),
            cancel_requested: self.workflow.cancel_requested,
            nodes,
        }
    }

    /// Validated tick interval; falls back to the default if unparsable.
    pub fn tick_interval(&self) -> Duration {
        parse_duration(&self.config.tick_interval)
            .unwrap_or_else(|_| Duration::from_secs(1))
    }

    /// Tick limit for the coordinator, `None` when unlimited.
    pub fn max_ticks(&self) -> Option<u64> {
        match self.config.max_ticks {
            0 => None,
            n => Some(n),
        }
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatorSection {
    /// How often the coordinator re-evaluates the workflow (`"500ms"`, `"2s"`).
    #[serde(default = "default_tick_interval")]
    pub tick_interval: String,

    /// Give up after this many ticks; 0 means no limit.
    #[serde(default)]
    pub max_ticks: u64,
}

fn default_tick_interval() -> String {
    "1s".to_string()
}

impl Default for CoordinatorSection {
    fn default() -> Self {
        Self {
            tick_interval: default_tick_interval(),
            max_ticks: 0,
        }
    }
}

/// `[workflow]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowSection {
    #[serde(default = "default_workflow_id")]
    pub id: u64,

    #[serde(default = "default_workflow_name")]
    pub name: String,

    /// Start the run with cancellation already requested.
    #[serde(default)]
    pub cancel_requested: bool,
}

fn default_workflow_id() -> u64 {
    1
}

fn default_workflow_name() -> String {
    "workflow".to_string()
}

impl Default for WorkflowSection {
    fn default() -> Self {
        Self {
            id: default_workflow_id(),
            name: default_workflow_name(),
            cancel_requested: false,
        }
    }
}

/// `[node.<id>]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct NodeConfig {
    /// What the node launches. Omitting it marks the node as misconfigured.
    #[serde(default)]
    pub template: Option<TemplateConfig>,

    /// Nodes to run when this node's job succeeds.
    #[serde(default)]
    pub success: Vec<String>,

    /// Nodes to run when this node's job fails.
    #[serde(default)]
    pub failure: Vec<String>,

    /// Nodes to run once this node's job finished either way.
    #[serde(default)]
    pub always: Vec<String>,

    /// Current job state, if the node was already launched.
    #[serde(default)]
    pub job: Option<JobConfig>,

    /// Final status the simulated backend reports for this node's job.
    ///
    /// Defaults to `successful`.
    #[serde(default)]
    pub simulate: Option<JobStatus>,
}

impl NodeConfig {
    pub fn to_workflow_node(&self, id: &str) -> WorkflowNode {
        WorkflowNode {
            id: id.to_string(),
            job: self.job.map(|j| JobRef::new(j.id, j.status)),
            unified_job_template: self.template.map(|t| TemplateRef {
                kind: t.kind,
                id: t.id,
            }),
            success_nodes: self.success.clone(),
            failure_nodes: self.failure.clone(),
            always_nodes: self.always.clone(),
        }
    }

    pub fn simulated_outcome(&self) -> JobStatus {
        self.simulate.unwrap_or(JobStatus::Successful)
    }
}

/// Inline `template = { kind = "...", id = N }` table.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TemplateConfig {
    #[serde(default)]
    pub kind: TemplateKind,
    pub id: u64,
}

/// Inline `job = { id = N, status = "..." }` table.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct JobConfig {
    pub id: JobId,
    pub status: JobStatus,
}

/// Longest accepted tick interval.
pub const MAX_TICK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration too large: '{}'", s))
}
