// src/engine/core.rs

//! Pure coordinator state machine.
//!
//! [`CoordinatorCore::tick`] takes a freshly fetched [`WorkflowJob`] snapshot,
//! rebuilds the workflow graph and returns the commands the IO shell should
//! carry out:
//! - launch jobs for ready nodes,
//! - cancel running jobs,
//! - record the final workflow status.
//!
//! The core has no channels, no Tokio types and performs no IO, so it can be
//! tested by handing it snapshots directly.

use tracing::{debug, error, info, warn};

use crate::dag::{WorkflowDag, WorkflowJob};
use crate::engine::RuntimeOptions;
use crate::types::{JobId, NodeId, WorkflowJobStatus};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Create and start jobs for these nodes.
    LaunchNodes(Vec<NodeId>),
    /// Ask the job store to cancel these jobs.
    CancelJobs(Vec<JobId>),
    /// Record the final status of the workflow run.
    FinishWorkflow(WorkflowJobStatus),
    /// Stop ticking without a verdict (tick limit reached).
    RequestExit,
}

/// Decision returned by the core after handling a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep ticking.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    fn stopped(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: false,
        }
    }
}

/// Per-workflow coordinator state.
///
/// Holds only what must survive between ticks: whether cancellation was
/// requested, the tick count and the final verdict. Everything about nodes
/// and jobs is re-read from the snapshot every tick.
#[derive(Debug)]
pub struct CoordinatorCore {
    options: RuntimeOptions,
    ticks: u64,
    cancel_requested: bool,
    finished: Option<WorkflowJobStatus>,
}

impl CoordinatorCore {
    pub fn new(options: RuntimeOptions) -> Self {
        Self {
            options,
            ticks: 0,
            cancel_requested: false,
            finished: None,
        }
    }

    /// Ask for the workflow to be canceled on the next tick.
    pub fn request_cancel(&mut self) {
        if !self.cancel_requested {
            info!("workflow cancel requested");
        }
        self.cancel_requested = true;
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    /// Final status, once the core has decided one.
    pub fn finished(&self) -> Option<WorkflowJobStatus> {
        self.finished
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Evaluate one tick against `workflow`.
    pub fn tick(&mut self, workflow: &WorkflowJob) -> CoreStep {
        if let Some(status) = self.finished {
            debug!(%status, "tick after workflow finished; nothing to do");
            return CoreStep::stopped(Vec::new());
        }

        self.ticks += 1;

        let dag = match WorkflowDag::from_workflow(workflow) {
            Ok(dag) => dag,
            Err(e) => {
                error!(
                    workflow = %workflow.name,
                    tick = self.ticks,
                    error = %e,
                    "failed to build workflow graph; retrying next tick"
                );
                return self.continue_or_give_up(Vec::new());
            }
        };

        if self.cancel_requested || workflow.cancel_requested {
            return self.cancel_tick(&dag);
        }

        let (is_done, is_failed) = dag.is_workflow_done();
        if is_done {
            let status = if is_failed {
                WorkflowJobStatus::Failed
            } else {
                WorkflowJobStatus::Successful
            };
            return self.finish(workflow, status);
        }

        let mut launch = Vec::new();
        for node in dag.nodes_ready_to_run() {
            if node.unified_job_template.is_none() {
                warn!(
                    node = %node.id,
                    "node has no template; it will not be launched"
                );
                continue;
            }
            launch.push(node.id.clone());
        }

        let mut commands = Vec::new();
        if !launch.is_empty() {
            info!(tick = self.ticks, nodes = ?launch, "launching ready nodes");
            commands.push(CoreCommand::LaunchNodes(launch));
        } else {
            debug!(tick = self.ticks, "no nodes ready; waiting on running jobs");
        }

        self.continue_or_give_up(commands)
    }

    fn cancel_tick(&mut self, dag: &WorkflowDag) -> CoreStep {
        let mut to_cancel: Vec<JobId> = Vec::new();
        if dag.cancel_all_running(&mut to_cancel) {
            self.finished = Some(WorkflowJobStatus::Canceled);
            info!(tick = self.ticks, "no cancelable jobs left; workflow canceled");
            return CoreStep::stopped(vec![CoreCommand::FinishWorkflow(
                WorkflowJobStatus::Canceled,
            )]);
        }

        debug!(tick = self.ticks, jobs = ?to_cancel, "waiting for jobs to cancel");
        self.continue_or_give_up(vec![CoreCommand::CancelJobs(to_cancel)])
    }

    fn finish(&mut self, workflow: &WorkflowJob, status: WorkflowJobStatus) -> CoreStep {
        info!(
            workflow = %workflow.name,
            tick = self.ticks,
            %status,
            "workflow graph resolved"
        );
        self.finished = Some(status);
        CoreStep::stopped(vec![CoreCommand::FinishWorkflow(status)])
    }

    fn continue_or_give_up(&mut self, mut commands: Vec<CoreCommand>) -> CoreStep {
        match self.options.max_ticks {
            Some(max) if self.ticks >= max => {
                warn!(max_ticks = max, "tick limit reached before the workflow finished");
                commands.push(CoreCommand::RequestExit);
                CoreStep::stopped(commands)
            }
            _ => CoreStep::running(commands),
        }
    }
}
