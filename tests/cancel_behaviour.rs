// tests/cancel_behaviour.rs

mod common;
use crate::common::builders::{NodeBuilder, WorkflowBuilder};
use crate::common::init_tracing;

use flowdag::dag::{JobCanceller, WorkflowDag};
use flowdag::errors::Result;
use flowdag::types::{JobId, JobStatus};

#[derive(Default)]
struct Recorder {
    calls: Vec<JobId>,
}

impl JobCanceller for Recorder {
    fn cancel(&mut self, job: JobId) -> Result<()> {
        self.calls.push(job);
        Ok(())
    }
}

#[test]
fn nothing_to_cancel_reports_finished_without_calls() {
    init_tracing();

    let wf = WorkflowBuilder::new()
        .with_node(NodeBuilder::new("A").job(1, JobStatus::Successful).build())
        .with_node(NodeBuilder::new("B").job(2, JobStatus::Failed).build())
        .with_node(NodeBuilder::new("C").build())
        .build();
    let dag = WorkflowDag::from_workflow(&wf).unwrap();

    let mut recorder = Recorder::default();
    assert!(dag.cancel_all_running(&mut recorder));
    assert!(recorder.calls.is_empty());

    let mut recorder = Recorder::default();
    assert!(WorkflowDag::new().cancel_all_running(&mut recorder));
    assert!(recorder.calls.is_empty());
}

#[test]
fn every_active_job_is_canceled_in_node_order() {
    init_tracing();

    // C is unreachable from the roots (its parent is still running) but
    // its job is canceled anyway.
    let wf = WorkflowBuilder::new()
        .with_node(
            NodeBuilder::new("A")
                .job(1, JobStatus::Running)
                .on_success("C")
                .build(),
        )
        .with_node(NodeBuilder::new("B").job(2, JobStatus::Pending).build())
        .with_node(NodeBuilder::new("C").job(3, JobStatus::Waiting).build())
        .with_node(NodeBuilder::new("D").job(4, JobStatus::New).build())
        .with_node(NodeBuilder::new("E").job(5, JobStatus::Successful).build())
        .build();
    let dag = WorkflowDag::from_workflow(&wf).unwrap();

    let mut recorder = Recorder::default();
    assert!(!dag.cancel_all_running(&mut recorder));
    assert_eq!(recorder.calls, vec![1, 2, 3, 4]);
}

#[test]
fn cancel_is_repeated_until_jobs_settle() {
    init_tracing();

    let running = WorkflowBuilder::new()
        .with_node(NodeBuilder::new("A").job(7, JobStatus::Running).build())
        .build();
    let dag = WorkflowDag::from_workflow(&running).unwrap();

    let mut first: Vec<JobId> = Vec::new();
    let mut second: Vec<JobId> = Vec::new();
    assert!(!dag.cancel_all_running(&mut first));
    assert!(!dag.cancel_all_running(&mut second));
    assert_eq!(first, second);

    let settled = WorkflowBuilder::new()
        .with_node(NodeBuilder::new("A").job(7, JobStatus::Canceled).build())
        .build();
    let dag = WorkflowDag::from_workflow(&settled).unwrap();
    let mut calls: Vec<JobId> = Vec::new();
    assert!(dag.cancel_all_running(&mut calls));
    assert!(calls.is_empty());
}
