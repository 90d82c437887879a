// tests/workflow_done.rs

mod common;
use crate::common::builders::{NodeBuilder, WorkflowBuilder};
use crate::common::init_tracing;

use flowdag::dag::WorkflowDag;
use flowdag::types::JobStatus;

fn verdict(builder: WorkflowBuilder) -> (bool, bool) {
    let wf = builder.build();
    WorkflowDag::from_workflow(&wf).unwrap().is_workflow_done()
}

#[test]
fn empty_workflow_is_done_and_not_failed() {
    init_tracing();
    assert_eq!(verdict(WorkflowBuilder::new()), (true, false));
}

#[test]
fn unstarted_root_means_not_done() {
    init_tracing();
    let wf = WorkflowBuilder::new()
        .with_node(NodeBuilder::new("A").job(1, JobStatus::Successful).build())
        .with_node(NodeBuilder::new("B").build());
    assert_eq!(verdict(wf), (false, false));
}

#[test]
fn all_successful_chain_is_done() {
    init_tracing();
    let wf = WorkflowBuilder::new()
        .with_node(
            NodeBuilder::new("A")
                .job(1, JobStatus::Successful)
                .on_success("B")
                .on_failure("F")
                .build(),
        )
        .with_node(NodeBuilder::new("B").job(2, JobStatus::Successful).build())
        // never reached: A succeeded
        .with_node(NodeBuilder::new("F").build());
    assert_eq!(verdict(wf), (true, false));
}

#[test]
fn active_job_means_not_done() {
    init_tracing();
    for status in [
        JobStatus::New,
        JobStatus::Pending,
        JobStatus::Waiting,
        JobStatus::Running,
    ] {
        let wf = WorkflowBuilder::new()
            .with_node(NodeBuilder::new("A").job(1, JobStatus::Failed).build())
            .with_node(NodeBuilder::new("B").job(2, status).build());
        assert_eq!(verdict(wf), (false, false), "{status}");
    }
}

#[test]
fn failed_leaf_fails_the_workflow() {
    init_tracing();
    for status in [JobStatus::Failed, JobStatus::Canceled, JobStatus::Error] {
        let wf = WorkflowBuilder::new()
            .with_node(NodeBuilder::new("A").job(1, status).build());
        assert_eq!(verdict(wf), (true, true), "{status}");
    }
}

#[test]
fn failure_handled_by_a_started_child_is_not_a_failure() {
    init_tracing();
    let wf = WorkflowBuilder::new()
        .with_node(
            NodeBuilder::new("A")
                .job(1, JobStatus::Failed)
                .on_failure("B")
                .build(),
        )
        .with_node(NodeBuilder::new("B").job(2, JobStatus::Successful).build());
    assert_eq!(verdict(wf), (true, false));
}

#[test]
fn failure_without_a_matching_handler_fails_the_workflow() {
    init_tracing();
    // A failed but only has a success child, which can never start.
    let wf = WorkflowBuilder::new()
        .with_node(
            NodeBuilder::new("A")
                .job(1, JobStatus::Failed)
                .on_success("B")
                .build(),
        )
        .with_node(NodeBuilder::new("B").build());
    assert_eq!(verdict(wf), (true, true));
}

#[test]
fn always_child_rescues_a_failed_parent() {
    init_tracing();
    let wf = WorkflowBuilder::new()
        .with_node(
            NodeBuilder::new("A")
                .job(1, JobStatus::Failed)
                .always("cleanup")
                .build(),
        )
        .with_node(
            NodeBuilder::new("cleanup")
                .job(2, JobStatus::Successful)
                .build(),
        );
    assert_eq!(verdict(wf), (true, false));
}

#[test]
fn missing_template_fails_without_stopping_the_scan() {
    init_tracing();

    // The broken root is skipped, but the running sibling still decides
    // that the workflow is not done yet.
    let wf = WorkflowBuilder::new()
        .with_node(NodeBuilder::new("broken").no_template().build())
        .with_node(NodeBuilder::new("B").job(1, JobStatus::Running).build());
    assert_eq!(verdict(wf), (false, false));

    let wf = WorkflowBuilder::new()
        .with_node(NodeBuilder::new("broken").no_template().build())
        .with_node(NodeBuilder::new("B").job(1, JobStatus::Successful).build());
    assert_eq!(verdict(wf), (true, true));
}

#[test]
fn verdict_is_stable_across_rebuilds() {
    init_tracing();
    let wf = WorkflowBuilder::new()
        .with_node(
            NodeBuilder::new("A")
                .job(1, JobStatus::Successful)
                .on_success("B")
                .always("C")
                .build(),
        )
        .with_node(NodeBuilder::new("B").job(2, JobStatus::Failed).build())
        .with_node(NodeBuilder::new("C").job(3, JobStatus::Successful).build())
        .build();

    let first = WorkflowDag::from_workflow(&wf).unwrap().is_workflow_done();
    let second = WorkflowDag::from_workflow(&wf).unwrap().is_workflow_done();
    assert_eq!(first, (true, true));
    assert_eq!(first, second);
}
