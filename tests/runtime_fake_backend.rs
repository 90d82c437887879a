// tests/runtime_fake_backend.rs

use flowdag_test_utils::builders::{NodeBuilder, WorkflowBuilder};
use flowdag_test_utils::fake_backend::{FakeBackend, FakeLog};
use flowdag_test_utils::{init_tracing, with_timeout};

use std::error::Error;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::time::Duration;

use flowdag::dag::WorkflowJob;
use flowdag::engine::{CoordinatorCore, Runtime, RuntimeEvent, RuntimeOptions, spawn_ticker};
use flowdag::types::{JobStatus, WorkflowJobStatus};

type TestResult = Result<(), Box<dyn Error>>;

/// Very simple chain: A -> B on success.
fn simple_chain() -> WorkflowJob {
    WorkflowBuilder::new()
        .with_node(NodeBuilder::new("A").on_success("B").build())
        .with_node(NodeBuilder::new("B").build())
        .build()
}

/// Run `backend` with a fast ticker until the runtime stops.
async fn run_ticking(
    backend: FakeBackend,
    options: RuntimeOptions,
) -> Result<Option<WorkflowJobStatus>, Box<dyn Error>> {
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    let ticker = spawn_ticker(rt_tx, Duration::from_millis(5));

    let runtime = Runtime::new(CoordinatorCore::new(options), rt_rx, backend);
    let (_backend, status) = with_timeout(runtime.run()).await?;

    ticker.abort();
    Ok(status)
}

#[tokio::test]
async fn runtime_runs_simple_chain_to_success() -> TestResult {
    init_tracing();

    let log = Arc::new(Mutex::new(FakeLog::default()));
    let backend = FakeBackend::new(simple_chain(), log.clone());

    let status = run_ticking(backend, RuntimeOptions::default()).await?;

    assert_eq!(status, Some(WorkflowJobStatus::Successful));
    let log = log.lock().unwrap().clone();
    assert_eq!(log.launched, vec!["A".to_string(), "B".to_string()]);
    assert_eq!(log.finished, Some(WorkflowJobStatus::Successful));
    assert!(log.canceled.is_empty());

    Ok(())
}

#[tokio::test]
async fn failure_branch_runs_instead_of_success_branch() -> TestResult {
    init_tracing();

    let workflow = WorkflowBuilder::new()
        .with_node(
            NodeBuilder::new("build")
                .on_success("deploy")
                .on_failure("notify")
                .always("cleanup")
                .build(),
        )
        .with_node(NodeBuilder::new("deploy").build())
        .with_node(NodeBuilder::new("notify").build())
        .with_node(NodeBuilder::new("cleanup").build())
        .build();

    let log = Arc::new(Mutex::new(FakeLog::default()));
    let backend = FakeBackend::new(workflow, log.clone()).with_outcome("build", JobStatus::Failed);

    let status = run_ticking(backend, RuntimeOptions::default()).await?;

    // The failure was handled downstream, so the run as a whole succeeds.
    assert_eq!(status, Some(WorkflowJobStatus::Successful));
    let launched = log.lock().unwrap().launched.clone();
    assert_eq!(launched, vec!["build", "notify", "cleanup"]);

    Ok(())
}

#[tokio::test]
async fn unhandled_failure_fails_the_workflow() -> TestResult {
    init_tracing();

    let log = Arc::new(Mutex::new(FakeLog::default()));
    let backend = FakeBackend::new(simple_chain(), log.clone()).with_outcome("A", JobStatus::Failed);

    let status = run_ticking(backend, RuntimeOptions::default()).await?;

    assert_eq!(status, Some(WorkflowJobStatus::Failed));
    let log = log.lock().unwrap().clone();
    assert_eq!(log.launched, vec!["A".to_string()]);
    assert_eq!(log.finished, Some(WorkflowJobStatus::Failed));

    Ok(())
}

#[tokio::test]
async fn cancel_request_cancels_running_jobs_then_finishes() -> TestResult {
    init_tracing();

    let log = Arc::new(Mutex::new(FakeLog::default()));
    let backend =
        FakeBackend::new(simple_chain(), log.clone()).with_outcome("A", JobStatus::Running);

    // Drive the runtime by hand so every step is deterministic.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(16);
    for event in [
        RuntimeEvent::Tick,
        RuntimeEvent::CancelRequested,
        RuntimeEvent::Tick,
        RuntimeEvent::Tick,
    ] {
        rt_tx.send(event).await?;
    }
    drop(rt_tx);

    let runtime = Runtime::new(
        CoordinatorCore::new(RuntimeOptions::default()),
        rt_rx,
        backend,
    );
    let (_backend, status) = with_timeout(runtime.run()).await?;

    assert_eq!(status, Some(WorkflowJobStatus::Canceled));
    let log = log.lock().unwrap().clone();
    assert_eq!(log.launched, vec!["A".to_string()]);
    assert_eq!(log.canceled, vec![1]);
    assert_eq!(log.finished, Some(WorkflowJobStatus::Canceled));
    assert_eq!(log.fetches, 3);

    Ok(())
}

#[tokio::test]
async fn workflow_flagged_for_cancel_launches_nothing() -> TestResult {
    init_tracing();

    let workflow = WorkflowBuilder::new()
        .with_node(NodeBuilder::new("A").build())
        .cancel_requested(true)
        .build();

    let log = Arc::new(Mutex::new(FakeLog::default()));
    let backend = FakeBackend::new(workflow, log.clone());

    let status = run_ticking(backend, RuntimeOptions::default()).await?;

    assert_eq!(status, Some(WorkflowJobStatus::Canceled));
    assert!(log.lock().unwrap().launched.is_empty());

    Ok(())
}

#[tokio::test]
async fn tick_limit_stops_a_stuck_workflow() -> TestResult {
    init_tracing();

    let log = Arc::new(Mutex::new(FakeLog::default()));
    let backend =
        FakeBackend::new(simple_chain(), log.clone()).with_outcome("A", JobStatus::Running);

    let status = run_ticking(backend, RuntimeOptions { max_ticks: Some(3) }).await?;

    assert_eq!(status, None);
    let log = log.lock().unwrap().clone();
    assert_eq!(log.fetches, 3);
    assert_eq!(log.launched, vec!["A".to_string()]);
    assert_eq!(log.finished, None);

    Ok(())
}

#[tokio::test]
async fn shutdown_stops_without_a_verdict() -> TestResult {
    init_tracing();

    let log = Arc::new(Mutex::new(FakeLog::default()));
    let backend = FakeBackend::new(simple_chain(), log.clone());

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(4);
    rt_tx.send(RuntimeEvent::Tick).await?;
    rt_tx.send(RuntimeEvent::ShutdownRequested).await?;
    rt_tx.send(RuntimeEvent::Tick).await?;

    let runtime = Runtime::new(
        CoordinatorCore::new(RuntimeOptions::default()),
        rt_rx,
        backend,
    );
    let (_backend, status) = with_timeout(runtime.run()).await?;

    assert_eq!(status, None);
    let log = log.lock().unwrap().clone();
    assert_eq!(log.fetches, 1);
    assert_eq!(log.launched, vec!["A".to_string()]);

    Ok(())
}
