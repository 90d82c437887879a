// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use anyhow::{Result, anyhow, bail};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{MAX_TICK_INTERVAL, WorkflowFile, load_and_validate, parse_duration};
use crate::dag::WorkflowDag;
use crate::engine::{CoordinatorCore, Runtime, RuntimeEvent, RuntimeOptions, spawn_ticker};
use crate::exec::SimulatedBackend;
use crate::types::JobId;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - workflow file loading
/// - coordinator core / runtime
/// - simulated job backend
/// - ticker and Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)?;

    if args.dot {
        let dag = WorkflowDag::from_workflow(&cfg.to_workflow_job())?;
        println!("{}", dag.to_dot());
        return Ok(());
    }

    if args.dry_run {
        print_dry_run(&cfg)?;
        return Ok(());
    }

    let tick_interval = match args.tick_interval.as_deref() {
        Some(s) => parse_duration(s).map_err(|e| anyhow!("--tick-interval: {e}"))?,
        None => cfg.tick_interval(),
    };
    if tick_interval.is_zero() {
        bail!("--tick-interval must be greater than zero");
    }
    if tick_interval > MAX_TICK_INTERVAL {
        bail!("--tick-interval must be at most {MAX_TICK_INTERVAL:?}");
    }

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let backend = SimulatedBackend::from_config(&cfg);
    let _ticker = spawn_ticker(rt_tx.clone(), tick_interval);

    // First Ctrl-C cancels the workflow, the second one stops immediately.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            for event in [RuntimeEvent::CancelRequested, RuntimeEvent::ShutdownRequested] {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    eprintln!("failed to listen for Ctrl+C: {e}");
                    return;
                }
                if tx.send(event).await.is_err() {
                    return;
                }
            }
        });
    }
    drop(rt_tx);

    info!(
        workflow = %cfg.workflow.name,
        nodes = cfg.node.len(),
        ?tick_interval,
        "starting workflow coordinator"
    );

    let options = RuntimeOptions {
        max_ticks: cfg.max_ticks(),
    };
    let core = CoordinatorCore::new(options);
    let runtime = Runtime::new(core, rt_rx, backend);
    let (backend, status) = runtime.run().await?;

    println!("workflow '{}' launched {:?}", cfg.workflow.name, backend.launched());
    match status {
        Some(status) => println!("workflow '{}' finished: {status}", cfg.workflow.name),
        None => {
            warn!("coordinator stopped before the workflow finished");
            println!("workflow '{}' did not finish", cfg.workflow.name);
        }
    }

    Ok(())
}

/// Dry-run output: the graph, then the decision a single tick would make.
fn print_dry_run(cfg: &WorkflowFile) -> Result<()> {
    let workflow = cfg.to_workflow_job();
    let dag = WorkflowDag::from_workflow(&workflow)?;

    println!("flowdag dry-run");
    println!("  workflow = {} (id {})", workflow.name, workflow.id);
    println!("  config.tick_interval = {}", cfg.config.tick_interval);
    println!("  config.max_ticks = {}", cfg.config.max_ticks);
    println!();

    println!("nodes ({}):", workflow.nodes.len());
    for node in &workflow.nodes {
        println!("  - {}", node.id);
        match node.unified_job_template {
            Some(t) => println!("      template: {:?} {}", t.kind, t.id),
            None => println!("      template: <missing>"),
        }
        if let Some(job) = node.job {
            println!("      job: {} ({})", job.id, job.status);
        }
        if !node.success_nodes.is_empty() {
            println!("      success: {:?}", node.success_nodes);
        }
        if !node.failure_nodes.is_empty() {
            println!("      failure: {:?}", node.failure_nodes);
        }
        if !node.always_nodes.is_empty() {
            println!("      always: {:?}", node.always_nodes);
        }
    }
    println!();

    let ready: Vec<&str> = dag
        .nodes_ready_to_run()
        .into_iter()
        .map(|n| n.id.as_str())
        .collect();
    let (is_done, is_failed) = dag.is_workflow_done();

    println!("ready to run: {ready:?}");
    println!("done: {is_done}, failed: {is_failed}");

    if workflow.cancel_requested {
        let mut to_cancel: Vec<JobId> = Vec::new();
        let finished = dag.cancel_all_running(&mut to_cancel);
        println!("cancel requested; would cancel jobs {to_cancel:?}");
        println!("cancel finished: {finished}");
    }

    debug!("dry-run complete (nothing launched)");
    Ok(())
}
