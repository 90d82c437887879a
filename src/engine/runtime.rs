// src/engine/runtime.rs

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::JobBackend;
use crate::types::WorkflowJobStatus;

use super::core::CoordinatorCore;
use super::{CoreCommand, RuntimeEvent};

/// Drives the coordinator core in response to `RuntimeEvent`s and delegates
/// all job-store access to a `JobBackend`.
///
/// This is a pure IO shell around `CoordinatorCore`, which contains all the
/// scheduling semantics. This struct handles async IO: reading events from
/// the channel, fetching snapshots and executing commands.
pub struct Runtime<B: JobBackend> {
    core: CoordinatorCore,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    backend: B,
}

impl<B: JobBackend> fmt::Debug for Runtime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: JobBackend> Runtime<B> {
    pub fn new(core: CoordinatorCore, event_rx: mpsc::Receiver<RuntimeEvent>, backend: B) -> Self {
        Self {
            core,
            event_rx,
            backend,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`.
    /// - On each tick, fetches a fresh snapshot and feeds it to the core.
    /// - Executes commands returned by the core (launch, cancel, finish).
    ///
    /// Returns the backend together with the final workflow status, if one
    /// was reached before the loop stopped.
    pub async fn run(mut self) -> Result<(B, Option<WorkflowJobStatus>)> {
        info!("coordinator runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            match event {
                RuntimeEvent::Tick => {
                    let workflow = self.backend.fetch_workflow().await?;
                    let step = self.core.tick(&workflow);

                    for command in step.commands {
                        self.execute_command(command).await?;
                    }

                    if !step.keep_running {
                        info!("core requested exit; stopping runtime");
                        break;
                    }
                }
                RuntimeEvent::CancelRequested => {
                    self.core.request_cancel();
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested; stopping runtime");
                    break;
                }
            }
        }

        info!(ticks = self.core.ticks(), "runtime exiting");
        let status = self.core.finished();
        Ok((self.backend, status))
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::LaunchNodes(nodes) => {
                debug!(?nodes, "launching node jobs");
                self.backend.launch_nodes(nodes).await?;
            }
            CoreCommand::CancelJobs(jobs) => {
                debug!(?jobs, "canceling jobs");
                self.backend.cancel_jobs(jobs).await?;
            }
            CoreCommand::FinishWorkflow(status) => {
                self.backend.finish_workflow(status).await?;
            }
            CoreCommand::RequestExit => {
                // keep_running is already false on this step; nothing to
                // execute beyond noting it.
                info!("core issued RequestExit command");
            }
        }
        Ok(())
    }
}

/// Send a `Tick` every `interval` until the receiving side goes away.
///
/// The first tick fires immediately.
pub fn spawn_ticker(tx: mpsc::Sender<RuntimeEvent>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if tx.send(RuntimeEvent::Tick).await.is_err() {
                debug!("runtime gone; ticker stopping");
                break;
            }
        }
    })
}
