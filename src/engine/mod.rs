// src/engine/mod.rs

//! Tick-driven workflow coordinator.
//!
//! This module ties together:
//! - the per-tick scheduling decisions from [`crate::dag`]
//! - the runtime event loop that reacts to:
//!   - timer ticks (re-evaluate the workflow)
//!   - cancel requests
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Stop after this many ticks even if the workflow has not finished.
    pub max_ticks: Option<u64>,
}

/// Events flowing into the runtime from the ticker and signal handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// Time to re-evaluate the workflow against fresh state.
    Tick,
    /// Cancel the whole workflow: cancel running jobs, then finish as canceled.
    CancelRequested,
    /// Stop the runtime without touching the workflow.
    ShutdownRequested,
}

pub mod core;
pub mod runtime;

pub use core::{CoordinatorCore, CoreCommand, CoreStep};
pub use runtime::{Runtime, spawn_ticker};
