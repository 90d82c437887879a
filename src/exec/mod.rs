// src/exec/mod.rs

//! Job backends: where workflow state comes from and where launch/cancel
//! requests go.

pub mod backend;
pub mod simulated;

pub use backend::{BackendFuture, JobBackend};
pub use simulated::SimulatedBackend;
