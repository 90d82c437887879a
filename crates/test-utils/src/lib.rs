//! Shared helpers for flowdag's integration tests: snapshot builders, a
//! scripted job backend, and tracing/timeout glue.

pub mod builders;
pub mod fake_backend;

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Route coordinator and traversal logs through the test harness.
///
/// Output shows up only for failing tests (or with `--nocapture`); set
/// `RUST_LOG=flowdag=trace` to see every traversal decision.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Fail the test if a runtime loop has not stopped within 5 seconds.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}
