//! Observability for chirpy
//!
//! Counters live in [`MetricsRegistry`]. Log output goes through
//! `tracing`; [`init_tracing`] installs the subscriber used by the binary.

mod metrics;

pub use metrics::{MetricsRegistry, MetricsSnapshot};

use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`)
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
