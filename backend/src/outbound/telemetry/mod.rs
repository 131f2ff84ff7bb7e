//! Structured logging: the observer adapter and subscriber setup.

mod tracing_observer;

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

pub use tracing_observer::TracingAuthObserver;

/// Install the global `tracing` subscriber.
///
/// Filtering follows `RUST_LOG`. Output goes to stderr so command output on
/// stdout stays machine readable. A subscriber that is already installed is
/// kept and a warning is logged through it.
pub fn init_tracing(json_logs: bool) {
    let builder = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    let result = if json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}
