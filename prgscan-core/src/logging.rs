//! Structured logging using **tracing**.
//!
//! Worker threads emit events while scanning (skipped files, phase
//! transitions). The JSON subscriber writes them to stderr so stdout stays
//! free for the summary and JSON output.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "warn";

/// Initializes the global tracing subscriber.
///
/// Call once at program start. Calling it again is a no-op.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=prgscan_core=debug`)
pub fn init_structured_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // try_init: a second call (tests, embedding) must not panic
    let _ = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
