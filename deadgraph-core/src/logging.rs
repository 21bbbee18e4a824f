//! Structured logging using **tracing**.
//!
//! Library code only emits events; installing a subscriber is left to the
//! binary. The JSON subscriber gives machine-readable output on stderr so
//! stdout stays reserved for reports.

/// Initializes the global tracing subscriber with JSON output to stderr.
///
/// Call once, at the start of the program. Filtering comes from `RUST_LOG`
/// (e.g., `RUST_LOG=deadgraph_core=debug`); calling it again is a no-op.
pub fn init_structured_logging() {
    let _ = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
