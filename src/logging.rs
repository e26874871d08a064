// Logging setup.
//
// Uses `tracing` + `tracing-subscriber`. The level is read from `RUST_LOG`
// (e.g. `RUST_LOG=obras_dashboard=debug`) and defaults to `info`.
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global fmt subscriber.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// Verbose subscriber for tests; safe to call more than once.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
