//! Logging initialisation.
//!
//! Log output goes through `tracing-subscriber`. `RUST_LOG` takes precedence
//! over the filter configured in `engine.yaml`.

use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber.
///
/// `default_filter` is used when `RUST_LOG` is unset or invalid, for example
/// `info,shift_engine=debug`.
///
/// # Example
///
/// ```no_run
/// shift_engine::logging::init("info");
/// ```
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Installs a debug-level subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call takes effect.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
