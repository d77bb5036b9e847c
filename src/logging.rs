//! Diagnostic logging setup.
//!
//! Filtering comes from `SHEET_LOG`, falling back to `RUST_LOG`:
//! - `SHEET_LOG=debug` - run classification and summaries
//! - `SHEET_LOG=sheet_rs::pipeline=trace` - one event per processed row
//!
//! Logs go to stderr so they never mix with the table on stdout.

use tracing_subscriber::EnvFilter;

/// Environment variable consulted first for the log filter.
pub const LOG_ENV: &str = "SHEET_LOG";

fn filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "info" } else { "warn" };
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the stderr subscriber. Safe to call more than once.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
