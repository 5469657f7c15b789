//! Shared glue for the command-line tools.

use std::fmt::Display;
use std::process;
use tracing_subscriber::EnvFilter;

/// Log to stderr so tool output on stdout stays clean. `RUST_LOG`
/// overrides the default `info` level.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Unwrap a tool result, or print the error and exit with status 1.
pub fn or_exit<T, E: Display>(result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("ERROR: {e}");
            process::exit(1);
        }
    }
}
