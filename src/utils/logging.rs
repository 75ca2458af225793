//! Logging utilities
//!
//! The crate logs through the `log` facade only. Binaries and tests that want
//! console output can install the standard `env_logger` backend with these
//! helpers; embedding pipelines bring their own backend.

use env_logger::Env;

/// Install `env_logger` honoring `RUST_LOG`, defaulting to `info`
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logger() {
    init_logger_with_level("info");
}

/// Install `env_logger` with an explicit default level
///
/// # Arguments
/// * `default_level` - Level filter used when `RUST_LOG` is unset
pub fn init_logger_with_level(default_level: &str) {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .try_init();
}
