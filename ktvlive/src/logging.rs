//! Logging bootstrap
//!
//! Installs a global `tracing` subscriber driven by the `host.logger`
//! section of the configuration.

use ktvconfig::Config;
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Parse a level name (`TRACE`, `debug`, `Warn`, ...)
pub fn string_to_level(level: &str) -> Option<Level> {
    match level.trim().to_ascii_uppercase().as_str() {
        "TRACE" => Some(Level::TRACE),
        "DEBUG" => Some(Level::DEBUG),
        "INFO" => Some(Level::INFO),
        "WARN" | "WARNING" => Some(Level::WARN),
        "ERROR" => Some(Level::ERROR),
        _ => None,
    }
}

/// Minimum level configured under `host.logger.min_level`, INFO if unusable
pub fn configured_level(config: &Config) -> LevelFilter {
    config
        .get_log_min_level()
        .ok()
        .and_then(|l| string_to_level(&l))
        .map(LevelFilter::from_level)
        .unwrap_or(LevelFilter::INFO)
}

/// Install the global subscriber
///
/// Returns `false` when a subscriber was already installed, which is the
/// case when an embedding application set up its own logging.
pub fn init_logging(config: &Config) -> bool {
    let level = configured_level(config);
    let enable_console = config.get_log_enable_console().unwrap_or(true);

    let console = enable_console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
    });

    tracing_subscriber::registry()
        .with(level)
        .with(console)
        .try_init()
        .is_ok()
}
