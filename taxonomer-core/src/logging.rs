//! Process-wide logging setup

use tracing_subscriber::EnvFilter;

/// Environment variable consulted before the configured level
pub const LOG_ENV_VAR: &str = "TAXONOMER_LOG";

/// Install the global `tracing` subscriber.
///
/// `TAXONOMER_LOG` wins over `default_level`. Returns false when a subscriber
/// was already installed, which is not an error.
pub fn init_logging(default_level: &str) -> bool {
    let level = std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| default_level.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
