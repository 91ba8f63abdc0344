//! Structured logging setup

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install a JSON tracing subscriber filtered by `service.log_level`
///
/// Returns `false` if a global subscriber was already installed, which is
/// common when several tests initialize tracing in one process.
pub fn init_tracing(config: &Config) -> bool {
    let log_level = &config.service.log_level;

    let installed = tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(
            environment = %config.service.environment,
            "Tracing initialized for service: {}",
            config.service.name
        );
    }
    installed
}
