//! Installs the process-wide `tracing` subscriber, driven by
//! `--log-level`/`RUST_LOG` filter directives.

use tracing_subscriber::EnvFilter;

pub fn install(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}
