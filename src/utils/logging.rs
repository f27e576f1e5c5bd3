//! Tracing setup

use tracing_subscriber::EnvFilter;

/// Default filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "csv_geocode_picker=info,csvgeocode=info";

/// Build the filter from `RUST_LOG`, falling back to `level` for this crate
pub fn env_filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| match level {
        Some(level) => format!("csv_geocode_picker={level},csvgeocode={level}").into(),
        None => DEFAULT_LOG_FILTER.into(),
    })
}

/// Install the global subscriber; later calls are ignored
pub fn init_tracing(level: Option<&str>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .try_init();
}
