//! Logging infrastructure.
//!
//! Structured console logging via `tracing`, configurable through the
//! `RUST_LOG` environment variable.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize the logging system.
///
/// Falls back to `default_level` (e.g. "info") when `RUST_LOG` is unset.
/// Must be called at most once per process; subsequent calls return an
/// error from the subscriber registry.
///
/// # Arguments
///
/// * `default_level` - Filter directive used when `RUST_LOG` is not set
pub fn init_logging(default_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}
