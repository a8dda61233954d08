//! Telemetry initialization: `tracing` with an env-filtered fmt subscriber.
//!
//! The log level is controlled with the standard `RUST_LOG` variable and defaults to `info`:
//!
//! ```bash
//! export RUST_LOG="paradx=debug,tower_http=info"
//! ```
//!
//! Inference failures (transport errors, non-success statuses, malformed replies) are logged at
//! `warn` with the attempt number. Since handlers always answer with a fallback message, these
//! log lines are the only place the root cause of a failed analysis is visible.

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize tracing with console output (fmt layer) filtered by `RUST_LOG`.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    info!("Telemetry initialized");

    Ok(())
}
