//! Console tracing initialization for worker processes.

use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize console telemetry for a worker process.
///
/// Respects `RUST_LOG` when set; otherwise logs `info` globally and `debug`
/// for the gleaner crates. Call once at process start.
///
/// # Arguments
///
/// * `json_logs` - Emit JSON-formatted lines for structured log collection
///   instead of the human-readable format.
pub fn init_telemetry(json_logs: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gleaner=debug"));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json_logs {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer()).init();
    }

    info!(json_logs, "Telemetry initialized");

    Ok(())
}
