/*!
 * Tracing Setup
 * Structured tracing initialization for the binary
 */

use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize structured tracing
///
/// Filtering comes from `RUST_LOG` (default `info`); set
/// `SCHEDSIM_TRACE_JSON=1` for JSON output. `log` records from the library
/// are captured through the tracing bridge.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("SCHEDSIM_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
        info!("tracing initialized with JSON output");
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
        info!("tracing initialized");
    }
}
