//! Logging initialization.
//!
//! - JSON: structured logs for aggregation (`--log-json` or `SPIKEWIRE_ENV=production`)
//! - Otherwise: human-readable logs
//!
//! `RUST_LOG` overrides the default `info` filter.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_logging(force_json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let environment = std::env::var("SPIKEWIRE_ENV").unwrap_or_default();
    let json = force_json || matches!(environment.as_str(), "production" | "prod");

    // Logs go to stderr so stdout stays clean for `spikewire config`.
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
