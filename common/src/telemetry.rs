// Structured logging setup for hosts embedding the persistence layer

use crate::config::ObservabilityConfig;
use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Build the log filter: `RUST_LOG` wins over the configured level
pub fn env_filter(log_level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))
}

/// Initialize the global tracing subscriber.
///
/// JSON output carries the current span and span list so repository spans
/// (`#[instrument]`) show up on every event.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = env_filter(&config.log_level)?;

    let layer = if config.json_logs {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(filter)
            .boxed()
    } else {
        fmt::layer().with_target(true).with_filter(filter).boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;

    tracing::info!(
        log_level = %config.log_level,
        json = config.json_logs,
        "Structured logging initialized"
    );

    Ok(())
}
