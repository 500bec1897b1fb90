//! Logging for voxline
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a `fmt`
//! layer in text or JSON form.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use voxline_config::{LogFormat, TelemetryConfig};

/// Initialize logging from configuration
///
/// `RUST_LOG`, when set, takes precedence over the configured filter.
///
/// # Errors
///
/// Returns an error if the filter directive is invalid or a global
/// subscriber is already installed
pub fn init(config: &TelemetryConfig) -> anyhow::Result<()> {
    let filter = build_filter(config)?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

fn build_filter(config: &TelemetryConfig) -> anyhow::Result<EnvFilter> {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .map_err(|e| anyhow::anyhow!("invalid {} '{directives}': {e}", EnvFilter::DEFAULT_ENV)),
        _ => EnvFilter::try_new(&config.log_filter)
            .map_err(|e| anyhow::anyhow!("invalid telemetry.log_filter '{}': {e}", config.log_filter)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(filter: &str) -> TelemetryConfig {
        TelemetryConfig {
            log_filter: filter.to_string(),
            format: LogFormat::Text,
        }
    }

    #[test]
    fn configured_filter_is_used_without_rust_log() {
        temp_env::with_var_unset("RUST_LOG", || {
            let filter = build_filter(&config("debug")).unwrap();
            assert_eq!(filter.to_string(), "debug");
        });
    }

    #[test]
    fn rust_log_wins() {
        temp_env::with_var("RUST_LOG", Some("warn"), || {
            let filter = build_filter(&config("debug")).unwrap();
            assert_eq!(filter.to_string(), "warn");
        });
    }

    #[test]
    fn invalid_filter_is_rejected() {
        temp_env::with_var_unset("RUST_LOG", || {
            assert!(build_filter(&config("voxline=loudest")).is_err());
        });
    }
}
