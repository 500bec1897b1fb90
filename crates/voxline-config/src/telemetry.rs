use serde::Deserialize;

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human readable
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

fn default_log_filter() -> String {
    "info".to_string()
}
