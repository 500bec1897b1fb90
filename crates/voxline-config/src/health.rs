use serde::Deserialize;

/// Liveness endpoint configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            path: default_path(),
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_enabled() -> bool {
    true
}

fn default_path() -> String {
    "/health".to_string()
}
