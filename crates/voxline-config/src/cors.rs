use std::time::Duration;

use serde::Deserialize;

/// CORS configuration
///
/// Browsers embedding the submission form are allowed from any origin
/// unless an explicit list is configured.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Whether the CORS layer is installed at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Allowed origins: `"*"` or a list of origins
    #[serde(default)]
    pub origins: Origins,
    /// Max age for preflight cache in seconds
    #[serde(default)]
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            origins: Origins::Any,
            max_age: None,
        }
    }
}

impl CorsConfig {
    /// Get max age as Duration
    pub fn max_age_duration(&self) -> Option<Duration> {
        self.max_age.map(Duration::from_secs)
    }
}

/// Either any origin or an explicit list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Origins {
    #[default]
    Any,
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for Origins {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }

        let origins = match Raw::deserialize(deserializer)? {
            Raw::One(origin) => vec![origin],
            Raw::Many(origins) => origins,
        };

        if origins.iter().any(|o| o == "*") {
            Ok(Self::Any)
        } else {
            Ok(Self::List(origins))
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_enabled() -> bool {
    true
}
