//! Deployment-level settings
//!
//! Settings are optional: every backend ships with a default endpoint, and a
//! settings file only overrides what it names. Overrides are addressed by the
//! backend's selection key, e.g.
//!
//! ```yaml
//! provider:
//!   Groq:
//!     url: https://groq.internal.example.com/openai/v1
//! ```

mod env;
mod error;
mod secrets;

pub use error::ConfigError;
pub use secrets::SecretString;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Per-backend overrides, keyed by provider selection key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub provider: HashMap<String, ProviderSettings>,
}

/// Overridable knobs for one backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Base endpoint URL override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Settings {
    /// Base-URL override for the given backend key, if one is configured.
    /// An empty string counts as unset.
    pub fn provider_url(&self, key: &str) -> Option<&str> {
        self.provider
            .get(key)
            .and_then(|settings| settings.url.as_deref())
            .filter(|url| !url.is_empty())
    }

    /// Parse settings from a YAML document, interpolating `${ENV_VAR}`
    /// references first
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let interpolated = env::interpolate_env_vars(content)?;
        serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Load settings from a YAML file
    pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let interpolated = env::interpolate_env_vars(&content)?;
        serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::Parse {
            path: path.to_string_lossy().to_string(),
            message: e.to_string(),
        })
    }

    /// Load settings from a JSON file
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let interpolated = env::interpolate_env_vars(&content)?;
        serde_json::from_str(&interpolated).map_err(|e| ConfigError::Parse {
            path: path.to_string_lossy().to_string(),
            message: e.to_string(),
        })
    }
}
