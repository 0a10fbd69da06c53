//! Configuration error types

use thiserror::Error;

/// Errors raised while loading or interpreting settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The settings file could not be parsed
    #[error("failed to parse settings file {path}: {message}")]
    Parse { path: String, message: String },

    /// An interpolated environment variable is not set
    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}
