//! Provider error types and handling

use thiserror::Error;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur when interacting with LLM backends
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Credential missing or empty, or a call was made before initialization
    #[error("provider not initialized: credential missing or empty")]
    NotInitialized,

    /// Generation was requested on a session with no messages
    #[error("no messages to send")]
    EmptyConversation,

    /// The factory was given an unrecognized backend key
    #[error("unknown provider key: {0}")]
    UnknownProvider(String),

    /// A message variant reached a converter with no mapping for it.
    /// Signals a programming error, not a runtime condition.
    #[error("no {role} turn mapping for this backend")]
    UnsupportedMessageType { role: &'static str },

    /// A schema-guided reply could not be parsed into the target shape.
    /// Terminal per call; the caller decides what to do next.
    #[error("failed to deserialize structured output: {0}")]
    StructuredOutputDeserialization(String),

    /// Failure raised by the HTTP transport, passed through unmodified
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Non-success status returned by a backend, surfaced verbatim
    #[error("{key} returned HTTP {status}: {message}")]
    Backend {
        key: &'static str,
        status: u16,
        message: String,
    },

    /// The response stream broke mid-flight
    #[error("response stream error: {0}")]
    Stream(String),
}

impl ProviderError {
    /// Wrap a JSON error from the structured-output path
    pub(crate) fn structured(err: impl std::fmt::Display) -> Self {
        ProviderError::StructuredOutputDeserialization(err.to_string())
    }
}
