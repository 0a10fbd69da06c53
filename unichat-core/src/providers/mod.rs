//! Provider abstraction and backend variants
//!
//! A [`Provider`] dispatches listing, streaming, and structured-output
//! operations to one backend. Providers hold only credential, endpoint, and
//! tool configuration, all fixed at construction, so one instance can back
//! any number of sessions concurrently.

pub mod anthropic;
pub mod azure;
pub mod openai_compat;
pub mod registry;
pub mod window;

pub use registry::{get_provider, get_provider_with, ProviderInit, ProviderRegistry};

use crate::config::SecretString;
use crate::error::{ProviderError, ProviderResult};
use crate::protocol::{ChatModel, Response, ToolDefinition};
use crate::session::ChatSession;
use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default user agent sent with every backend request
const USER_AGENT: &str = "unichat/0.1.0";

/// Lazily evaluated, single-pass sequence of response fragments
pub type ResponseStream = Pin<Box<dyn Stream<Item = ProviderResult<Response>> + Send>>;

/// Core trait every backend variant implements
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable backend key used for factory lookup and settings paths
    fn key(&self) -> &'static str;

    /// Base endpoint URL this instance talks to
    fn base_url(&self) -> &str;

    /// Tool descriptors forwarded verbatim into backend requests
    fn tools(&self) -> &[ToolDefinition];

    /// List the models the backend currently offers
    async fn list_models(&self) -> ProviderResult<Vec<ChatModel>>;

    /// Stream a response for the session's windowed history
    async fn stream_response(
        &self,
        session: &ChatSession,
        cancel: CancellationToken,
    ) -> ProviderResult<ResponseStream>;

    /// Produce raw reply text constrained by the given JSON schema, using
    /// native schema decoding when the backend supports it
    async fn structured_response(
        &self,
        session: &ChatSession,
        schema: &Value,
    ) -> ProviderResult<String>;
}

impl std::fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("key", &self.key())
            .field("base_url", &self.base_url())
            .finish()
    }
}

/// Session construction on provider handles
pub trait ProviderExt {
    /// Create a session bound to this provider and the given model. This is
    /// the only way to obtain a [`ChatSession`].
    fn create_chat_session(&self, model: impl Into<String>) -> ChatSession;
}

impl ProviderExt for Arc<dyn Provider> {
    fn create_chat_session(&self, model: impl Into<String>) -> ChatSession {
        ChatSession::new(Arc::clone(self), model)
    }
}

/// Guard shared by every generation method: an empty credential means the
/// provider was never initialized
pub(crate) fn ensure_ready(api_key: &SecretString) -> ProviderResult<()> {
    if api_key.is_empty() {
        return Err(ProviderError::NotInitialized);
    }
    Ok(())
}

/// Pooled HTTP client shared by the backend variants. No total request
/// timeout: streamed replies can legitimately run for minutes.
pub(crate) fn http_client() -> ProviderResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(USER_AGENT)
        .gzip(true)
        .build()?;
    Ok(client)
}

/// Surface a non-success backend reply verbatim as a [`ProviderError`]
pub(crate) async fn error_for_status(
    key: &'static str,
    response: reqwest::Response,
) -> ProviderResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    tracing::warn!(provider = key, status = status.as_u16(), "backend request failed");

    Err(ProviderError::Backend {
        key,
        status: status.as_u16(),
        message,
    })
}
