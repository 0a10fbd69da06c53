//! Conversation sessions
//!
//! A [`ChatSession`] binds an ordered message history to exactly one provider
//! and one model. The provider outlives the session and may back many
//! sessions at once; a single session is not safe for overlapping generation
//! calls and callers must serialize them.

use crate::error::{ProviderError, ProviderResult};
use crate::protocol::{Message, Response};
use crate::providers::{Provider, ResponseStream};
use futures::StreamExt;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Default memory-window length for new sessions
pub const DEFAULT_SHORT_TERM_MEMORY_LENGTH: usize = 20;

/// Mutable conversation state bound to one provider and one model
#[derive(Clone)]
pub struct ChatSession {
    provider: Arc<dyn Provider>,
    model: String,
    messages: Vec<Message>,
    short_term_memory_length: usize,
    max_output_tokens: Option<u32>,
    extras: Map<String, Value>,
}

impl ChatSession {
    pub(crate) fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            messages: Vec::new(),
            short_term_memory_length: DEFAULT_SHORT_TERM_MEMORY_LENGTH,
            max_output_tokens: None,
            extras: Map::new(),
        }
    }

    /// The provider backing this session
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Backend model identifier this session generates with
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full conversation history, in insertion order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Append one message to the history
    pub fn push(&mut self, message: Message) -> &mut Self {
        self.messages.push(message);
        self
    }

    /// Append a system message
    pub fn add_system_prompt(&mut self, content: impl Into<String>) -> &mut Self {
        self.push(Message::system(content))
    }

    /// Append a user message
    pub fn add_user_message(&mut self, content: impl Into<String>) -> &mut Self {
        self.push(Message::user(content))
    }

    /// Append an assistant message
    pub fn add_assistant_message(&mut self, content: impl Into<String>) -> &mut Self {
        self.push(Message::assistant(content))
    }

    /// Memory-window length: how many recent turns each backend request may
    /// carry beyond the newest one
    pub fn short_term_memory_length(&self) -> usize {
        self.short_term_memory_length
    }

    pub fn set_short_term_memory_length(&mut self, length: usize) -> &mut Self {
        self.short_term_memory_length = length;
        self
    }

    /// Caller-requested cap on generated tokens, if any
    pub fn max_output_tokens(&self) -> Option<u32> {
        self.max_output_tokens
    }

    pub fn set_max_output_tokens(&mut self, cap: u32) -> &mut Self {
        self.max_output_tokens = Some(cap);
        self
    }

    /// Backend-specific extras, opaque to the generic contract. Only the
    /// matching provider variant reads them; a `null` value suppresses a
    /// field the variant would otherwise default.
    pub fn extras(&self) -> &Map<String, Value> {
        &self.extras
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.extras.insert(key.into(), value);
        self
    }

    pub(crate) fn ensure_conversational(&self) -> ProviderResult<()> {
        if self.messages.is_empty() {
            return Err(ProviderError::EmptyConversation);
        }
        Ok(())
    }

    /// Stream a response for the current history.
    ///
    /// The returned sequence is lazily evaluated and single-pass: fragments
    /// arrive in backend emission order as they are produced. Cancelling the
    /// token ends the stream early; fragments already yielded stay valid.
    pub async fn stream_response(
        &self,
        cancel: CancellationToken,
    ) -> ProviderResult<ResponseStream> {
        self.provider.stream_response(self, cancel).await
    }

    /// Drive the stream to completion and return one aggregate response.
    ///
    /// Observationally equivalent to consuming [`Self::stream_response`]
    /// manually and concatenating fragment text in order.
    pub async fn get_response(&self) -> ProviderResult<Response> {
        let mut stream = self.stream_response(CancellationToken::new()).await?;
        let mut content = String::new();
        while let Some(fragment) = stream.next().await {
            content.push_str(fragment?.content());
        }
        Ok(Response::new(content))
    }

    /// Produce a typed value constrained by the JSON schema of `T`.
    ///
    /// Uses the backend's native schema-constrained decoding when available
    /// and a schema-in-prompt fallback otherwise.
    pub async fn structured_output<T>(&self) -> ProviderResult<T>
    where
        T: DeserializeOwned + JsonSchema,
    {
        crate::structured::structured_output(self).await
    }
}

impl fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatSession")
            .field("provider", &self.provider.key())
            .field("model", &self.model)
            .field("messages", &self.messages.len())
            .field("short_term_memory_length", &self.short_term_memory_length)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}
