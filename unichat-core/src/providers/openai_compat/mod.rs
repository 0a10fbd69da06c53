//! OpenAI-compatible backend component
//!
//! One request builder serves every backend that speaks the OpenAI chat
//! protocol. A [`CompatProfile`] parameterizes it: selection key, default
//! endpoint, and an optional injector for backend-specific request fields.
//! Gemini and Groq are profiles of this component rather than separate
//! implementations.

pub mod converter;
pub(crate) mod streaming;
pub mod types;

use crate::config::SecretString;
use crate::error::ProviderResult;
use crate::protocol::{ChatModel, ToolDefinition};
use crate::providers::registry::ProviderInit;
use crate::providers::{
    ensure_ready, error_for_status, http_client, window, Provider, ResponseStream,
};
use crate::session::ChatSession;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use types::{
    CompatJsonSchema, CompatModelList, CompatRequest, CompatResponse, CompatResponseFormat,
};

/// Session extras key for Groq's service tier (defaults to `"auto"`)
pub const SERVICE_TIER: &str = "service_tier";
/// Session extras key asking Groq to include reasoning in the reply
pub const INCLUDE_REASONING: &str = "include_reasoning";
/// Session extras key selecting Groq's reasoning format
pub const REASONING_FORMAT: &str = "reasoning_format";
/// Session extras key selecting Groq's reasoning effort
pub const REASONING_EFFORT: &str = "reasoning_effort";

/// Injector contributing backend-specific fields to an outgoing request
pub type ExtraFieldsFn = fn(&ChatSession) -> Map<String, Value>;

/// Static description of one OpenAI-compatible backend
pub struct CompatProfile {
    /// Provider selection key
    pub key: &'static str,
    /// Endpoint used when no settings override is present
    pub default_base_url: &'static str,
    /// Backend-specific request fields, if the backend has any
    pub extra_fields: Option<ExtraFieldsFn>,
}

pub static OPENAI: CompatProfile = CompatProfile {
    key: "OpenAI",
    default_base_url: "https://api.openai.com/v1",
    extra_fields: None,
};

// uses the openai compatibility layer of gemini
pub static GEMINI: CompatProfile = CompatProfile {
    key: "Gemini",
    default_base_url: "https://generativelanguage.googleapis.com/v1beta/openai",
    extra_fields: None,
};

pub static GROQ: CompatProfile = CompatProfile {
    key: "Groq",
    default_base_url: "https://api.groq.com/openai/v1",
    extra_fields: Some(groq_extra_fields),
};

/// Groq request extensions from session extras. `service_tier` defaults to
/// `"auto"`; an explicit `null` suppresses a field entirely.
fn groq_extra_fields(session: &ChatSession) -> Map<String, Value> {
    let mut fields: Map<String, Value> = session
        .extras()
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    if !session.extras().contains_key(SERVICE_TIER) {
        fields.insert(SERVICE_TIER.to_string(), Value::String("auto".to_string()));
    }

    fields
}

/// Provider for any backend speaking the OpenAI-compatible protocol
pub struct OpenAiCompatProvider {
    profile: &'static CompatProfile,
    base_url: String,
    api_key: SecretString,
    tools: Vec<ToolDefinition>,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Construct an initialized provider for the given profile
    pub fn new(profile: &'static CompatProfile, init: ProviderInit) -> ProviderResult<Self> {
        let api_key = init.validated_key()?;
        let base_url = init
            .base_url_override(profile.key)
            .unwrap_or_else(|| profile.default_base_url.to_string());

        Ok(Self {
            profile,
            base_url,
            api_key,
            tools: init.tools,
            client: http_client()?,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn build_request(&self, session: &ChatSession, stream: bool) -> ProviderResult<CompatRequest> {
        ensure_ready(&self.api_key)?;
        session.ensure_conversational()?;

        let turns = window::inline_window(session.messages(), session.short_term_memory_length());
        let extra = self
            .profile
            .extra_fields
            .map(|inject| inject(session))
            .unwrap_or_default();

        Ok(CompatRequest {
            model: session.model().to_string(),
            messages: converter::to_compat_messages(&turns),
            max_tokens: session.max_output_tokens(),
            stream: stream.then_some(true),
            response_format: None,
            tools: (!self.tools.is_empty()).then(|| self.tools.clone()),
            extra,
        })
    }

    async fn send(&self, body: &CompatRequest) -> ProviderResult<reqwest::Response> {
        let url = self.endpoint("chat/completions");
        debug!(provider = self.profile.key, %url, model = %body.model, "issuing chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(body)
            .send()
            .await?;

        error_for_status(self.profile.key, response).await
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn key(&self) -> &'static str {
        self.profile.key
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    async fn list_models(&self) -> ProviderResult<Vec<ChatModel>> {
        ensure_ready(&self.api_key)?;

        let url = self.endpoint("models");
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await?;
        let response = error_for_status(self.profile.key, response).await?;

        let list: CompatModelList = response.json().await?;
        Ok(list
            .data
            .into_iter()
            .map(|entry| ChatModel::new(entry.id))
            .collect())
    }

    async fn stream_response(
        &self,
        session: &ChatSession,
        cancel: CancellationToken,
    ) -> ProviderResult<ResponseStream> {
        let body = self.build_request(session, true)?;
        let response = self.send(&body).await?;
        Ok(streaming::fragment_stream(response.bytes_stream(), cancel))
    }

    async fn structured_response(
        &self,
        session: &ChatSession,
        schema: &Value,
    ) -> ProviderResult<String> {
        let mut body = self.build_request(session, false)?;
        body.response_format = Some(CompatResponseFormat::JsonSchema {
            json_schema: CompatJsonSchema {
                name: "response".to_string(),
                strict: true,
                schema: schema.clone(),
            },
        });

        let response = self.send(&body).await?;
        let parsed: CompatResponse = response.json().await?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}
