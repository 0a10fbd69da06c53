//! Azure OpenAI backend variant
//!
//! Speaks the same chat protocol as the OpenAI-compatible component but
//! addresses deployments by name under the resource endpoint and
//! authenticates with an `api-key` header, so it is a sibling variant
//! rather than a profile. Deployments are not discoverable through a
//! catalog call; model listing returns an empty set.

use crate::config::SecretString;
use crate::error::ProviderResult;
use crate::protocol::{ChatModel, ToolDefinition};
use crate::providers::openai_compat::streaming::fragment_stream;
use crate::providers::openai_compat::types::{
    CompatJsonSchema, CompatRequest, CompatResponse, CompatResponseFormat,
};
use crate::providers::openai_compat::converter;
use crate::providers::registry::ProviderInit;
use crate::providers::{
    ensure_ready, error_for_status, http_client, window, Provider, ResponseStream,
};
use crate::session::ChatSession;
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://eastus.api.cognitive.microsoft.com";
const API_VERSION: &str = "2024-10-21";

/// Provider for Azure-hosted OpenAI deployments
pub struct AzureProvider {
    base_url: String,
    api_key: SecretString,
    tools: Vec<ToolDefinition>,
    client: reqwest::Client,
}

impl AzureProvider {
    pub const KEY: &'static str = "AzureOpenAI";

    pub fn new(init: ProviderInit) -> ProviderResult<Self> {
        let api_key = init.validated_key()?;
        let base_url = init
            .base_url_override(Self::KEY)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            base_url,
            api_key,
            tools: init.tools,
            client: http_client()?,
        })
    }

    /// The session's model identifier doubles as the deployment name
    fn deployment_url(&self, deployment: &str) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.base_url.trim_end_matches('/'),
            deployment,
            API_VERSION
        )
    }

    fn build_request(&self, session: &ChatSession, stream: bool) -> ProviderResult<CompatRequest> {
        ensure_ready(&self.api_key)?;
        session.ensure_conversational()?;

        let turns = window::inline_window(session.messages(), session.short_term_memory_length());

        Ok(CompatRequest {
            model: session.model().to_string(),
            messages: converter::to_compat_messages(&turns),
            max_tokens: session.max_output_tokens(),
            stream: stream.then_some(true),
            response_format: None,
            tools: (!self.tools.is_empty()).then(|| self.tools.clone()),
            extra: Default::default(),
        })
    }

    async fn send(&self, body: &CompatRequest) -> ProviderResult<reqwest::Response> {
        let url = self.deployment_url(&body.model);
        debug!(provider = Self::KEY, %url, "issuing chat completion request");

        let response = self
            .client
            .post(&url)
            .header("api-key", self.api_key.expose_secret())
            .json(body)
            .send()
            .await?;

        error_for_status(Self::KEY, response).await
    }
}

#[async_trait]
impl Provider for AzureProvider {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    async fn list_models(&self) -> ProviderResult<Vec<ChatModel>> {
        ensure_ready(&self.api_key)?;
        Ok(Vec::new())
    }

    async fn stream_response(
        &self,
        session: &ChatSession,
        cancel: CancellationToken,
    ) -> ProviderResult<ResponseStream> {
        let body = self.build_request(session, true)?;
        let response = self.send(&body).await?;
        Ok(fragment_stream(response.bytes_stream(), cancel))
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
