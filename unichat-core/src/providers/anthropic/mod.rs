//! Anthropic backend variant
//!
//! The Messages API separates system instructions from the turn list, has no
//! native schema-constrained decoding, and requires an explicit output-token
//! ceiling on every request.

pub(crate) mod streaming;
pub mod types;

use crate::config::SecretString;
use crate::error::{ProviderError, ProviderResult};
use crate::protocol::{
    Attachment, AttachmentData, ChatModel, Message, ToolDefinition,
};
use crate::providers::registry::ProviderInit;
use crate::providers::{
    ensure_ready, error_for_status, http_client, window, Provider, ResponseStream,
};
use crate::session::ChatSession;
use crate::structured;
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use types::{
    AnthropicMessage, AnthropicModelList, AnthropicTool, ContentBlock, CreateMessageRequest,
    ImageSource, MessageResponse, ResponseBlock, ThinkingConfig,
};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

/// Ceiling applied when the caller requests no cap
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;
/// Tighter ceiling for the lightweight model family
const SMALL_FAMILY_MAX_OUTPUT_TOKENS: u32 = 4096;
const SMALL_FAMILY_MARKER: &str = "haiku";

/// Minimum thinking allotment for the extended-reasoning family
const EXTENDED_THINKING_BUDGET_TOKENS: u32 = 1025;
const EXTENDED_THINKING_MARKER: &str = "claude-3-7-sonnet";

const TEMPERATURE: f32 = 1.0;

/// Effective output-token ceiling for a model. The family ceiling is never
/// raised by the caller's request, only lowered.
fn output_token_ceiling(model: &str, requested: Option<u32>) -> u32 {
    let family_cap = if model.contains(SMALL_FAMILY_MARKER) {
        SMALL_FAMILY_MAX_OUTPUT_TOKENS
    } else {
        DEFAULT_MAX_OUTPUT_TOKENS
    };
    requested.map_or(family_cap, |cap| cap.min(family_cap))
}

fn thinking_config(model: &str) -> Option<ThinkingConfig> {
    model
        .contains(EXTENDED_THINKING_MARKER)
        .then_some(ThinkingConfig {
            config_type: "enabled",
            budget_tokens: EXTENDED_THINKING_BUDGET_TOKENS,
        })
}

/// Provider for Anthropic's Messages API
pub struct AnthropicProvider {
    base_url: String,
    api_key: SecretString,
    tools: Vec<ToolDefinition>,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub const KEY: &'static str = "Anthropic";

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

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn build_request(
        &self,
        session: &ChatSession,
        stream: bool,
    ) -> ProviderResult<CreateMessageRequest> {
        ensure_ready(&self.api_key)?;
        session.ensure_conversational()?;

        let turn_window =
            window::split_system_window(session.messages(), session.short_term_memory_length());
        let messages = turn_window
            .turns
            .iter()
            .map(|turn| to_turn(turn))
            .collect::<ProviderResult<Vec<_>>>()?;

        let model = session.model();
        Ok(CreateMessageRequest {
            model: model.to_string(),
            max_tokens: output_token_ceiling(model, session.max_output_tokens()),
            messages,
            system: turn_window.system.map(str::to_owned),
            temperature: TEMPERATURE,
            thinking: thinking_config(model),
            tools: (!self.tools.is_empty())
                .then(|| self.tools.iter().map(to_anthropic_tool).collect()),
            stream: stream.then_some(true),
        })
    }

    fn request_builder(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
    }

    async fn send(&self, body: &CreateMessageRequest) -> ProviderResult<reqwest::Response> {
        let url = self.endpoint("messages");
        debug!(provider = Self::KEY, %url, model = %body.model, "issuing message request");

        let response = self.request_builder(&url).json(body).send().await?;
        error_for_status(Self::KEY, response).await
    }
}

/// Convert one windowed turn to wire format. System turns never reach this
/// point; one arriving here is a programming error upstream.
fn to_turn(message: &Message) -> ProviderResult<AnthropicMessage> {
    match message {
        Message::User {
            content,
            attachments,
        } => {
            let mut blocks = vec![ContentBlock::Text {
                text: content.clone(),
            }];
            blocks.extend(attachments.iter().map(attachment_block));
            Ok(AnthropicMessage {
                role: "user".to_string(),
                content: blocks,
            })
        }
        Message::Assistant { content } => Ok(AnthropicMessage {
            role: "assistant".to_string(),
            content: vec![ContentBlock::Text {
                text: content.clone(),
            }],
        }),
        Message::System { .. } => Err(ProviderError::UnsupportedMessageType { role: "system" }),
    }
}

fn attachment_block(attachment: &Attachment) -> ContentBlock {
    let source = match &attachment.data {
        AttachmentData::Url(url) => ImageSource::Url { url: url.clone() },
        AttachmentData::Base64(data) => ImageSource::Base64 {
            media_type: attachment.media_type.clone(),
            data: data.clone(),
        },
    };
    ContentBlock::Image { source }
}

fn to_anthropic_tool(tool: &ToolDefinition) -> AnthropicTool {
    AnthropicTool {
        name: tool.function.name.clone(),
        description: tool.function.description.clone(),
        input_schema: tool
            .function
            .parameters
            .clone()
            .unwrap_or_else(|| serde_json::json!({"type": "object"})),
    }
}

fn reply_text(response: MessageResponse) -> String {
    response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ResponseBlock::Text { text } => Some(text),
            _ => None,
        })
        .collect()
}

#[async_trait]
impl Provider for AnthropicProvider {
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

        let url = self.endpoint("models");
        let response = self
            .client
            .get(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .send()
            .await?;
        let response = error_for_status(Self::KEY, response).await?;

        let list: AnthropicModelList = response.json().await?;
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

    /// No native schema-constrained decoding: the schema is embedded in a
    /// synthetic trailing user turn instead.
    async fn structured_response(
        &self,
        session: &ChatSession,
        schema: &Value,
    ) -> ProviderResult<String> {
        let mut prompted = session.clone();
        prompted.push(Message::user(structured::schema_prompt(schema)));

        let body = self.build_request(&prompted, false)?;
        let response = self.send(&body).await?;
        let parsed: MessageResponse = response.json().await?;
        Ok(reply_text(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("claude-sonnet-4-5", None => 8192; "standard family default")]
    #[test_case("claude-3-5-haiku-latest", None => 4096; "small family default")]
    #[test_case("claude-3-5-haiku-latest", Some(20_000) => 4096; "small family never raised")]
    #[test_case("claude-sonnet-4-5", Some(2_000) => 2000; "caller cap wins when lower")]
    #[test_case("claude-sonnet-4-5", Some(20_000) => 8192; "standard family never raised")]
    #[test_case("claude-3-5-haiku-latest", Some(1_000) => 1000; "small family caller cap")]
    fn output_token_ceiling_policy(model: &str, requested: Option<u32>) -> u32 {
        output_token_ceiling(model, requested)
    }

    #[test]
    fn extended_reasoning_family_gets_a_thinking_budget() {
        let config = thinking_config("claude-3-7-sonnet-latest").unwrap();
        assert_eq!(config.budget_tokens, 1025);
        assert_eq!(config.config_type, "enabled");
        assert!(thinking_config("claude-3-5-haiku-latest").is_none());
    }

    #[test]
    fn system_turn_reaching_the_converter_is_an_error() {
        let err = to_turn(&Message::system("nope")).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::UnsupportedMessageType { role: "system" }
        ));
    }

    #[test]
    fn attachments_become_image_blocks() {
        let turn = to_turn(&Message::user_with_attachments(
            "see",
            vec![Attachment::base64("image/png", "aGk=")],
        ))
        .unwrap();
        assert_eq!(turn.content.len(), 2);
        assert!(matches!(
            &turn.content[1],
            ContentBlock::Image {
                source: ImageSource::Base64 { media_type, .. }
            } if media_type == "image/png"
        ));
    }

    #[test]
    fn reply_text_concatenates_text_blocks_only() {
        let response = MessageResponse {
            content: vec![
                ResponseBlock::Thinking {},
                ResponseBlock::Text {
                    text: "hello ".to_string(),
                },
                ResponseBlock::Text {
                    text: "world".to_string(),
                },
            ],
        };
        assert_eq!(reply_text(response), "hello world");
    }
}
