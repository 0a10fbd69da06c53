//! Anthropic Messages API wire types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message-creation request
#[derive(Debug, Serialize)]
pub struct CreateMessageRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<AnthropicMessage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    pub temperature: f32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<ThinkingConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<AnthropicTool>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// One turn in wire format; system instructions travel in the dedicated
/// `system` field, never here
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

/// Request content block
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

/// Image payload reference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
    Base64 { media_type: String, data: String },
    Url { url: String },
}

/// Extended-thinking configuration
#[derive(Debug, Clone, Serialize)]
pub struct ThinkingConfig {
    #[serde(rename = "type")]
    pub config_type: &'static str,
    pub budget_tokens: u32,
}

/// Tool descriptor in Anthropic's shape
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicTool {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub input_schema: Value,
}

/// Completed message reply
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub content: Vec<ResponseBlock>,
}

/// Reply content block; non-text blocks are carried but ignored by this
/// layer
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBlock {
    Text { text: String },
    Thinking {},
    ToolUse {},
}

/// Server-sent stream event
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    MessageStart {},
    ContentBlockStart {},
    ContentBlockDelta { delta: Delta },
    ContentBlockStop {},
    MessageDelta {},
    MessageStop,
    Ping,
    Error { error: StreamError },
}

/// Incremental content payload
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Delta {
    TextDelta { text: String },
    InputJsonDelta {},
    ThinkingDelta {},
    SignatureDelta {},
}

/// Error payload delivered over the stream
#[derive(Debug, Deserialize)]
pub struct StreamError {
    #[serde(rename = "type", default)]
    pub error_type: String,
    pub message: String,
}

/// Model catalog reply
#[derive(Debug, Deserialize)]
pub struct AnthropicModelList {
    pub data: Vec<AnthropicModelEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AnthropicModelEntry {
    pub id: String,
}
