//! OpenAI-compatible wire types
//!
//! These match the chat-completions protocol spoken by OpenAI and the
//! backends that emulate it (Gemini's compatibility layer, Groq), and are
//! used for serialization when talking to those servers.

use crate::protocol::ToolDefinition;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct CompatRequest {
    pub model: String,
    pub messages: Vec<CompatMessage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<CompatResponseFormat>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,

    /// Backend-specific request fields injected by the profile, flattened
    /// into the request object
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Message in wire format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatMessage {
    pub role: String,
    pub content: CompatContent,
}

/// Content: plain string or multimodal parts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompatContent {
    Text(String),
    Parts(Vec<CompatContentPart>),
}

/// Individual content part for multimodal messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompatContentPart {
    Text { text: String },
    ImageUrl { image_url: CompatImageUrl },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatImageUrl {
    pub url: String,
}

/// Response-format constraint
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompatResponseFormat {
    JsonObject,
    JsonSchema { json_schema: CompatJsonSchema },
}

/// Named schema payload for strict schema-constrained decoding
#[derive(Debug, Clone, Serialize)]
pub struct CompatJsonSchema {
    pub name: String,
    pub strict: bool,
    pub schema: Value,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct CompatResponse {
    pub id: String,
    pub model: String,
    pub choices: Vec<CompatChoice>,
    pub usage: Option<CompatUsage>,
}

#[derive(Debug, Deserialize)]
pub struct CompatChoice {
    pub message: CompatResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompatResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompatUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Streaming chunk
#[derive(Debug, Deserialize)]
pub struct CompatStreamChunk {
    pub choices: Vec<CompatStreamChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompatStreamChoice {
    pub delta: CompatDelta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompatDelta {
    pub role: Option<String>,
    pub content: Option<String>,
}

/// Model catalog reply
#[derive(Debug, Deserialize)]
pub struct CompatModelList {
    pub data: Vec<CompatModelEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CompatModelEntry {
    pub id: String,
}
