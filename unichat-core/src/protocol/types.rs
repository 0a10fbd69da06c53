//! Conversation data model
//!
//! Messages are immutable value objects: a session owns its message sequence,
//! but a message, once appended, is never mutated. Operations that "change" a
//! message produce a new value instead.

use serde::{Deserialize, Serialize};

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions that guide the model's behavior
    System,
    /// User input message
    User,
    /// Assistant (model) response
    Assistant,
}

impl Role {
    /// Wire-level name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn in a conversation
///
/// Only user turns carry attachments; the role tag is derived from the
/// variant and cannot drift from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        attachments: Vec<Attachment>,
    },
    Assistant {
        content: String,
    },
}

impl Message {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
            attachments: Vec::new(),
        }
    }

    /// Create a user message carrying attached content
    pub fn user_with_attachments(
        content: impl Into<String>,
        attachments: Vec<Attachment>,
    ) -> Self {
        Message::User {
            content: content.into(),
            attachments,
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant {
            content: content.into(),
        }
    }

    /// Role tag derived from the variant
    pub fn role(&self) -> Role {
        match self {
            Message::System { .. } => Role::System,
            Message::User { .. } => Role::User,
            Message::Assistant { .. } => Role::Assistant,
        }
    }

    /// Text content of the turn
    pub fn content(&self) -> &str {
        match self {
            Message::System { content }
            | Message::User { content, .. }
            | Message::Assistant { content } => content,
        }
    }

    /// Attached content items; empty for non-user turns
    pub fn attachments(&self) -> &[Attachment] {
        match self {
            Message::User { attachments, .. } => attachments,
            _ => &[],
        }
    }

    /// Produce a new message with the given attachments appended.
    ///
    /// Attachments are a user-turn concept; other variants are returned
    /// unchanged.
    pub fn with_attachments(self, extra: impl IntoIterator<Item = Attachment>) -> Self {
        match self {
            Message::User {
                content,
                mut attachments,
            } => {
                attachments.extend(extra);
                Message::User {
                    content,
                    attachments,
                }
            }
            other => other,
        }
    }
}

/// Opaque binary/media reference attached to a user turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// MIME type of the content, e.g. `image/png`
    pub media_type: String,
    /// Where the bytes live
    pub data: AttachmentData,
}

/// Attachment payload: remote reference or inline bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentData {
    Url(String),
    Base64(String),
}

impl Attachment {
    /// Attachment referencing remote content by URL
    pub fn url(media_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            data: AttachmentData::Url(url.into()),
        }
    }

    /// Attachment carrying base64-encoded bytes inline
    pub fn base64(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            data: AttachmentData::Base64(data.into()),
        }
    }
}

/// Immutable text payload produced by a backend.
///
/// During streaming each value is one incremental fragment; a non-streaming
/// aggregate call returns the concatenation of all fragments as one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    content: String,
}

impl Response {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

/// Model identifier as reported by a backend catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatModel {
    pub id: String,
}

impl ChatModel {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Tool descriptor, opaque to this layer and forwarded verbatim into
/// backend requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Type of tool (usually "function")
    #[serde(rename = "type")]
    pub tool_type: String,

    /// Function definition
    pub function: FunctionDefinition,
}

/// Function definition carried by a tool descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Function name
    pub name: String,

    /// Function description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parameters schema (JSON Schema)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_tag_follows_variant() {
        assert_eq!(Message::system("s").role(), Role::System);
        assert_eq!(Message::user("u").role(), Role::User);
        assert_eq!(Message::assistant("a").role(), Role::Assistant);
    }

    #[test]
    fn with_attachments_produces_new_value() {
        let original = Message::user("look at this");
        let extended = original
            .clone()
            .with_attachments([Attachment::url("image/png", "https://example.com/a.png")]);

        assert!(original.attachments().is_empty());
        assert_eq!(extended.attachments().len(), 1);
        assert_eq!(extended.content(), "look at this");
    }

    #[test]
    fn with_attachments_ignores_non_user_turns() {
        let message = Message::assistant("done")
            .with_attachments([Attachment::base64("image/png", "aGk=")]);
        assert!(message.attachments().is_empty());
    }
}
