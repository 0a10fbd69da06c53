//! Conversion from the conversation model to OpenAI-compatible wire format

use super::types::{CompatContent, CompatContentPart, CompatImageUrl, CompatMessage};
use crate::protocol::{Attachment, AttachmentData, Message};

/// Convert windowed turns to wire messages. System turns stay inline: this
/// protocol has no dedicated system channel.
pub fn to_compat_messages(turns: &[&Message]) -> Vec<CompatMessage> {
    turns.iter().map(|turn| to_compat_message(turn)).collect()
}

fn to_compat_message(message: &Message) -> CompatMessage {
    match message {
        Message::System { content } => CompatMessage {
            role: "system".to_string(),
            content: CompatContent::Text(content.clone()),
        },
        Message::Assistant { content } => CompatMessage {
            role: "assistant".to_string(),
            content: CompatContent::Text(content.clone()),
        },
        Message::User {
            content,
            attachments,
        } => {
            let content = if attachments.is_empty() {
                CompatContent::Text(content.clone())
            } else {
                let mut parts = vec![CompatContentPart::Text {
                    text: content.clone(),
                }];
                parts.extend(attachments.iter().map(attachment_part));
                CompatContent::Parts(parts)
            };
            CompatMessage {
                role: "user".to_string(),
                content,
            }
        }
    }
}

fn attachment_part(attachment: &Attachment) -> CompatContentPart {
    let url = match &attachment.data {
        AttachmentData::Url(url) => url.clone(),
        AttachmentData::Base64(data) => {
            format!("data:{};base64,{}", attachment.media_type, data)
        }
    };
    CompatContentPart::ImageUrl {
        image_url: CompatImageUrl { url },
    }
}
