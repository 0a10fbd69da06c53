//! Structured-output extraction
//!
//! Derives a JSON schema for the target shape, routes it to the backend
//! (natively when the backend enforces schemas, embedded in a prompt
//! otherwise), and deserializes the reply. Schemas whose root is not a JSON
//! object are wrapped in a single-property `data` object, since object roots
//! are the only thing schema-constrained decoding modes accept.

use crate::error::{ProviderError, ProviderResult};
use crate::session::ChatSession;
use regex::Regex;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::OnceLock;

pub(crate) async fn structured_output<T>(session: &ChatSession) -> ProviderResult<T>
where
    T: DeserializeOwned + JsonSchema,
{
    let schema = serde_json::to_value(schemars::schema_for!(T))
        .map_err(ProviderError::structured)?;
    let (schema, wrapped) = ensure_object_root(schema);

    let raw = session
        .provider()
        .structured_response(session, &schema)
        .await?;

    parse_reply(&raw, wrapped)
}

/// Whether a schema's root describes a JSON object
pub fn schema_represents_object(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("object")
}

/// Wrap non-object root schemas in a `data` envelope.
///
/// Returns the schema to send and whether the reply must be unwrapped.
pub fn ensure_object_root(schema: Value) -> (Value, bool) {
    if schema_represents_object(&schema) {
        (schema, false)
    } else {
        let wrapper = json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": { "data": schema },
            "required": ["data"],
            "additionalProperties": false,
        });
        (wrapper, true)
    }
}

/// Unwrap (if needed) and deserialize a raw backend reply
pub(crate) fn parse_reply<T: DeserializeOwned>(raw: &str, wrapped: bool) -> ProviderResult<T> {
    let payload = code_block_or_text(raw);
    let mut value: Value = serde_json::from_str(payload).map_err(ProviderError::structured)?;

    if wrapped {
        value = match value.get_mut("data") {
            Some(data) => data.take(),
            None => {
                return Err(ProviderError::structured(
                    "reply object is missing the `data` property",
                ))
            }
        };
    }

    serde_json::from_value(value).map_err(ProviderError::structured)
}

/// Inner text of the first fenced code block, or the whole trimmed text when
/// no fence is present. The opening fence may carry a language tag.
pub fn code_block_or_text(content: &str) -> &str {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence =
        FENCE.get_or_init(|| Regex::new(r"(?s)```(?:\w*\n|\w*)(.*?)```").expect("fence pattern"));

    match fence.captures(content).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => content.trim(),
    }
}

/// Instruction appended as a synthetic user turn on backends without native
/// schema-constrained decoding
pub(crate) fn schema_prompt(schema: &Value) -> String {
    format!("Respond with a JSON value conforming to the following schema:\n```\n{schema}\n```")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn code_block_is_preferred_over_surrounding_text() {
        let content = "Here: ```json\n{\"a\":1}\n```";
        assert_eq!(code_block_or_text(content), "{\"a\":1}");
    }

    #[test]
    fn bare_text_is_trimmed() {
        assert_eq!(code_block_or_text("  {\"a\":1} \n"), "{\"a\":1}");
    }

    #[test]
    fn fence_without_language_tag() {
        let content = "```\n[1, 2, 3]\n``` trailing prose";
        assert_eq!(code_block_or_text(content), "[1, 2, 3]");
    }

    #[test]
    fn first_of_multiple_blocks_wins() {
        let content = "```json\n1\n``` and ```json\n2\n```";
        assert_eq!(code_block_or_text(content), "1");
    }

    #[test]
    fn object_roots_pass_through() {
        let schema = json!({"type": "object", "properties": {}});
        assert!(schema_represents_object(&schema));
        let (sent, wrapped) = ensure_object_root(schema.clone());
        assert_eq!(sent, schema);
        assert!(!wrapped);
    }

    #[test]
    fn scalar_roots_are_wrapped() {
        let schema = json!({"type": "integer"});
        let (sent, wrapped) = ensure_object_root(schema);
        assert!(wrapped);
        assert_eq!(sent["type"], "object");
        assert_eq!(sent["properties"]["data"]["type"], "integer");
        assert_eq!(sent["required"], json!(["data"]));
        assert_eq!(sent["additionalProperties"], json!(false));
    }

    #[test]
    fn wrapped_scalar_round_trips() {
        // encode, wrap, simulate the backend reply, unwrap
        let (_, wrapped) = ensure_object_root(json!({"type": "integer"}));
        assert!(wrapped);
        let reply = r#"{"data": 42}"#;
        let value: i64 = parse_reply(reply, wrapped).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn wrapped_array_round_trips() {
        let (_, wrapped) = ensure_object_root(json!({"type": "array", "items": {"type": "string"}}));
        assert!(wrapped);
        let reply = "```json\n{\"data\": [\"x\", \"y\"]}\n```";
        let value: Vec<String> = parse_reply(reply, wrapped).unwrap();
        assert_eq!(value, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn unwrapped_object_deserializes_directly() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Point {
            x: i32,
            y: i32,
        }

        let reply = "```\n{\"x\": 1, \"y\": 2}\n```";
        let value: Point = parse_reply(reply, false).unwrap();
        assert_eq!(value, Point { x: 1, y: 2 });
    }

    #[test]
    fn missing_data_property_is_terminal() {
        let err = parse_reply::<i64>(r#"{"value": 42}"#, true).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::StructuredOutputDeserialization(_)
        ));
    }

    #[test]
    fn malformed_json_is_terminal() {
        let err = parse_reply::<i64>("not json at all", false).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::StructuredOutputDeserialization(_)
        ));
    }

    #[test]
    fn schema_prompt_embeds_schema_verbatim() {
        let schema = json!({"type": "integer"});
        let prompt = schema_prompt(&schema);
        assert!(prompt.contains("{\"type\":\"integer\"}"));
        assert!(prompt.starts_with("Respond with a JSON value"));
    }
}
