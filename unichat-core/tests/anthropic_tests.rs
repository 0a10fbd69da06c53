//! Integration tests for the Anthropic variant, driven against a mock HTTP
//! server

use futures::StreamExt;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use unichat_core::config::ProviderSettings;
use unichat_core::{
    get_provider_with, ProviderError, ProviderExt, ProviderInit, Settings,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(url: String) -> Settings {
    let mut settings = Settings::default();
    settings
        .provider
        .insert("Anthropic".to_string(), ProviderSettings { url: Some(url) });
    settings
}

fn sse_body(fragments: &[&str]) -> String {
    let mut body = String::new();
    body.push_str("event: message_start\ndata: {\"type\":\"message_start\"}\n\n");
    for (i, fragment) in fragments.iter().enumerate() {
        if i == 0 {
            body.push_str(
                "event: content_block_start\ndata: {\"type\":\"content_block_start\"}\n\n",
            );
        }
        let delta = json!({
            "type": "content_block_delta",
            "index": 0,
            "delta": {"type": "text_delta", "text": fragment}
        });
        body.push_str(&format!("event: content_block_delta\ndata: {delta}\n\n"));
    }
    body.push_str("event: content_block_stop\ndata: {\"type\":\"content_block_stop\"}\n\n");
    body.push_str("event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n");
    body
}

async fn mock_stream(server: &MockServer, fragments: &[&str]) {
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(sse_body(fragments), "text/event-stream"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn text_deltas_become_ordered_fragments() {
    let server = MockServer::start().await;
    mock_stream(&server, &["Once", " upon", " a time"]).await;

    let provider = get_provider_with(
        "Anthropic",
        ProviderInit::new("sk-ant-test").with_settings(settings_for(server.uri())),
    )
    .unwrap();
    let mut session = provider.create_chat_session("claude-sonnet-4-5");
    session.add_user_message("tell a story");

    let mut stream = session
        .stream_response(CancellationToken::new())
        .await
        .unwrap();
    let mut fragments = Vec::new();
    while let Some(fragment) = stream.next().await {
        fragments.push(fragment.unwrap().into_content());
    }

    assert_eq!(fragments, vec!["Once", " upon", " a time"]);
}

#[tokio::test]
async fn earliest_system_message_feeds_the_system_channel() {
    let server = MockServer::start().await;
    mock_stream(&server, &["ok"]).await;

    let provider = get_provider_with(
        "Anthropic",
        ProviderInit::new("sk-ant-test").with_settings(settings_for(server.uri())),
    )
    .unwrap();
    let mut session = provider.create_chat_session("claude-sonnet-4-5");
    session.add_system_prompt("you are a pirate");
    session.add_user_message("hello");
    session.add_assistant_message("ahoy");
    session.add_system_prompt("you are a baker");
    session.add_user_message("bye");

    session.get_response().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["system"], json!("you are a pirate"));

    let messages = body["messages"].as_array().unwrap();
    assert!(messages
        .iter()
        .all(|m| m["role"] == json!("user") || m["role"] == json!("assistant")));
    assert_eq!(messages.len(), 3);
}

#[tokio::test]
async fn extracted_system_slot_shrinks_the_window() {
    let server = MockServer::start().await;
    mock_stream(&server, &["ok"]).await;

    let provider = get_provider_with(
        "Anthropic",
        ProviderInit::new("sk-ant-test").with_settings(settings_for(server.uri())),
    )
    .unwrap();
    let mut session = provider.create_chat_session("claude-sonnet-4-5");
    session.set_short_term_memory_length(3);
    session.add_system_prompt("sys");
    for i in 0..5 {
        session.add_user_message(format!("u{i}"));
        session.add_assistant_message(format!("a{i}"));
    }

    session.get_response().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let messages = body["messages"].as_array().unwrap();
    // min(N, W+1) minus one for the extracted system slot
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["content"][0]["text"], json!("a3"));
}

#[tokio::test]
async fn token_ceiling_and_thinking_budget_follow_the_model_family() {
    let server = MockServer::start().await;
    mock_stream(&server, &["ok"]).await;

    let provider = get_provider_with(
        "Anthropic",
        ProviderInit::new("sk-ant-test").with_settings(settings_for(server.uri())),
    )
    .unwrap();

    let mut session = provider.create_chat_session("claude-3-5-haiku-latest");
    session.set_max_output_tokens(20_000);
    session.add_user_message("hi");
    session.get_response().await.unwrap();

    let mut session = provider.create_chat_session("claude-3-7-sonnet-latest");
    session.add_user_message("hi");
    session.get_response().await.unwrap();

    let requests = server.received_requests().await.unwrap();

    let haiku_body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(haiku_body["max_tokens"], json!(4096));
    assert!(haiku_body.get("thinking").is_none());

    let sonnet_body: Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(sonnet_body["max_tokens"], json!(8192));
    assert_eq!(sonnet_body["thinking"]["type"], json!("enabled"));
    assert_eq!(sonnet_body["thinking"]["budget_tokens"], json!(1025));
    assert_eq!(sonnet_body["temperature"], json!(1.0));
}

#[tokio::test]
async fn stream_error_event_terminates_with_an_error() {
    let server = MockServer::start().await;
    let body = "event: message_start\ndata: {\"type\":\"message_start\"}\n\n\
                event: error\ndata: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"try later\"}}\n\n";
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let provider = get_provider_with(
        "Anthropic",
        ProviderInit::new("sk-ant-test").with_settings(settings_for(server.uri())),
    )
    .unwrap();
    let mut session = provider.create_chat_session("claude-sonnet-4-5");
    session.add_user_message("hi");

    let mut stream = session
        .stream_response(CancellationToken::new())
        .await
        .unwrap();
    let item = stream.next().await.unwrap();
    match item {
        Err(ProviderError::Stream(message)) => {
            assert!(message.contains("overloaded_error"));
            assert!(message.contains("try later"));
        }
        other => panic!("expected stream error, got {other:?}"),
    }
}

#[tokio::test]
async fn model_listing_maps_catalog_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("x-api-key", "sk-ant-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "claude-sonnet-4-5", "type": "model"},
                {"id": "claude-3-5-haiku-latest", "type": "model"}
            ],
            "has_more": false
        })))
        .mount(&server)
        .await;

    let provider = get_provider_with(
        "Anthropic",
        ProviderInit::new("sk-ant-test").with_settings(settings_for(server.uri())),
    )
    .unwrap();

    let models = provider.list_models().await.unwrap();
    let ids: Vec<_> = models.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["claude-sonnet-4-5", "claude-3-5-haiku-latest"]);
}
