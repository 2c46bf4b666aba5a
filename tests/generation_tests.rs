//! HTTP-level tests exercising the real provider implementations against a
//! local mock server, via the catalog's endpoint overrides.

use std::time::Duration;

use futures::StreamExt;
use llmrelay::{LlmError, LlmManager, ModelCatalog, ModelConfig, ProviderType};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn openai_completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 0,
        "model": "mock-1",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 4, "completion_tokens": 8, "total_tokens": 12}
    })
}

// ============================================================================
// Generation Tests
// ============================================================================

#[tokio::test]
async fn test_openai_generate_returns_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_completion_body("Hello there")))
        .mount(&server)
        .await;

    let catalog = ModelCatalog::new().with_model(
        ProviderType::OpenAI,
        ModelConfig::new("mock-1")
            .with_api_key("test-key")
            .with_endpoint(format!("{}/v1/chat/completions", server.uri())),
    );

    let manager = LlmManager::new(ProviderType::OpenAI, catalog).unwrap();
    let response = manager.generate_response("Hi").await.unwrap();
    assert_eq!(response, "Hello there");
}

#[tokio::test]
async fn test_anthropic_generate_returns_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude-mock",
            "content": [{"type": "text", "text": "Claude says hi"}],
            "usage": {"input_tokens": 3, "output_tokens": 5}
        })))
        .mount(&server)
        .await;

    let catalog = ModelCatalog::new().with_model(
        ProviderType::Anthropic,
        ModelConfig::new("claude-mock")
            .with_api_key("test-key")
            .with_endpoint(format!("{}/v1/messages", server.uri())),
    );

    let manager = LlmManager::new(ProviderType::Anthropic, catalog).unwrap();
    let response = manager.generate_response("Hi").await.unwrap();
    assert_eq!(response, "Claude says hi");
}

#[tokio::test]
async fn test_api_error_propagates_to_caller() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let catalog = ModelCatalog::new().with_model(
        ProviderType::OpenAI,
        ModelConfig::new("mock-1")
            .with_api_key("test-key")
            .with_endpoint(format!("{}/v1/chat/completions", server.uri())),
    );

    let manager = LlmManager::new(ProviderType::OpenAI, catalog).unwrap();
    let result = manager.generate_response("Hi").await;

    match result {
        Err(LlmError::ApiError(msg)) => assert!(msg.contains("OpenAI API error")),
        other => panic!("expected ApiError, got {:?}", other.map(|_| ())),
    }
}

// ============================================================================
// Streaming Tests
// ============================================================================

#[tokio::test]
async fn test_openai_stream_yields_chunks_in_order() {
    let sse_body = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\" world\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}],\"usage\":{\"prompt_tokens\":1,\"completion_tokens\":2,\"total_tokens\":3}}\n\n",
        "data: [DONE]\n\n",
    );

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body, "text/event-stream"))
        .mount(&server)
        .await;

    let catalog = ModelCatalog::new().with_model(
        ProviderType::OpenAI,
        ModelConfig::new("mock-1")
            .with_api_key("test-key")
            .with_endpoint(format!("{}/v1/chat/completions", server.uri())),
    );

    let manager = LlmManager::new(ProviderType::OpenAI, catalog).unwrap();
    let stream = manager.stream_response("Hi").await.unwrap();
    let chunks: Vec<_> = stream
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .map(|c| c.unwrap())
        .collect();

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].content, "Hello");
    assert_eq!(chunks[1].content, " world");
    assert!(chunks[2].is_final);
    assert_eq!(chunks[2].usage.as_ref().unwrap().total_tokens, 3);

    let full: String = chunks.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(full, "Hello world");
}

#[tokio::test]
async fn test_anthropic_stream_yields_text_deltas() {
    let sse_body = concat!(
        "event: message_start\n",
        "data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\",\"model\":\"claude-mock\"}}\n\n",
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Streamed\"}}\n\n",
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\" reply\"}}\n\n",
        "event: message_delta\n",
        "data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\"},\"usage\":{\"output_tokens\":2}}\n\n",
        "event: message_stop\n",
        "data: {\"type\":\"message_stop\"}\n\n",
    );

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body, "text/event-stream"))
        .mount(&server)
        .await;

    let catalog = ModelCatalog::new().with_model(
        ProviderType::Anthropic,
        ModelConfig::new("claude-mock")
            .with_api_key("test-key")
            .with_endpoint(format!("{}/v1/messages", server.uri())),
    );

    let manager = LlmManager::new(ProviderType::Anthropic, catalog).unwrap();
    let stream = manager.stream_response("Hi").await.unwrap();
    let chunks: Vec<_> = stream
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .map(|c| c.unwrap())
        .collect();

    // message_start (model), two text deltas, final message_delta
    assert_eq!(chunks.len(), 4);
    assert_eq!(chunks[0].model.as_deref(), Some("claude-mock"));
    assert_eq!(chunks[1].content, "Streamed");
    assert_eq!(chunks[2].content, " reply");
    assert!(chunks[3].is_final);
}

// ============================================================================
// Comparison Tests
// ============================================================================

#[tokio::test]
async fn test_compare_providers_ranks_by_latency() {
    let server = MockServer::start().await;

    // OpenAI answers immediately, Mistral is delayed
    Mock::given(method("POST"))
        .and(path("/openai"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_completion_body("fast answer")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mistral"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "id": "1",
                    "object": "chat.completion",
                    "created": 0,
                    "model": "mistral-mock",
                    "choices": [{
                        "index": 0,
                        "message": {"role": "assistant", "content": "slow answer"},
                        "finish_reason": "stop"
                    }],
                    "usage": {"prompt_tokens": 1, "completion_tokens": 2, "total_tokens": 3}
                }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let catalog = ModelCatalog::new()
        .with_model(
            ProviderType::OpenAI,
            ModelConfig::new("mock-1")
                .with_api_key("k1")
                .with_endpoint(format!("{}/openai", server.uri())),
        )
        .with_model(
            ProviderType::Mistral,
            ModelConfig::new("mistral-mock")
                .with_api_key("k2")
                .with_endpoint(format!("{}/mistral", server.uri())),
        );

    let mut manager = LlmManager::new(ProviderType::OpenAI, catalog).unwrap();
    let comparison = manager
        .compare_providers(&[ProviderType::OpenAI, ProviderType::Mistral], &["Hi"])
        .await
        .unwrap();

    assert_eq!(comparison.providers.len(), 2);
    assert!(comparison.providers.contains_key("openai"));
    assert!(comparison.providers.contains_key("mistral"));
    assert_eq!(comparison.providers["openai"].tests.len(), 1);
    assert_eq!(comparison.providers["mistral"].tests[0].response, "slow answer");

    assert_eq!(comparison.summary.fastest_provider.as_deref(), Some("openai"));

    // The manager is left on the last compared provider
    assert_eq!(manager.current_provider(), ProviderType::Mistral);
}
