//! HTTP-level tests for the OpenAI-compatible backend against a mock server.

#![cfg(feature = "openai")]

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use yojana_core::{EmbeddingBackend, HousingType, VisionBackend};
use yojana_inference::openai::{OpenAIBackend, OpenAIConfig};

fn backend_for(server: &MockServer) -> OpenAIBackend {
    let config = OpenAIConfig {
        base_url: server.uri(),
        api_key: Some("sk-test".to_string()),
        embed_model: "test-embed".to_string(),
        vision_model: "test-vision".to_string(),
        embed_dimension: 3,
        timeout_seconds: 10,
    };
    OpenAIBackend::new(config).expect("Failed to create backend")
}

#[tokio::test]
async fn test_embedding_request_and_ordering() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "test-embed",
            "input": ["first", "second"],
            "encoding_format": "float"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"embedding": [0.0, 1.0, 0.0], "index": 1},
                {"embedding": [1.0, 0.0, 0.0], "index": 0}
            ],
            "model": "test-embed",
            "usage": {"prompt_tokens": 2, "total_tokens": 2}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let vectors = backend
        .embed_texts(&["first".to_string(), "second".to_string()])
        .await
        .expect("embedding should succeed");

    assert_eq!(vectors, vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]);
}

#[tokio::test]
async fn test_embedding_error_carries_body_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limit reached"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let err = backend.embed_query("housing support").await.unwrap_err();

    assert_eq!(err.kind(), "external_service_error");
    assert!(err.to_string().contains("rate limit reached"));
}

#[tokio::test]
async fn test_vision_request_shape_and_consolidated_reply() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({"model": "test-vision"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output_text": "```json\n{\"housing_type\": \"kutcha\", \"assets\": [\"goat\"], \"demographics\": [], \"notes\": \"thatch\"}\n```"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let signals = backend
        .extract_signals("data:image/png;base64,AAAA", r#"{"state":"Bihar"}"#)
        .await
        .expect("vision should succeed");

    assert_eq!(signals.housing_type, HousingType::Kutcha);
    assert_eq!(signals.assets, vec!["goat"]);

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let content = &body["input"][0]["content"];
    assert_eq!(body["input"][0]["role"], "user");
    assert_eq!(content[0]["type"], "input_text");
    assert!(content[0]["text"]
        .as_str()
        .unwrap()
        .ends_with(r#"Hints: {"state":"Bihar"}"#));
    assert_eq!(content[1]["type"], "input_image");
    assert_eq!(content[1]["image_url"], "data:image/jpeg;base64,AAAA");
}

#[tokio::test]
async fn test_vision_segmented_reply() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": [{
                "content": [
                    {"type": "output_text", "text": "{\"housing_type\": \"pucca\", "},
                    {"type": "output_text", "text": "\"assets\": [\"tractor\"]}"}
                ]
            }]
        })))
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let signals = backend.extract_signals("AAAA", "{}").await.unwrap();

    assert_eq!(signals.housing_type, HousingType::Pucca);
    assert_eq!(signals.assets, vec!["tractor"]);
    assert!(signals.demographics.is_empty());
}

#[tokio::test]
async fn test_vision_without_text_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output": []})))
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let err = backend.extract_signals("AAAA", "{}").await.unwrap_err();

    assert_eq!(err.kind(), "parse_error");
}

#[tokio::test]
async fn test_vision_server_error_is_external() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let err = backend.extract_signals("AAAA", "{}").await.unwrap_err();

    assert_eq!(err.kind(), "external_service_error");
    assert!(err.to_string().contains("upstream down"));
}
