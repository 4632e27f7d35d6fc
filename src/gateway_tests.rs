//! End-to-end scenarios against a mock completion service.

use crate::client::{FileInput, GatewayClient, GatewayEvents};
use crate::config::{Capability, CapabilityConfig, GatewayConfig};
use crate::conversation::{APOLOGY, ConversationStore};
use crate::errors::GatewayError;
use crate::types::AnalysisSource;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> GatewayConfig {
    let capability = |key: &str| CapabilityConfig::new(server.uri(), Some(key.to_string()));
    GatewayConfig::new(
        capability("chat-key"),
        capability("assistant-key"),
        capability("nutrition-key"),
    )
}

async fn mock_answer(server: &MockServer, answer: &str) {
    Mock::given(method("POST"))
        .and(path("/chat-messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": answer })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_send_completion_resolves_once_with_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat-messages"))
        .and(header("Authorization", "Bearer chat-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "6g" })))
        .mount(&server)
        .await;

    let client = GatewayClient::new(config_for(&server));
    let mut observed = Vec::new();
    let events = GatewayEvents::new().on_message(|text| observed.push(text.to_string()));

    let answer = client
        .send_completion(Capability::Chat, "How much protein in an egg?", "", events)
        .await
        .unwrap();

    assert_eq!(answer, "6g");
    assert_eq!(observed, vec!["6g".to_string()]);
}

#[tokio::test]
async fn test_conversation_send_message_records_answer() {
    let server = MockServer::start().await;
    mock_answer(&server, "6g").await;

    let client = GatewayClient::new(config_for(&server));
    let mut store = ConversationStore::new();
    store
        .send_message(&client, Capability::Chat, "How much protein in an egg?")
        .await
        .unwrap();

    let last = store.last_message().unwrap();
    assert_eq!(last.content, "6g");
    assert!(!last.is_streaming);
    assert_eq!(store.message_count(), 2);
}

#[tokio::test]
async fn test_remote_error_surfaces_status_and_message_and_apology() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat-messages"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "server error" })),
        )
        .mount(&server)
        .await;

    let client = GatewayClient::new(config_for(&server));
    let mut store = ConversationStore::new();
    let err = store
        .send_message(&client, Capability::Chat, "How much protein in an egg?")
        .await
        .unwrap_err();

    match err {
        GatewayError::Remote { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "server error");
        }
        other => panic!("expected Remote, got {other:?}"),
    }
    let last = store.last_message().unwrap();
    assert_eq!(last.content, APOLOGY);
    assert!(!last.is_streaming);
}

#[tokio::test]
async fn test_missing_answer_field_is_protocol() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat-messages"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "conversation_id": "abc" })),
        )
        .mount(&server)
        .await;

    let client = GatewayClient::new(config_for(&server));
    let err = client
        .send_completion(Capability::Chat, "hello", "", GatewayEvents::new())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Protocol(_)));
}

#[tokio::test]
async fn test_disallowed_mime_fails_with_zero_requests() {
    let server = MockServer::start().await;
    let client = GatewayClient::new(config_for(&server));

    let file = FileInput::new("notes.txt", "text/plain", vec![1, 2, 3]);
    let err = client
        .upload_and_analyze(file, GatewayEvents::new())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_oversized_file_fails_with_zero_requests() {
    let server = MockServer::start().await;
    let client = GatewayClient::new(config_for(&server));

    let file = FileInput::new(
        "huge.jpg",
        "image/jpeg",
        vec![0u8; crate::client::MAX_FILE_SIZE + 1],
    );
    let err = client
        .upload_and_analyze(file, GatewayEvents::new())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_disabled_capability_fails_before_the_network() {
    let server = MockServer::start().await;
    let config = GatewayConfig::new(
        CapabilityConfig::new(server.uri(), None),
        CapabilityConfig::disabled(),
        CapabilityConfig::disabled(),
    );
    let client = GatewayClient::new(config);

    let err = client
        .send_completion(Capability::Chat, "hello", "", GatewayEvents::new())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Configuration(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_and_analyze_two_phase_flow() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/files/upload"))
        .and(header("Authorization", "Bearer nutrition-key"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "file-123" })))
        .mount(&server)
        .await;
    mock_answer(&server, "Roughly 6g of protein per egg.").await;

    let client = GatewayClient::new(config_for(&server));
    let mut progress = Vec::new();
    let events = GatewayEvents::new().on_progress(|pct| progress.push(pct));

    let file = FileInput::new("egg.jpg", "image/jpeg", vec![0u8; 2048]);
    let result = client.upload_and_analyze(file, events).await.unwrap();

    assert_eq!(result.analysis, "Roughly 6g of protein per egg.");
    match &result.source {
        AnalysisSource::File {
            file_id,
            file_name,
            file_size,
        } => {
            assert_eq!(file_id, "file-123");
            assert_eq!(file_name, "egg.jpg");
            assert_eq!(*file_size, 2048);
        }
        other => panic!("expected File source, got {other:?}"),
    }

    // progress fired while the call was in flight: non-decreasing,
    // bounded, and fully delivered before the terminal outcome
    assert!(!progress.is_empty());
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(progress.last(), Some(&100));

    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_upload_phase_remote_error_stops_the_flow() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/files/upload"))
        .respond_with(ResponseTemplate::new(413).set_body_json(json!({ "error": "too large" })))
        .mount(&server)
        .await;

    let client = GatewayClient::new(config_for(&server));
    let file = FileInput::new("egg.jpg", "image/jpeg", vec![0u8; 64]);
    let err = client
        .upload_and_analyze(file, GatewayEvents::new())
        .await
        .unwrap_err();

    match err {
        GatewayError::Remote { status, message } => {
            assert_eq!(status, 413);
            assert_eq!(message, "too large");
        }
        other => panic!("expected Remote, got {other:?}"),
    }
    // the completion phase never ran
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_analyze_text_wraps_input_in_query_template() {
    let server = MockServer::start().await;
    mock_answer(&server, "High in protein.").await;

    let client = GatewayClient::new(config_for(&server));
    let result = client.analyze_text("two boiled eggs").await.unwrap();

    assert_eq!(result.analysis, "High in protein.");
    match &result.source {
        AnalysisSource::Text { input } => assert_eq!(input, "two boiled eggs"),
        other => panic!("expected Text source, got {other:?}"),
    }

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(
        body["query"]
            .as_str()
            .unwrap()
            .contains("two boiled eggs")
    );
    assert_eq!(body["response_mode"], "blocking");
}

#[tokio::test]
async fn test_network_error_when_nothing_listens() {
    // a port nothing listens on: connection refused, no response received
    let config = GatewayConfig::new(
        CapabilityConfig::new("http://127.0.0.1:9", Some("chat-key".to_string())),
        CapabilityConfig::disabled(),
        CapabilityConfig::disabled(),
    );
    let client = GatewayClient::new(config);

    let err = client
        .send_completion(Capability::Chat, "hello", "", GatewayEvents::new())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Network(_)));
}
