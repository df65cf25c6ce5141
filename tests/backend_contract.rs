//! Contract tests for the advisory backend client.
//!
//! A wiremock server stands in for the collaborator; these tests pin the
//! request shapes the client emits and the failure classification of bad
//! replies.

use krishi_chat::api::{BackendClient, UploadFile};
use krishi_chat::config::BackendConfig;
use krishi_chat::{AudioClip, ClientError};
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> BackendClient {
    BackendClient::new(&BackendConfig {
        base_url: server.uri(),
        user_id: "tester".to_owned(),
        timeout_secs: 2,
    })
    .unwrap_or_else(|e| panic!("client build failed: {e}"))
}

fn clip() -> AudioClip {
    AudioClip::from_samples(&[0.0; 64], 16_000).unwrap_or_else(|e| panic!("clip: {e}"))
}

#[tokio::test]
async fn chat_sends_user_id_and_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(serde_json::json!({
            "user_id": "tester",
            "message": "irrigation advice"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": "Irrigate at dawn",
            "chat_history": [{"type": "human", "content": "irrigation advice"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server).chat("irrigation advice").await;
    let reply = reply.unwrap_or_else(|e| panic!("expected Ok, got {e}"));
    assert_eq!(reply.response.as_deref(), Some("Irrigate at dawn"));
}

#[tokio::test]
async fn chat_maps_server_error_to_transport() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .chat("hello")
        .await
        .expect_err("expected Err");
    match err {
        ClientError::Transport(msg) => {
            assert!(msg.contains("500"), "message was: {msg}");
            assert!(msg.contains("boom"), "message was: {msg}");
        }
        other => panic!("expected Transport, got {other}"),
    }
}

#[tokio::test]
async fn chat_maps_malformed_body_to_decode() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .chat("hello")
        .await
        .expect_err("expected Err");
    assert!(matches!(err, ClientError::Decode(_)), "got {err}");
}

#[tokio::test]
async fn chat_classifies_unreachable_backend() {
    let client = BackendClient::new(&BackendConfig {
        base_url: "http://127.0.0.1:59998".to_owned(),
        user_id: "tester".to_owned(),
        timeout_secs: 1,
    })
    .unwrap_or_else(|e| panic!("client build failed: {e}"));

    let err = client.chat("hello").await.expect_err("expected Err");
    assert!(matches!(err, ClientError::Transport(_)), "got {err}");
}

#[tokio::test]
async fn chat_times_out_against_slow_backend() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"response": "late"}))
                .set_delay(std::time::Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .chat("hello")
        .await
        .expect_err("expected Err");
    match err {
        ClientError::Transport(msg) => assert!(msg.contains("timed out"), "message was: {msg}"),
        other => panic!("expected Transport, got {other}"),
    }
}

#[tokio::test]
async fn voice_chat_posts_multipart_clip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/voice-chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "original_text": "price of onions",
            "chatbot_response_local": "Current onion price is ₹25/kg",
            "audio_file": "audio/out1.wav"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client_for(&server).voice_chat(clip()).await;
    let reply = reply.unwrap_or_else(|e| panic!("expected Ok, got {e}"));
    assert_eq!(reply.original_text.as_deref(), Some("price of onions"));
    assert_eq!(reply.audio_file.as_deref(), Some("audio/out1.wav"));

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    let content_type = requests[0]
        .headers
        .get("content-type")
        .map(|v| v.to_str().unwrap_or_default().to_owned())
        .unwrap_or_default();
    assert!(
        content_type.starts_with("multipart/form-data"),
        "content-type was: {content_type}"
    );
}

#[tokio::test]
async fn multimodal_chat_carries_message_and_file_parts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dynamic-chat"))
        .and(body_string_contains("what is wrong with this leaf"))
        .and(body_string_contains("leaf.png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": "Looks like leaf blight"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let file = UploadFile {
        file_name: "leaf.png".to_owned(),
        mime: "image/png".to_owned(),
        data: b"fake-image-data".to_vec(),
    };
    let reply = client_for(&server)
        .multimodal_chat(Some("what is wrong with this leaf"), Some(file))
        .await;
    let reply = reply.unwrap_or_else(|e| panic!("expected Ok, got {e}"));
    assert_eq!(reply.response.as_deref(), Some("Looks like leaf blight"));
}

#[tokio::test]
async fn multimodal_chat_without_file_still_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dynamic-chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": "ok"
        })))
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .multimodal_chat(Some("hello"), None)
        .await;
    assert!(reply.is_ok());
}
