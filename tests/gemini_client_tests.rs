// GeminiClient tests against a mocked generateContent endpoint
// Author: kelexine (https://github.com/kelexine)

use gemini_gateway::config::GeminiConfig;
use gemini_gateway::error::GatewayError;
use gemini_gateway::gemini::{GeminiClient, GenerativeModel};
use gemini_gateway::models::gemini::Part;
use mockito::Matcher;
use serde_json::json;

const PATH: &str = "/models/gemini-2.5-flash:generateContent";

fn client_for(server: &mockito::ServerGuard) -> GeminiClient {
    let config = GeminiConfig {
        api_base_url: server.url(),
        api_key: "test-key".to_string(),
        ..GeminiConfig::default()
    };
    GeminiClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_generate_content_sends_parts_and_returns_text() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", PATH)
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::Json(json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": "Describe" },
                    { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } }
                ]
            }]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "A greeting" }] },
                    "finishReason": "STOP"
                }],
                "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 2, "totalTokenCount": 12 }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let output = client
        .generate_content(vec![
            Part::text("Describe"),
            Part::inline_data("image/png", "aGVsbG8="),
        ])
        .await
        .unwrap();

    assert_eq!(output.text, "A greeting");
    assert_eq!(output.usage.unwrap().total_token_count, Some(12));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_provider_error_carries_message() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .generate_content(vec![Part::text("hi")])
        .await
        .unwrap_err();

    match err {
        GatewayError::GeminiApi(msg) => {
            assert!(msg.contains("400"));
            assert!(msg.contains("API key not valid"));
        }
        other => panic!("expected GeminiApi error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_blocked_prompt_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .generate_content(vec![Part::text("something unsafe")])
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Blocked(_)));
}

#[tokio::test]
async fn test_malformed_response_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", PATH)
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let client = client_for(&server);
    let result = client.generate_content(vec![Part::text("hi")]).await;

    assert!(matches!(result, Err(GatewayError::GeminiApi(_))));
}

#[tokio::test]
async fn test_unreachable_upstream_is_an_error() {
    let config = GeminiConfig {
        // Port 9 (discard) is not expected to be listening
        api_base_url: "http://127.0.0.1:9".to_string(),
        api_key: "test-key".to_string(),
        timeout_seconds: Some(5),
        ..GeminiConfig::default()
    };
    let client = GeminiClient::new(&config).unwrap();

    let result = client.generate_content(vec![Part::text("hi")]).await;
    assert!(matches!(result, Err(GatewayError::GeminiApi(_))));
}

#[test]
fn test_model_name() {
    let config = GeminiConfig {
        api_key: "test-key".to_string(),
        model: "gemini-2.5-pro".to_string(),
        ..GeminiConfig::default()
    };
    let client = GeminiClient::new(&config).unwrap();
    assert_eq!(client.model_name(), "gemini-2.5-pro");
}
