#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::json;
use supportdesk_agent::{
    CompletionBackend, CompletionClient, GeminiBackend, LlmProvider, ModelConfig, OpenAiBackend,
    RetryPolicy, SupportAgent,
};
use supportdesk_core::SupportError;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gemini_config(server: &MockServer) -> ModelConfig {
    ModelConfig {
        provider: LlmProvider::Gemini,
        model_id: "gemini-2.5-flash".into(),
        api_key: "test-key".into(),
        api_base_url: Some(server.uri()),
        retry_policy: Some(RetryPolicy {
            max_retries: 2,
            backoff_base_ms: 1,
            backoff_max_ms: 5,
        }),
        ..ModelConfig::default()
    }
}

fn gemini_text(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn test_gemini_generate_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "User: hello" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text("Hi there!")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = GeminiBackend::new(gemini_config(&server));
    assert_eq!(backend.generate("User: hello").await.unwrap(), "Hi there!");
}

#[tokio::test]
async fn test_gemini_error_status_becomes_completion_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": { "message": "bad" } })),
        )
        .mount(&server)
        .await;

    let err = GeminiBackend::new(gemini_config(&server))
        .generate("hi")
        .await
        .unwrap_err();
    match err {
        SupportError::Completion(msg) => {
            assert!(msg.contains("Gemini API error 400"), "got: {msg}");
        }
        other => panic!("expected Completion, got {other:?}"),
    }
}

#[tokio::test]
async fn test_openai_chat_completions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "messages": [{ "role": "user", "content": "ping" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "pong" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OpenAiBackend::new(ModelConfig {
        provider: LlmProvider::OpenAi,
        model_id: "gpt-4o-mini".into(),
        api_key: "sk-test".into(),
        api_base_url: Some(server.uri()),
        ..ModelConfig::default()
    });
    assert_eq!(backend.generate("ping").await.unwrap(), "pong");
}

#[tokio::test]
async fn test_client_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text("recovered")))
        .expect(1)
        .mount(&server)
        .await;

    let client = CompletionClient::new(gemini_config(&server));
    assert_eq!(client.generate("hi").await.unwrap(), "recovered");
}

#[tokio::test]
async fn test_client_falls_back_to_secondary_model() {
    let primary = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&primary)
        .await;

    let secondary = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "from groq" } }]
        })))
        .expect(1)
        .mount(&secondary)
        .await;

    let mut config = gemini_config(&primary);
    config.fallback_models = vec![ModelConfig {
        provider: LlmProvider::Groq,
        model_id: "llama-3.1-8b-instant".into(),
        api_base_url: Some(secondary.uri()),
        ..ModelConfig::default()
    }];

    let client = CompletionClient::new(config);
    assert_eq!(client.generate("hi").await.unwrap(), "from groq");
}

#[tokio::test]
async fn test_agent_over_gemini_escalates_and_degrades() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_text("I'm not sure about that, let me escalate.")),
        )
        .mount(&server)
        .await;

    let agent = SupportAgent::new(CompletionClient::new(gemini_config(&server)));
    let reply = agent.generate_response("What is your CEO's phone number?", &[]).await;
    assert!(reply.escalated);
    assert_eq!(
        reply.text,
        "Your query has been escalated to a human agent for assistance."
    );

    server.reset().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let reply = agent.generate_response("Hello?", &[]).await;
    assert!(!reply.escalated);
    assert_eq!(
        reply.text,
        "Sorry, I'm having trouble processing your request at the moment."
    );
}
