use anyhow::Result;
use futures::StreamExt;
use parley::errors::ChatError;
use parley::models::request::{ChatRequest, UserContext};
use parley::providers::base::CompletionPayload;
use parley::providers::configs::OpenAiProviderConfig;
use parley::providers::openai::OpenAiProvider;
use parley::router::Router;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn router_for(server: &MockServer) -> Result<Router> {
    let config = OpenAiProviderConfig::new("test_api_key").with_host(server.uri());
    Ok(Router::new(Arc::new(OpenAiProvider::new(config)?)))
}

async fn mount_classification(server: &MockServer, category: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "tool_choice": {"type": "function", "function": {"name": "categorize_message"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-classify",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "categorize_message",
                            "arguments": format!("{{\"category\":\"{}\"}}", category)
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 120, "completion_tokens": 8, "total_tokens": 128}
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn user_request(message: &str) -> ChatRequest {
    ChatRequest::new(message).with_user(
        UserContext::new(42, "Rina")
            .with_language("id")
            .with_attribute("hobby", "hiking"),
    )
}

#[tokio::test]
async fn test_deep_conversation_goes_to_deep_model() -> Result<()> {
    let server = MockServer::start().await;
    mount_classification(&server, "deep_conversation").await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "o1-preview",
            "user": "42",
            "messages": [
                {"role": "user", "name": "profile"},
                {"role": "user", "name": "response-format"},
                {"role": "user", "name": "user-profile"},
                {"role": "user", "name": "new-message", "content": "New Message: Is free will real?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-answer",
            "choices": [{
                "message": {"role": "assistant", "content": "That depends on what you mean by free."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 300, "completion_tokens": 60, "total_tokens": 360}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let router = router_for(&server)?;
    let reply = router.chat(&user_request("Is free will real?")).await?;

    let CompletionPayload::Choice(choice) = reply else {
        panic!("Expected a choice");
    };
    assert_eq!(
        choice.message.text(),
        Some("That depends on what you mean by free.")
    );
    Ok(())
}

#[tokio::test]
async fn test_streamed_greeting() -> Result<()> {
    let server = MockServer::start().await;
    mount_classification(&server, "greetings").await;

    let body = [
        r#"data: {"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#,
        r#"data: {"choices":[{"index":0,"delta":{"content":"Halo "}}]}"#,
        r#"data: {"choices":[{"index":0,"delta":{"content":"Rina!"}}]}"#,
        "data: [DONE]",
    ]
    .join("\n\n");
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4o-mini", "stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let router = router_for(&server)?;
    let reply = router
        .chat(&user_request("Halo!").with_stream(true))
        .await?;

    let CompletionPayload::Stream(stream) = reply else {
        panic!("Expected a stream");
    };
    let text: Vec<String> = stream.map(|chunk| chunk.unwrap()).collect().await;
    assert_eq!(text.concat(), "Halo Rina!");
    Ok(())
}

#[tokio::test]
async fn test_upstream_error_after_classification() -> Result<()> {
    let server = MockServer::start().await;
    mount_classification(&server, "simple_conversation").await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("New Message: "))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let router = router_for(&server)?;
    let err = router
        .chat(&user_request("What should I cook tonight?"))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to get response from OpenAI: OpenAI API returned an Internal Server Error.!"
    );
    Ok(())
}

#[tokio::test]
async fn test_classification_rejected_by_upstream() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let router = router_for(&server)?;
    let err = router.chat(&user_request("Hi")).await.unwrap_err();
    assert_eq!(
        err,
        ChatError::Classification("OpenAI API returned an Authentication Error.".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_conversation_title() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Determine the title of this message: "))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {"role": "assistant", "content": "\"Planning a Weekend Hike\""},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 60, "completion_tokens": 6, "total_tokens": 66}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let router = router_for(&server)?;
    let title = router
        .define_conversation_title("Any trail suggestions near Bandung for Saturday?")
        .await?;
    assert_eq!(title, "Planning a Weekend Hike");
    Ok(())
}
