use async_trait::async_trait;
use futures::stream;
use std::sync::Arc;
use std::sync::Mutex;

use crate::models::message::{Choice, Message};
use crate::models::tool::ToolCall;
use crate::providers::base::{
    ChatRequestSpec, CompletionResult, Provider, ServiceResponse, Usage,
};
use crate::providers::errors::ProviderError;

/// A mock provider that returns pre-configured responses for testing
pub struct MockProvider {
    responses: Arc<Mutex<Vec<ServiceResponse<CompletionResult>>>>,
    requests: Arc<Mutex<Vec<ChatRequestSpec>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<ServiceResponse<CompletionResult>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<ChatRequestSpec> {
        self.requests.lock().unwrap().clone()
    }

    pub fn text(text: &str) -> ServiceResponse<CompletionResult> {
        let choice = Choice::new(Message::assistant().with_text(text));
        ServiceResponse::success(CompletionResult::choice(
            choice,
            Some(Usage::default()),
            None,
        ))
    }

    pub fn tool_call(name: &str, arguments: &str) -> ServiceResponse<CompletionResult> {
        let message = Message::assistant().with_tool_call(ToolCall::new("call_1", name, arguments));
        ServiceResponse::success(CompletionResult::choice(Choice::new(message), None, None))
    }

    pub fn stream(chunks: &[&str]) -> ServiceResponse<CompletionResult> {
        let items: Vec<Result<String, ProviderError>> =
            chunks.iter().map(|c| Ok(c.to_string())).collect();
        ServiceResponse::success(CompletionResult::stream(Box::pin(stream::iter(items))))
    }

    pub fn failure(error: ProviderError) -> ServiceResponse<CompletionResult> {
        ServiceResponse::failure(error)
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn create_chat(&self, spec: ChatRequestSpec) -> ServiceResponse<CompletionResult> {
        self.requests.lock().unwrap().push(spec);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Return empty response if no more pre-configured responses
            Self::text("")
        } else {
            responses.remove(0)
        }
    }
}
