use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ProviderError;
use crate::models::message::{Choice, PromptFragment};
use crate::models::tool::Tool;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: Option<i32>,
    pub completion_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        prompt_tokens: Option<i32>,
        completion_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }
}

/// Forward-only stream of text deltas; it must be drained to get the full reply
pub type ChatStream = BoxStream<'static, Result<String, ProviderError>>;

/// What the provider produced for a chat request
pub enum CompletionPayload {
    Choice(Choice),
    Stream(ChatStream),
}

impl fmt::Debug for CompletionPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionPayload::Choice(choice) => f.debug_tuple("Choice").field(choice).finish(),
            CompletionPayload::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

#[derive(Debug)]
pub struct CompletionResult {
    pub completion: CompletionPayload,
    /// Token usage, only known for non-streamed completions
    pub usage: Option<Usage>,
    /// Total cost converted to the display currency, only for non-streamed completions
    pub estimated_cost: Option<f64>,
}

impl CompletionResult {
    pub fn stream(stream: ChatStream) -> Self {
        Self {
            completion: CompletionPayload::Stream(stream),
            usage: None,
            estimated_cost: None,
        }
    }

    pub fn choice(choice: Choice, usage: Option<Usage>, estimated_cost: Option<f64>) -> Self {
        Self {
            completion: CompletionPayload::Choice(choice),
            usage,
            estimated_cost,
        }
    }
}

/// Uniform envelope returned by every provider call
///
/// Callers branch on `failed` (or the payload) instead of handling provider
/// errors themselves.
#[derive(Debug)]
pub struct ServiceResponse<T> {
    pub failed: bool,
    pub message: String,
    pub payload: Result<T, ProviderError>,
}

impl<T> ServiceResponse<T> {
    pub fn success(payload: T) -> Self {
        Self {
            failed: false,
            message: "Success!".to_string(),
            payload: Ok(payload),
        }
    }

    pub fn failure(error: ProviderError) -> Self {
        Self {
            failed: true,
            message: error.message(),
            payload: Err(error),
        }
    }

    pub fn into_result(self) -> Result<T, ProviderError> {
        self.payload
    }
}

/// A fully formed chat request for the completion provider
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequestSpec {
    pub messages: Vec<PromptFragment>,
    pub model: String,
    pub user: Option<String>,
    pub stream: bool,
    pub tools: Vec<Tool>,
    /// Name of a function the model is forced to call
    pub tool_choice: Option<String>,
}

impl ChatRequestSpec {
    pub fn new<S: Into<String>>(model: S, messages: Vec<PromptFragment>) -> Self {
        Self {
            messages,
            model: model.into(),
            user: None,
            stream: false,
            tools: Vec::new(),
            tool_choice: None,
        }
    }

    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.user = user;
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    /// Force the model to call the named function instead of answering in text
    pub fn with_forced_tool<S: Into<String>>(mut self, name: S) -> Self {
        self.tool_choice = Some(name.into());
        self
    }
}

/// Base trait for chat completion providers
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send the request and normalize the outcome; provider errors never escape
    async fn create_chat(&self, spec: ChatRequestSpec) -> ServiceResponse<CompletionResult>;
}
