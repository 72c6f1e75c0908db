use serde::{Deserialize, Serialize};

use super::role::Role;
use super::tool::ToolCall;

/// One role-tagged unit of context in the prompt sent to the LLM
///
/// Fragments are sent in the order they were assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptFragment {
    pub role: Role,
    pub name: String,
    pub content: String,
}

impl PromptFragment {
    pub fn new<N: Into<String>, C: Into<String>>(role: Role, name: N, content: C) -> Self {
        Self {
            role,
            name: name.into(),
            content: content.into(),
        }
    }

    /// Create a system fragment
    pub fn system<N: Into<String>, C: Into<String>>(name: N, content: C) -> Self {
        Self::new(Role::System, name, content)
    }

    /// Create a user fragment
    pub fn user<N: Into<String>, C: Into<String>>(name: N, content: C) -> Self {
        Self::new(Role::User, name, content)
    }
}

/// A message returned by the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    /// Create an empty assistant message
    pub fn assistant() -> Self {
        Message {
            role: Role::Assistant,
            content: None,
            tool_calls: Vec::new(),
        }
    }

    /// Set the text content of the message
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.content = Some(text.into());
        self
    }

    /// Add a tool call to the message
    pub fn with_tool_call(mut self, tool_call: ToolCall) -> Self {
        self.tool_calls.push(tool_call);
        self
    }

    pub fn text(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

/// The first choice of a non-streamed completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub message: Message,
    pub finish_reason: Option<String>,
}

impl Choice {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            finish_reason: None,
        }
    }
}
