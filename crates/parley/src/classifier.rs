use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::errors::{ChatError, ChatResult};
use crate::models::category::{Category, LIGHTWEIGHT_MODEL};
use crate::models::message::PromptFragment;
use crate::models::tool::Tool;
use crate::prompt_template::load_prompt_file;
use crate::providers::base::{ChatRequestSpec, CompletionPayload, Provider};

pub const CATEGORIZE_TOOL_NAME: &str = "categorize_message";

/// Arguments the model must return when calling the categorize tool
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CategorizeMessage {
    category: Category,
}

#[derive(Serialize)]
struct CategoryInfo {
    name: String,
    description: &'static str,
}

/// Sorts an inbound message into one of the known categories with a forced tool call
pub struct Classifier {
    provider: Arc<dyn Provider>,
    model: String,
}

impl Classifier {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            model: LIGHTWEIGHT_MODEL.to_string(),
        }
    }

    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }

    /// The categorize tool; `category` is constrained to the known category names
    pub fn tool() -> Tool {
        Tool::new(
            CATEGORIZE_TOOL_NAME,
            "Tool to categorize message.",
            json!({
                "title": "CategorizeMessageTool",
                "description": "Tool to categorize message.",
                "type": "object",
                "properties": {
                    "category": {
                        "title": "Category",
                        "description": "The category of the message according to the listed category",
                        "type": "string",
                        "enum": Category::names(),
                    }
                },
                "required": ["category"],
            }),
        )
    }

    pub fn prompt(message: &str) -> ChatResult<Vec<PromptFragment>> {
        let categories: Vec<CategoryInfo> = Category::iter()
            .map(|category| CategoryInfo {
                name: category.to_string(),
                description: category.description(),
            })
            .collect();
        let profile = load_prompt_file("classify.md", &json!({ "categories": categories }))
            .map_err(|e| ChatError::Template(e.to_string()))?;

        Ok(vec![
            PromptFragment::system("profile", profile),
            PromptFragment::user("new-message", format!("Categorize this message: {}", message)),
        ])
    }

    /// Classify a message with a single request; there are no retries
    pub async fn classify(&self, message: &str, acting_user_id: Option<&str>) -> ChatResult<Category> {
        let spec = ChatRequestSpec::new(&self.model, Self::prompt(message)?)
            .with_user(acting_user_id.map(String::from))
            .with_tool(Self::tool())
            .with_forced_tool(CATEGORIZE_TOOL_NAME);

        let response = self.provider.create_chat(spec).await;
        if response.failed {
            return Err(ChatError::Classification(response.message));
        }
        let result = response
            .into_result()
            .map_err(|e| ChatError::Classification(e.message()))?;

        let CompletionPayload::Choice(choice) = result.completion else {
            return Err(ChatError::Classification(
                "expected a structured completion, got a stream".to_string(),
            ));
        };

        let tool_call = choice.message.tool_calls.first().ok_or_else(|| {
            ChatError::Classification("the model did not call the categorize tool".to_string())
        })?;
        if tool_call.name != CATEGORIZE_TOOL_NAME {
            return Err(ChatError::Classification(format!(
                "unexpected tool call '{}'",
                tool_call.name
            )));
        }

        let parsed: CategorizeMessage = tool_call.parse_arguments().map_err(|e| {
            ChatError::Classification(format!(
                "invalid arguments {}: {}",
                tool_call.arguments, e
            ))
        })?;

        debug!(arguments = %tool_call.arguments, "categorize tool call");
        info!(category = %parsed.category, "message classified");
        Ok(parsed.category)
    }
}
