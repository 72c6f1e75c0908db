use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};

use super::base::{ChatRequestSpec, Usage};
use crate::models::message::{Choice, Message, PromptFragment};
use crate::models::tool::{Tool, ToolCall};

lazy_static! {
    static ref INVALID_NAME_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
}

/// Convert prompt fragments to OpenAI's API message specification
pub fn fragments_to_openai_spec(fragments: &[PromptFragment]) -> Vec<Value> {
    fragments
        .iter()
        .map(|fragment| {
            let mut converted = json!({
                "role": fragment.role,
                "content": fragment.content,
            });
            let name = sanitize_name(&fragment.name);
            if !name.is_empty() {
                converted["name"] = json!(name);
            }
            converted
        })
        .collect()
}

/// Convert internal Tool format to OpenAI's API tool specification
pub fn tools_to_openai_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters,
            }
        }));
    }

    Ok(result)
}

/// Build the request body, leaving out every unset optional field
pub fn create_request(spec: &ChatRequestSpec) -> Result<Value> {
    let mut payload = json!({
        "model": spec.model,
        "messages": fragments_to_openai_spec(&spec.messages),
    });
    let object = payload
        .as_object_mut()
        .ok_or_else(|| anyhow!("request payload is not an object"))?;

    if let Some(user) = &spec.user {
        object.insert("user".to_string(), json!(user));
    }
    if spec.stream {
        object.insert("stream".to_string(), json!(true));
    }
    if !spec.tools.is_empty() {
        object.insert("tools".to_string(), json!(tools_to_openai_spec(&spec.tools)?));
    }
    if let Some(name) = &spec.tool_choice {
        object.insert(
            "tool_choice".to_string(),
            json!({"type": "function", "function": {"name": name}}),
        );
    }

    Ok(payload)
}

/// Convert the first choice of OpenAI's API response to the internal format
pub fn openai_response_to_choice(response: &Value) -> Result<Choice> {
    let choice = response["choices"]
        .get(0)
        .ok_or_else(|| anyhow!("No choices in response"))?;
    let original = &choice["message"];

    let mut message = Message::assistant();
    if let Some(text) = original.get("content").and_then(|c| c.as_str()) {
        message = message.with_text(text);
    }

    if let Some(tool_calls) = original.get("tool_calls").and_then(|t| t.as_array()) {
        for tool_call in tool_calls {
            let id = tool_call["id"].as_str().unwrap_or_default();
            let name = tool_call["function"]["name"].as_str().unwrap_or_default();
            let arguments = tool_call["function"]["arguments"]
                .as_str()
                .unwrap_or_default();
            message = message.with_tool_call(ToolCall::new(id, name, arguments));
        }
    }

    Ok(Choice {
        message,
        finish_reason: choice["finish_reason"].as_str().map(String::from),
    })
}

pub fn get_usage(data: &Value) -> Result<Usage> {
    let usage = data
        .get("usage")
        .ok_or_else(|| anyhow!("No usage data in response"))?;

    let prompt_tokens = usage
        .get("prompt_tokens")
        .and_then(|v| v.as_i64())
        .and_then(|v| i32::try_from(v).ok());

    let completion_tokens = usage
        .get("completion_tokens")
        .and_then(|v| v.as_i64())
        .and_then(|v| i32::try_from(v).ok());

    let total_tokens = usage
        .get("total_tokens")
        .and_then(|v| v.as_i64())
        .and_then(|v| i32::try_from(v).ok())
        .or_else(|| match (prompt_tokens, completion_tokens) {
            (Some(prompt), Some(completion)) => prompt.checked_add(completion),
            _ => None,
        });

    Ok(Usage::new(prompt_tokens, completion_tokens, total_tokens))
}

/// Message names may only contain [a-zA-Z0-9_-]
pub fn sanitize_name(name: &str) -> String {
    INVALID_NAME_CHARS.replace_all(name, "_").to_string()
}
