use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::{ChatError, ChatResult};
use crate::models::category::Category;
use crate::models::message::PromptFragment;
use crate::models::request::{AgentContext, ChatRequest, UserContext};
use crate::models::role::Role;
use crate::prompt_template::load_prompt_file;
use crate::store::AgentStore;

pub const NEW_MESSAGE_NAME: &str = "new-message";

/// Assembles the ordered prompt for a chat turn
///
/// The order is persona, response format, user profile, then the new message.
/// Context fragments are sent as `user` for deep conversations so the model
/// treats them as part of the exchange; the new message is always last and
/// always `user`.
#[derive(Default)]
pub struct PromptBuilder {
    store: Option<Arc<dyn AgentStore>>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read agent personas from the given store
    pub fn with_store(store: Arc<dyn AgentStore>) -> Self {
        Self { store: Some(store) }
    }

    pub async fn build_prompt(
        &self,
        request: &ChatRequest,
        category: Category,
    ) -> ChatResult<Vec<PromptFragment>> {
        let mut prompts = self.persona(request.agent.as_ref(), category).await?;

        prompts.push(PromptFragment::new(
            context_role(category, Role::System),
            "response-format",
            render("response_format.md", &json!({}))?,
        ));

        if let Some(user) = &request.user {
            prompts.push(PromptFragment::new(
                context_role(category, Role::System),
                "user-profile",
                user_profile(user)?,
            ));
        }

        prompts.push(PromptFragment::user(
            NEW_MESSAGE_NAME,
            format!("New Message: {}", request.message),
        ));

        debug!(category = %category, fragments = prompts.len(), "prompt assembled");
        Ok(prompts)
    }

    async fn persona(
        &self,
        agent: Option<&AgentContext>,
        category: Category,
    ) -> ChatResult<Vec<PromptFragment>> {
        let (Some(agent), Some(store)) = (agent, &self.store) else {
            return Ok(vec![PromptFragment::new(
                context_role(category, Role::System),
                "profile",
                render("persona.md", &json!({}))?,
            )]);
        };

        let fragments = match store.agent_prompt_fragments(agent.id).await {
            Ok(fragments) => fragments,
            Err(e) => {
                warn!(agent_id = agent.id, error = %e, "could not load agent prompts, using an empty persona");
                Vec::new()
            }
        };

        Ok(fragments
            .into_iter()
            .map(|f| PromptFragment::new(context_role(category, f.role), f.name, f.content))
            .collect())
    }
}

fn context_role(category: Category, role: Role) -> Role {
    match category {
        Category::DeepConversation => Role::User,
        _ => role,
    }
}

fn user_profile(user: &UserContext) -> ChatResult<String> {
    let attributes: Vec<HashMap<&str, String>> = user
        .profile_attributes
        .iter()
        .map(|(key, value)| HashMap::from([("key", capitalize(key)), ("value", value.clone())]))
        .collect();

    render(
        "user_profile.md",
        &json!({
            "name": user.name,
            "language": user.language_code,
            "attributes": attributes,
        }),
    )
}

fn render(template: &str, context: &serde_json::Value) -> ChatResult<String> {
    load_prompt_file(template, context).map_err(|e| ChatError::Template(e.to_string()))
}

/// Upper-case the first character and lower-case the rest
fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
