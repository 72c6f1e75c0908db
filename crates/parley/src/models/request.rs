use serde::{Deserialize, Serialize};

use super::category::LIGHTWEIGHT_MODEL;

/// The user who sent the message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_language")]
    pub language_code: String,
    /// Free-form profile entries such as likes or dislikes, kept in insertion order
    #[serde(default)]
    pub profile_attributes: Vec<(String, String)>,
}

fn default_language() -> String {
    "en".to_string()
}

impl UserContext {
    pub fn new<S: Into<String>>(id: i64, name: S) -> Self {
        Self {
            id,
            name: name.into(),
            language_code: default_language(),
            profile_attributes: Vec::new(),
        }
    }

    pub fn with_language<S: Into<String>>(mut self, language_code: S) -> Self {
        self.language_code = language_code.into();
        self
    }

    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.profile_attributes.push((key.into(), value.into()));
        self
    }
}

/// The persona answering the message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentContext {
    pub id: i64,
    pub name: String,
    pub model_tier: String,
}

impl AgentContext {
    pub fn new<N: Into<String>, M: Into<String>>(id: i64, name: N, model_tier: M) -> Self {
        Self {
            id,
            name: name.into(),
            model_tier: model_tier.into(),
        }
    }
}

/// Everything the pipeline needs to answer one inbound user turn
///
/// Built once per turn and passed by reference through classification,
/// prompt assembly and completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub user: Option<UserContext>,
    pub agent: Option<AgentContext>,
    /// Model tier the caller asked for, the agent's tier when one is attached
    pub requested_model: String,
    pub stream_requested: bool,
}

impl ChatRequest {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            user: None,
            agent: None,
            requested_model: LIGHTWEIGHT_MODEL.to_string(),
            stream_requested: false,
        }
    }

    pub fn with_user(mut self, user: UserContext) -> Self {
        self.user = Some(user);
        self
    }

    /// Attach the agent persona; its model tier becomes the requested model
    pub fn with_agent(mut self, agent: AgentContext) -> Self {
        self.requested_model = agent.model_tier.clone();
        self.agent = Some(agent);
        self
    }

    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.requested_model = model.into();
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream_requested = stream;
        self
    }

    /// The user id in the form the provider expects
    pub fn user_id(&self) -> Option<String> {
        self.user.as_ref().map(|user| user.id.to_string())
    }
}
