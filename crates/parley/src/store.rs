use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::role::Role;

/// A stored prompt fragment belonging to an agent persona
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPromptFragment {
    pub role: Role,
    pub name: String,
    pub content: String,
}

/// An agent available for conversations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: i64,
    pub name: String,
    pub model_tier: String,
    #[serde(default)]
    pub description: String,
}

/// Read access to agent personas
///
/// Both lookups may legitimately return nothing.
#[async_trait]
pub trait AgentStore: Send + Sync {
    /// The persona fragments for an agent, in the order they should be sent
    async fn agent_prompt_fragments(&self, agent_id: i64) -> Result<Vec<AgentPromptFragment>>;

    /// Every agent that can be chatted with
    async fn agents_catalog(&self) -> Result<Vec<AgentSummary>>;
}

/// Agent store held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryAgentStore {
    agents: Vec<AgentSummary>,
    fragments: HashMap<i64, Vec<AgentPromptFragment>>,
}

impl InMemoryAgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agent(mut self, agent: AgentSummary, fragments: Vec<AgentPromptFragment>) -> Self {
        self.fragments.insert(agent.id, fragments);
        self.agents.push(agent);
        self
    }
}

#[async_trait]
impl AgentStore for InMemoryAgentStore {
    async fn agent_prompt_fragments(&self, agent_id: i64) -> Result<Vec<AgentPromptFragment>> {
        Ok(self.fragments.get(&agent_id).cloned().unwrap_or_default())
    }

    async fn agents_catalog(&self) -> Result<Vec<AgentSummary>> {
        Ok(self.agents.clone())
    }
}
