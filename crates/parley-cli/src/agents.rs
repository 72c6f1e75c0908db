use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use parley::models::request::AgentContext;
use parley::store::{AgentPromptFragment, AgentStore, AgentSummary};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct AgentEntry {
    #[serde(flatten)]
    summary: AgentSummary,
    #[serde(default)]
    prompts: Vec<AgentPromptFragment>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentCatalog {
    #[serde(default)]
    agents: Vec<AgentEntry>,
}

/// Agent store backed by a YAML catalog
///
/// ```yaml
/// agents:
///   - id: 1
///     name: Sage
///     model_tier: gpt-4o
///     prompts:
///       - role: system
///         name: backstory
///         content: You studied philosophy.
/// ```
///
/// The file is read on every lookup so edits apply to the next turn.
pub struct FileAgentStore {
    path: PathBuf,
}

impl FileAgentStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<AgentCatalog> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read agent catalog {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(AgentCatalog::default());
        }
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid agent catalog {}", self.path.display()))
    }

    /// Resolve an agent id to the context carried on a chat request
    pub async fn agent_context(&self, agent_id: i64) -> Result<AgentContext> {
        self.agents_catalog()
            .await?
            .into_iter()
            .find(|agent| agent.id == agent_id)
            .map(|agent| AgentContext::new(agent.id, agent.name, agent.model_tier))
            .ok_or_else(|| anyhow!("Agent {} is not in {}", agent_id, self.path.display()))
    }
}

#[async_trait]
impl AgentStore for FileAgentStore {
    async fn agent_prompt_fragments(&self, agent_id: i64) -> Result<Vec<AgentPromptFragment>> {
        Ok(self
            .load()
            .await?
            .agents
            .into_iter()
            .find(|entry| entry.summary.id == agent_id)
            .map(|entry| entry.prompts)
            .unwrap_or_default())
    }

    async fn agents_catalog(&self) -> Result<Vec<AgentSummary>> {
        Ok(self
            .load()
            .await?
            .agents
            .into_iter()
            .map(|entry| entry.summary)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley::models::role::Role;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CATALOG: &str = r#"
agents:
  - id: 1
    name: Sage
    model_tier: gpt-4o
    description: Thoughtful mentor
    prompts:
      - role: system
        name: backstory
        content: You studied philosophy in Yogyakarta.
      - role: user
        name: example
        content: Ask me anything.
  - id: 2
    name: Buddy
    model_tier: gpt-4o-mini
"#;

    fn catalog_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_catalog() -> Result<()> {
        let file = catalog_file(CATALOG);
        let store = FileAgentStore::new(file.path());

        let agents = store.agents_catalog().await?;
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].name, "Sage");
        assert_eq!(agents[0].description, "Thoughtful mentor");
        assert_eq!(agents[1].model_tier, "gpt-4o-mini");
        assert_eq!(agents[1].description, "");
        Ok(())
    }

    #[tokio::test]
    async fn test_prompt_fragments() -> Result<()> {
        let file = catalog_file(CATALOG);
        let store = FileAgentStore::new(file.path());

        let fragments = store.agent_prompt_fragments(1).await?;
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].role, Role::System);
        assert_eq!(fragments[0].name, "backstory");
        assert_eq!(fragments[1].role, Role::User);

        assert!(store.agent_prompt_fragments(2).await?.is_empty());
        assert!(store.agent_prompt_fragments(42).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_agent_context() -> Result<()> {
        let file = catalog_file(CATALOG);
        let store = FileAgentStore::new(file.path());

        let agent = store.agent_context(1).await?;
        assert_eq!(agent, AgentContext::new(1, "Sage", "gpt-4o"));
        assert!(store.agent_context(9).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_file_is_empty_catalog() -> Result<()> {
        let file = catalog_file("");
        let store = FileAgentStore::new(file.path());
        assert!(store.agents_catalog().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_or_invalid_file() {
        let store = FileAgentStore::new("/definitely/not/here.yaml");
        assert!(store.agents_catalog().await.is_err());

        let file = catalog_file("agents: [ {id: nope} ]");
        let store = FileAgentStore::new(file.path());
        assert!(store.agent_prompt_fragments(1).await.is_err());
    }
}
