use anyhow::{anyhow, Result};
use console::style;
use parley::store::AgentStore;

use crate::agents::FileAgentStore;

pub async fn list_agents(store: Option<&FileAgentStore>) -> Result<()> {
    let store = store.ok_or_else(|| anyhow!("Pass --agents <catalog.yaml> to list agents"))?;
    let agents = store.agents_catalog().await?;

    if agents.is_empty() {
        println!("{}", style(format!("No agents in {}", store.path().display())).dim());
        return Ok(());
    }

    for agent in agents {
        println!(
            "{:>4}  {}  {}",
            style(agent.id).bold(),
            agent.name,
            style(&agent.model_tier).dim()
        );
        if !agent.description.is_empty() {
            println!("      {}", agent.description);
        }
    }
    Ok(())
}
