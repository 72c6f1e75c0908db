mod agents;
mod commands;
mod configuration;
mod error;
mod transcript;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::agents::FileAgentStore;
use crate::commands::chat::ChatArgs;
use crate::configuration::Settings;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML catalog of agent personas
    #[arg(long, global = true, value_name = "FILE")]
    agents: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chat with the routed models
    Chat(ChatArgs),

    /// Suggest a conversation title for a first message
    Title {
        /// The first message of the conversation
        message: String,
    },

    /// List the agents in the catalog
    Agents,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let store = cli.agents.map(|path| Arc::new(FileAgentStore::new(path)));

    match cli.command {
        Command::Agents => commands::agents::list_agents(store.as_deref()).await,
        Command::Title { message } => {
            let settings = Settings::new()?;
            commands::title::suggest_title(&settings, &message).await
        }
        Command::Chat(args) => {
            let settings = Settings::new()?;
            commands::chat::run(&settings, store, args).await
        }
    }
}
