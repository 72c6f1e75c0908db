use anyhow::{anyhow, Result};
use bat::WrappingMode;
use clap::Args;
use cliclack::{input, spinner};
use console::style;
use futures::StreamExt;
use parley::models::request::{AgentContext, ChatRequest, UserContext};
use parley::models::role::Role;
use parley::providers::base::CompletionPayload;
use parley::router::Router;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

use crate::agents::FileAgentStore;
use crate::commands::build_router;
use crate::configuration::Settings;
use crate::transcript::{append_turn, is_new_transcript, read_transcript, TranscriptEntry};

#[derive(Args, Debug, Clone)]
pub struct ChatArgs {
    /// Send one message and exit instead of starting an interactive session
    #[arg(short, long)]
    pub message: Option<String>,

    /// Agent to chat with, looked up in the --agents catalog
    #[arg(long)]
    pub agent: Option<i64>,

    /// Id sent to the provider as the acting user
    #[arg(long, default_value_t = 1)]
    pub user_id: i64,

    /// Name shown to the model in the user profile
    #[arg(long)]
    pub user_name: Option<String>,

    /// Language code shown to the model in the user profile
    #[arg(long, default_value = "en")]
    pub language: String,

    /// Extra user profile entry, may be repeated
    #[arg(long = "attribute", value_name = "KEY=VALUE", value_parser = parse_attribute)]
    pub attributes: Vec<(String, String)>,

    /// Wait for the whole reply instead of streaming it
    #[arg(long)]
    pub no_stream: bool,

    /// Append each turn to this JSONL file
    #[arg(long)]
    pub transcript: Option<PathBuf>,
}

impl ChatArgs {
    /// The user profile sent with every turn; none without a user name
    pub fn user(&self) -> Option<UserContext> {
        let name = self.user_name.as_ref()?;
        let user = self
            .attributes
            .iter()
            .fold(
                UserContext::new(self.user_id, name).with_language(&self.language),
                |user, (key, value)| user.with_attribute(key, value),
            );
        Some(user)
    }
}

pub fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

struct ChatSession {
    router: Router,
    user: Option<UserContext>,
    agent: Option<AgentContext>,
    stream: bool,
    transcript: Option<PathBuf>,
}

impl ChatSession {
    fn request(&self, message: &str) -> ChatRequest {
        let mut request = ChatRequest::new(message).with_stream(self.stream);
        if let Some(user) = &self.user {
            request = request.with_user(user.clone());
        }
        if let Some(agent) = &self.agent {
            request = request.with_agent(agent.clone());
        }
        request
    }

    async fn turn(&self, message: &str) -> Result<()> {
        let request = self.request(message);

        let spin = spinner();
        spin.start("awaiting reply");
        let payload = self.router.chat(&request).await;
        spin.stop("");

        let reply = match payload? {
            CompletionPayload::Stream(mut stream) => {
                let mut reply = String::new();
                let mut stdout = io::stdout();
                while let Some(chunk) = stream.next().await {
                    let text = chunk?;
                    print!("{}", text);
                    stdout.flush()?;
                    reply.push_str(&text);
                }
                println!();
                reply
            }
            CompletionPayload::Choice(choice) => {
                let text = choice.message.text().unwrap_or_default().to_string();
                render(&text)?;
                text
            }
        };

        let title = self.conversation_title(message).await?;
        self.persist(&request, reply, title)
    }

    /// Title the conversation when this turn is the first one in its transcript
    async fn conversation_title(&self, message: &str) -> Result<Option<String>> {
        let Some(transcript) = &self.transcript else {
            return Ok(None);
        };
        if !is_new_transcript(transcript)? {
            return Ok(None);
        }

        match self.router.define_conversation_title(message).await {
            Ok(title) => {
                println!("{} {}", style("Title:").dim(), title);
                Ok(Some(title))
            }
            Err(e) => {
                warn!(error = %e, "failed to title the conversation");
                Ok(None)
            }
        }
    }

    fn persist(&self, request: &ChatRequest, reply: String, title: Option<String>) -> Result<()> {
        let Some(transcript) = &self.transcript else {
            return Ok(());
        };
        let user_id = request.user.as_ref().map(|user| user.id);
        let agent_id = request.agent.as_ref().map(|agent| agent.id);
        append_turn(
            transcript,
            &[
                TranscriptEntry::user(&request.message)
                    .with_participants(user_id, agent_id)
                    .with_title(title),
                TranscriptEntry::assistant(reply).with_participants(user_id, agent_id),
            ],
        )
    }

    /// The earlier turns of a resumed transcript, one printable line each
    fn replay(&self, entries: &[TranscriptEntry]) -> Vec<String> {
        let mut lines = Vec::new();
        for entry in entries {
            if let Some(title) = &entry.title {
                lines.push(style(title).bold().underlined().to_string());
            }
            let speaker = match entry.role {
                Role::User => style("you").cyan(),
                Role::Assistant => style(self.assistant_name()).green(),
                Role::System => style("system").dim(),
            };
            lines.push(format!("{}: {}", speaker.bold(), entry.content));
        }
        lines
    }

    fn assistant_name(&self) -> &str {
        self.agent
            .as_ref()
            .map(|agent| agent.name.as_str())
            .unwrap_or("parley")
    }

    async fn interactive(&self) -> Result<()> {
        let greeting = match &self.agent {
            Some(agent) => format!("parley chat with {}", agent.name),
            None => "parley chat".to_string(),
        };
        println!(
            "{} {}",
            greeting,
            style("- type \"exit\" to end the session").dim()
        );
        if let Some(transcript) = &self.transcript {
            for line in self.replay(&read_transcript(transcript)?) {
                println!("{}", line);
            }
        }
        println!();

        loop {
            let message: String = input("Message:").placeholder("").multiline().interact()?;
            if message.trim().eq_ignore_ascii_case("exit") {
                break;
            }
            if message.trim().is_empty() {
                continue;
            }

            if let Err(e) = self.turn(&message).await {
                println!("{}", style(e.to_string()).red());
            }
            println!();
        }
        Ok(())
    }
}

fn render(content: &str) -> Result<()> {
    bat::PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print()
        .map_err(|e| anyhow!("Failed to render reply: {}", e))?;
    Ok(())
}

pub async fn run(
    settings: &Settings,
    store: Option<Arc<FileAgentStore>>,
    args: ChatArgs,
) -> Result<()> {
    let agent = match args.agent {
        Some(agent_id) => {
            let store = store
                .as_ref()
                .ok_or_else(|| anyhow!("--agent needs an --agents catalog"))?;
            Some(store.agent_context(agent_id).await?)
        }
        None => None,
    };

    let session = ChatSession {
        router: build_router(settings, store)?,
        user: args.user(),
        agent,
        stream: !args.no_stream,
        transcript: args.transcript.clone(),
    };

    match &args.message {
        Some(message) => session.turn(message).await,
        None => session.interactive().await,
    }
}
