use crate::config::Config;
use crate::output::print_json;
use clap::Subcommand;
use leadmate_core::chat::ChatMessage;
use leadmate_core::types::{AgentKind, EntityId, MessageRole};

#[derive(Subcommand)]
pub enum ChatSubcommand {
    /// Send a message to an agent (document_qa | tech_stack | team_formation | code_analysis)
    Send {
        agent: AgentKind,
        #[arg(required = true)]
        message: Vec<String>,
        /// Scope the conversation to a project (default: your lead context)
        #[arg(long)]
        project: Option<String>,
    },
    /// Show an agent conversation
    History {
        agent: AgentKind,
        #[arg(long)]
        project: Option<String>,
    },
    /// Forget the local conversation with an agent
    Clear {
        agent: AgentKind,
        #[arg(long)]
        project: Option<String>,
    },
}

pub async fn run(config: &Config, subcmd: ChatSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ChatSubcommand::Send {
            agent,
            message,
            project,
        } => send(config, agent, &message.join(" "), project, json).await,
        ChatSubcommand::History { agent, project } => history(config, agent, project, json).await,
        ChatSubcommand::Clear { agent, project } => clear(config, agent, project).await,
    }
}

fn print_transcript(messages: &[ChatMessage]) {
    for message in messages {
        let who = match message.role {
            MessageRole::User => "you",
            MessageRole::Assistant => "agent",
        };
        println!("{who}> {}", message.content);
    }
}

async fn send(
    config: &Config,
    agent: AgentKind,
    message: &str,
    project: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let project = project.map(EntityId::new);
    let mut dashboard = super::connect(config).await?;

    let key = dashboard.open_chat(agent, project.clone()).await?;
    let result = dashboard.send_chat(agent, project, message).await;

    if json {
        if let Ok(reply) = &result {
            print_json(&serde_json::json!({ "agent": agent, "reply": reply }))?;
        }
    } else {
        // the session holds the full exchange, error bubble included
        print_transcript(dashboard.chats.messages(&key));
    }
    result.map(drop).map_err(Into::into)
}

async fn history(
    config: &Config,
    agent: AgentKind,
    project: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let project = project.map(EntityId::new);
    let mut dashboard = super::connect(config).await?;
    let key = dashboard.open_chat(agent, project).await?;

    let messages = dashboard.chats.messages(&key);
    if json {
        print_json(&messages)?;
        return Ok(());
    }
    if messages.is_empty() {
        println!("No messages with {agent} yet.");
        return Ok(());
    }
    print_transcript(messages);
    Ok(())
}

async fn clear(config: &Config, agent: AgentKind, project: Option<String>) -> anyhow::Result<()> {
    let project = project.map(EntityId::new);
    let mut dashboard = super::connect(config).await?;
    dashboard.clear_chat(agent, project)?;
    println!("Cleared {agent} conversation.");
    Ok(())
}
