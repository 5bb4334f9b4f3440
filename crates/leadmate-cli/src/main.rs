mod cmd;
mod config;
mod output;
mod token;

use clap::{Parser, Subcommand};
use cmd::{
    board::TaskSubcommand, chat::ChatSubcommand, doc::DocSubcommand, project::ProjectSubcommand,
    team::TeamSubcommand,
};
use config::Config;

#[derive(Parser)]
#[command(
    name = "leadmate",
    about = "Project dashboard for managers and team leads — projects, kanban board, documents, team, and AI agents",
    version,
    propagate_version = true
)]
struct Cli {
    /// Backend base URL (default: config file, then http://localhost:8000)
    #[arg(long, global = true, env = "LEADMATE_URL")]
    api_url: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login { email: String },

    /// Forget the stored session token
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Manage projects
    Project {
        #[command(subcommand)]
        subcommand: ProjectSubcommand,
    },

    /// Show the kanban board
    Board,

    /// Move or generate tasks
    Task {
        #[command(subcommand)]
        subcommand: TaskSubcommand,
    },

    /// Manage project documents
    Doc {
        #[command(subcommand)]
        subcommand: DocSubcommand,
    },

    /// Manage project team members
    Team {
        #[command(subcommand)]
        subcommand: TeamSubcommand,
    },

    /// Talk to the backend AI agents
    Chat {
        #[command(subcommand)]
        subcommand: ChatSubcommand,
    },

    /// Dashboard statistics
    Stats,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let result = run(cli).await;

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.api_url.as_deref())?;

    match cli.command {
        Commands::Login { email } => cmd::auth::login(&config, &email, cli.json).await,
        Commands::Logout => cmd::auth::logout(),
        Commands::Whoami => cmd::auth::whoami(&config, cli.json).await,
        Commands::Project { subcommand } => cmd::project::run(&config, subcommand, cli.json).await,
        Commands::Board => cmd::board::board(&config, cli.json).await,
        Commands::Task { subcommand } => cmd::board::run(&config, subcommand, cli.json).await,
        Commands::Doc { subcommand } => cmd::doc::run(&config, subcommand, cli.json).await,
        Commands::Team { subcommand } => cmd::team::run(&config, subcommand, cli.json).await,
        Commands::Chat { subcommand } => cmd::chat::run(&config, subcommand, cli.json).await,
        Commands::Stats => cmd::stats::run(&config, cli.json).await,
    }
}
