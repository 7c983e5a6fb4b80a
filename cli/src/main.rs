use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod util;

use commands::chat::ChatCommands;
use commands::config::ConfigCommands;
use commands::form::FormCommands;
use commands::intent::IntentCommands;
use commands::kb::KbCommands;
use commands::stats::StatsCommands;
use commands::submissions::SubmissionCommands;
use commands::threads::ThreadCommands;
use commands::traces::TracesArgs;

#[derive(Parser)]
#[command(
    name = "formloom",
    version,
    about = "Formloom CLI — authoring tools for conversational form agents"
)]
struct Cli {
    /// Builder API base URL
    #[arg(long, env = "FORMLOOM_BUILDER_URL", global = true)]
    builder_url: Option<String>,

    /// Runtime API base URL
    #[arg(long, env = "FORMLOOM_RUNTIME_URL", global = true)]
    runtime_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check builder and runtime health
    Health,
    /// Persist default base URLs for future invocations
    Use {
        /// Builder API base URL to store
        #[arg(long)]
        set_builder_url: Option<String>,
        /// Runtime API base URL to store
        #[arg(long)]
        set_runtime_url: Option<String>,
    },
    /// Draft configuration documents (show, pull, push, publish, versions)
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Edit the form catalog through the consistency rules
    Form {
        #[command(subcommand)]
        command: FormCommands,
    },
    /// Intent routing rules
    Intent {
        #[command(subcommand)]
        command: IntentCommands,
    },
    /// Conversation threads and their message history
    Threads {
        #[command(subcommand)]
        command: ThreadCommands,
    },
    /// Execution trace logs
    Traces(TracesArgs),
    /// Captured form submissions
    Submissions {
        #[command(subcommand)]
        command: SubmissionCommands,
    },
    /// Knowledge bases: files, documents, search
    Kb {
        #[command(subcommand)]
        command: KbCommands,
    },
    /// Agents dashboard listing
    Agents,
    /// Usage statistics
    Stats {
        #[command(subcommand)]
        command: StatsCommands,
    },
    /// Chat preview against the runtime
    Chat {
        #[command(subcommand)]
        command: ChatCommands,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formloom=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let builder_url = util::resolve_builder_url(cli.builder_url);
    let runtime_url = util::resolve_runtime_url(cli.runtime_url);

    let code = match cli.command {
        Commands::Health => commands::health::run(&builder_url, &runtime_url).await,
        Commands::Use {
            set_builder_url,
            set_runtime_url,
        } => commands::health::set_defaults(set_builder_url, set_runtime_url),
        Commands::Config { command } => commands::config::run(&builder_url, command).await,
        Commands::Form { command } => commands::form::run(&builder_url, command).await,
        Commands::Intent { command } => commands::intent::run(&builder_url, command).await,
        Commands::Threads { command } => commands::threads::run(&builder_url, command).await,
        Commands::Traces(args) => commands::traces::run(&builder_url, args).await,
        Commands::Submissions { command } => {
            commands::submissions::run(&builder_url, command).await
        }
        Commands::Kb { command } => commands::kb::run(&builder_url, command).await,
        Commands::Agents => commands::stats::agents(&builder_url).await,
        Commands::Stats { command } => commands::stats::run(&builder_url, command).await,
        Commands::Chat { command } => commands::chat::run(&runtime_url, command).await,
    };

    std::process::exit(code);
}
