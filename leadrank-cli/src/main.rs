use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "leadrank", about = "Learn lead scoring preferences from feedback")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze text for sentiment and buying intent
    Analyze(commands::analyze::AnalyzeArgs),
    /// Manage configuration and scoring config versions
    Config(commands::config::ConfigArgs),
    /// Record and inspect feedback
    Feedback(commands::feedback::FeedbackArgs),
    /// Learn weights from recent feedback
    Learn(commands::learn::LearnArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Config(args) => commands::config::run(args).await,
        Commands::Feedback(args) => commands::feedback::run(args).await,
        Commands::Learn(args) => commands::learn::run(args).await,
    }
}
