//! Parche CLI - command-line interface for the parche patch runtime.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "parche")]
#[command(author, version, about = "Parche patch runtime CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a patch offline to a WAV file
    Render(commands::render::RenderArgs),

    /// Play a patch in real time
    Play(commands::play::PlayArgs),

    /// List available object types
    Objects(commands::objects::ObjectsArgs),
}

fn main() -> anyhow::Result<()> {
    // `print` objects log at info level under parche::print; default to
    // showing them unless RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Play(args) => commands::play::run(args),
        Commands::Objects(args) => commands::objects::run(args),
    }
}
