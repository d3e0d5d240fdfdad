//! Trellis CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Wiki-link graph engine for note corpora", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Corpus root path (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    root: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-index the corpus and persist the result
    Refresh {
        /// Discard all indexed state and rebuild from scratch
        #[arg(long)]
        full: bool,
    },
    /// Show the link analysis for a note
    Analyze {
        /// Note id or title (normalized like a wiki-link target)
        note: String,
    },
    /// Find the shortest path between two notes
    Path {
        from: String,
        to: String,

        /// Give up beyond this many hops
        #[arg(long, default_value = "10")]
        max_depth: usize,

        /// Search strategy: bfs or astar
        #[arg(long, default_value = "bfs")]
        strategy: String,
    },
    /// List the notes within N hops of a note
    Neighborhood {
        note: String,

        #[arg(long, default_value = "2")]
        depth: usize,
    },
    /// Show corpus-level graph statistics
    Stats,
    /// Remove the persisted index
    Clear,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("trellis={}", log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Refresh { full } => commands::refresh(cli.root, full).await,
        Commands::Analyze { note } => commands::analyze(cli.root, note).await,
        Commands::Path { from, to, max_depth, strategy } => {
            commands::path(cli.root, from, to, max_depth, strategy).await
        }
        Commands::Neighborhood { note, depth } => {
            commands::neighborhood(cli.root, note, depth).await
        }
        Commands::Stats => commands::stats(cli.root).await,
        Commands::Clear => commands::clear(cli.root),
        Commands::Version => {
            println!("trellis v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
