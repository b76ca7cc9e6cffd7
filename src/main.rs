//! Strata CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Repository dependency graphs and semantic layers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Repository root path (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    /// Configuration file (defaults to strata.toml in the repository root)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dependency graph and print its statistics
    Index,
    /// Print the bounded semantic layer view
    Layers,
    /// Reveal the files of one unit and their neighbours
    Expand {
        /// Unit id, e.g. `folder:src/api`
        unit: String,

        /// Number of hops to reveal (defaults to the tier's reveal depth)
        #[arg(short, long)]
        depth: Option<usize>,
    },
    /// Show what a unit depends on and what depends on it
    Impact {
        /// Unit id, e.g. `file:src/index.ts`
        unit: String,

        /// Maximum traversal depth
        #[arg(short, long)]
        depth: Option<usize>,
    },
    /// List dependency cycles
    Cycles,
    /// Show one file's connections, by `node_<n>` id or path
    Node { key: String },
    /// Rank files by how often they are used and how much they depend on
    Rank {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Hub, leaf and orphan analysis
    Centrality,
    /// Pattern-based complexity metrics per file
    Complexity,
    /// Export the full graph as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    // Logs go to stderr so JSON on stdout stays parseable.
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("strata={log_level}")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Commands::Version = cli.command {
        println!("Strata v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    tracing::debug!("Repository root: {}", cli.root.display());
    let service = commands::service(&cli.root, cli.config.as_deref())?;
    let root = cli.root.as_path();

    match cli.command {
        Commands::Index => commands::index(&service, root),
        Commands::Layers => commands::layers(&service, root),
        Commands::Expand { unit, depth } => commands::expand(&service, root, &unit, depth),
        Commands::Impact { unit, depth } => commands::impact(&service, root, &unit, depth),
        Commands::Cycles => commands::cycles(&service, root),
        Commands::Node { key } => commands::node(&service, root, &key),
        Commands::Rank { limit } => commands::rank(&service, root, limit),
        Commands::Centrality => commands::centrality(&service, root),
        Commands::Complexity => commands::complexity(&service, root),
        Commands::Export { output } => commands::export(&service, root, output.as_deref()),
        Commands::Version => Ok(()),
    }
}
