//! ShapeVillage CLI - Command-line interface for village lineages
//!
//! This is the main entry point for users exploring village bloodlines.
//! It fetches villages from the subgraph, keeps local snapshots, lays out
//! lineage graphs and serves them to visualizers.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "shapevillage")]
#[command(author = "ShapeVillage Contributors")]
#[command(version)]
#[command(about = "Lineage graphs for ShapeVillage bloodlines", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project directory holding .shapevillage/
    #[arg(short = 'C', long = "dir", global = true, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config to .shapevillage/config.json
    Init,

    /// Fetch a village from the subgraph and store a snapshot
    Fetch {
        /// Village contract address
        address: String,
    },

    /// List villages by owner, or every breedable village
    Villages {
        /// Owner address
        #[arg(short, long, conflicts_with = "breedable")]
        owner: Option<String>,

        /// List villages with at least two characters
        #[arg(long)]
        breedable: bool,

        /// Output as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Lay out characters from a JSON file
    Layout {
        /// File with a character array, a village, or a subgraph response
        file: PathBuf,

        /// Write the render graph here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export a village's render graph to JSON
    Export {
        /// Village contract address
        address: String,

        /// Output file
        #[arg(short, long, default_value = "lineage.json")]
        output: PathBuf,

        /// Fetch again even if a snapshot exists
        #[arg(long)]
        refresh: bool,
    },

    /// Show the ancestors and descendants of a character
    Lineage {
        /// Village contract address
        address: String,

        /// Character id or name
        character: String,

        /// Maximum distance to walk (0 = unlimited)
        #[arg(short, long, default_value = "0")]
        depth: usize,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show configuration and stored snapshots
    Status {
        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Serve a village's lineage over WebSocket JSON-RPC
    Serve {
        /// Village contract address
        address: String,

        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Headless mode: bind to 0.0.0.0 for remote access
        #[arg(long)]
        headless: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let dir = cli.dir;
    let result = match cli.command {
        Commands::Init => commands::init(&dir),
        Commands::Fetch { address } => commands::fetch(&dir, &address).await,
        Commands::Villages {
            owner,
            breedable,
            json,
        } => commands::villages(&dir, owner.as_deref(), breedable, json).await,
        Commands::Layout { file, output } => commands::layout(&dir, &file, output.as_deref()),
        Commands::Export {
            address,
            output,
            refresh,
        } => commands::export(&dir, &address, &output, refresh).await,
        Commands::Lineage {
            address,
            character,
            depth,
            json,
        } => commands::lineage(&dir, &address, &character, depth, json).await,
        Commands::Status { json } => commands::status(&dir, json),
        Commands::Serve {
            address,
            port,
            headless,
        } => commands::serve(&dir, &address, port, headless).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
