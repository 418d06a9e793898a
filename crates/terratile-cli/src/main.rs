//! Terratile CLI - Command-line front end for the terrain pipeline

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{init, run, stats, tiles, ConfigArgs};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "terratile")]
#[command(about = "Procedural tiled terrain from a heightmap", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the terrain config file
    #[arg(long, global = true, default_value = "terrain.toml")]
    config: PathBuf,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default terrain.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show predicted tile, vertex and polygon counts
    Stats {
        #[command(flatten)]
        overrides: ConfigArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the full pipeline: tiles, modifiers, bake, pivots
    Run {
        #[command(flatten)]
        overrides: ConfigArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Partition the terrain and print the tile layout
    Tiles {
        #[command(flatten)]
        overrides: ConfigArgs,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init { force } => init::run(&cli.config, force),
        Commands::Stats { overrides, json } => stats::run(&cli.config, &overrides, json),
        Commands::Run { overrides, json } => run::run(&cli.config, &overrides, json),
        Commands::Tiles { overrides } => tiles::run(&cli.config, &overrides),
    }
}
