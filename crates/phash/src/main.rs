//! phash CLI - Perceptual hashing and near-duplicate detection for images.
//!
//! Every image is reduced to a 64-bit DCT fingerprint. Hashes of visually
//! similar images differ in only a few bits, so the Hamming distance between
//! two hashes is a cheap similarity measure.
//!
//! # Usage
//!
//! ```bash
//! # Hash a single image
//! phash hash image.jpg
//!
//! # Hash a directory
//! phash hash ./photos/ --format jsonl --output hashes.jsonl
//!
//! # Compare two images (or two hex hashes)
//! phash compare a.jpg b.png
//!
//! # Find groups of near-duplicates
//! phash dupes ./photos/ --threshold 8
//!
//! # View configuration
//! phash config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// phash - 64-bit DCT perceptual hashing for near-duplicate image detection.
#[derive(Parser, Debug)]
#[command(name = "phash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Use this config file instead of the default location
    #[arg(short, long, global = true, env = "PHASH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute perceptual hashes for an image or a directory of images
    Hash(cli::hash::HashArgs),

    /// Hamming distance between two images or hashes
    Compare(cli::compare::CompareArgs),

    /// Group near-duplicate images in a directory
    Dupes(cli::dupes::DupesArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match &cli.config {
        // An explicitly requested file must load.
        Some(path) => phash_core::Config::load_from(path)?,
        None => match phash_core::Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `phash config path`."
                );
                phash_core::Config::default()
            }
        },
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("phash v{}", phash_core::VERSION);

    match cli.command {
        Commands::Hash(args) => cli::hash::execute(args, &config).await,
        Commands::Compare(args) => cli::compare::execute(args, &config).await,
        Commands::Dupes(args) => cli::dupes::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args, &config, cli.config.as_deref()).await,
    }
}
