//! The `phash compare` command: Hamming distance between two fingerprints.

use std::path::Path;

use anyhow::Context;
use clap::Args;
use phash_core::{Comparison, Config, HashProcessor, PerceptualHash, ProcessOptions};

/// Arguments for the `compare` command.
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// First image path or 16-digit hex hash
    pub left: String,

    /// Second image path or 16-digit hex hash
    pub right: String,

    /// Maximum distance still reported as similar (defaults to `hash.similarity_threshold`)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=64))]
    pub threshold: Option<u32>,

    /// Print the comparison as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the compare command.
pub async fn execute(args: CompareArgs, config: &Config) -> anyhow::Result<()> {
    let processor = HashProcessor::new(config);
    let left = resolve(&processor, &args.left).await?;
    let right = resolve(&processor, &args.right).await?;

    let threshold = args.threshold.unwrap_or(config.hash.similarity_threshold);
    let comparison = Comparison::new(left, right, threshold);
    tracing::debug!(
        "{} vs {}: distance {}",
        comparison.left,
        comparison.right,
        comparison.distance
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        println!("{}", describe(&comparison));
    }
    Ok(())
}

/// Turn an operand into a hash: existing files are hashed, anything else
/// must parse as hex.
async fn resolve(processor: &HashProcessor, operand: &str) -> anyhow::Result<PerceptualHash> {
    let path = Path::new(operand);
    if path.is_file() {
        let options = ProcessOptions {
            skip_content_hash: true,
        };
        let image = processor
            .process_with_options(path, &options)
            .await
            .with_context(|| format!("Failed to hash {}", path.display()))?;
        return Ok(image.phash);
    }

    operand.parse::<PerceptualHash>().with_context(|| {
        format!("'{operand}' is neither an image file nor a 16-digit hex hash")
    })
}

fn describe(comparison: &Comparison) -> String {
    let verdict = if comparison.similar {
        "similar"
    } else {
        "different"
    };
    format!(
        "{} {}  distance {}/64  {} (threshold {})",
        comparison.left, comparison.right, comparison.distance, verdict, comparison.threshold
    )
}
