//! The `phash hash` command for fingerprinting images.

pub(crate) mod batch;
pub mod types;

pub use types::OutputFormat;

use clap::Args;
use phash_core::pipeline::FileDiscovery;
use phash_core::{Config, HashProcessor, OutputWriter, ProcessOptions};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use batch::process_batch;

/// Arguments for the `hash` command.
#[derive(Args, Debug, Default)]
pub struct HashArgs {
    /// Image file or directory to hash
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to `output.format` from config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Number of images hashed concurrently (defaults to `processing.parallel_workers`)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Skip the BLAKE3 content hash
    #[arg(long)]
    pub no_content_hash: bool,
}

/// Settings resolved from CLI arguments layered over the config file.
pub(crate) struct HashContext {
    pub processor: HashProcessor,
    pub options: ProcessOptions,
    pub format: OutputFormat,
    pub pretty: bool,
    pub parallel: usize,
}

impl HashContext {
    pub fn new(args: &HashArgs, config: &Config) -> Self {
        let mut options = ProcessOptions::from_config(config);
        if args.no_content_hash {
            options.skip_content_hash = true;
        }

        // Validation guarantees the configured format parses.
        let format = args.format.unwrap_or_else(|| {
            phash_core::OutputFormat::parse(&config.output.format)
                .map(OutputFormat::from)
                .unwrap_or(OutputFormat::Json)
        });

        Self {
            processor: HashProcessor::new(config),
            options,
            format,
            pretty: config.output.pretty,
            parallel: args
                .parallel
                .unwrap_or(config.processing.parallel_workers)
                .max(1),
        }
    }
}

/// Execute the hash command.
pub async fn execute(args: HashArgs, config: &Config) -> anyhow::Result<()> {
    let ctx = HashContext::new(&args, config);

    if !args.input.exists() {
        anyhow::bail!("Input not found: {}", args.input.display());
    }

    let files = ctx.processor.discover(&args.input);
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", args.input);
        return Ok(());
    }
    tracing::info!(
        "Found {} image(s) to hash ({:.1} MB)",
        files.len(),
        FileDiscovery::total_size(&files) as f64 / 1_000_000.0
    );

    if args.input.is_file() {
        hash_single(&ctx, &args).await
    } else {
        process_batch(&ctx, &args, files).await
    }
}

/// Hash one file and print its record.
async fn hash_single(ctx: &HashContext, args: &HashArgs) -> anyhow::Result<()> {
    let result = ctx
        .processor
        .process_with_options(&args.input, &ctx.options)
        .await?;

    if let Some(ref output_path) = args.output {
        let file = File::create(output_path)?;
        let mut writer = OutputWriter::new(BufWriter::new(file), ctx.format.into(), ctx.pretty);
        writer.write(&result)?;
        writer.flush()?;
        tracing::info!("Output written to {:?}", output_path);
    } else {
        let stdout = std::io::stdout();
        let mut writer = OutputWriter::new(stdout.lock(), ctx.format.into(), ctx.pretty);
        writer.write(&result)?;
        writer.flush()?;
    }

    Ok(())
}
