//! Batch hashing: concurrent per-file work with ordered, streaming output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::{Duration, Instant};

use futures_util::stream::{self, StreamExt};
use phash_core::{DiscoveredFile, HashProcessor, HashedImage, OutputWriter, ProcessOptions};

use super::types::OutputFormat;
use super::{HashArgs, HashContext};

/// Counters reported after a batch run.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct BatchStats {
    pub succeeded: u64,
    pub failed: u64,
    pub total_bytes: u64,
    pub elapsed: Duration,
}

impl BatchStats {
    fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.succeeded as f64 / secs
        } else {
            0.0
        }
    }

    fn throughput_mb(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_bytes as f64 / 1_000_000.0 / secs
        } else {
            0.0
        }
    }
}

/// Hash `files` with up to `parallel` in flight, handing each success to
/// `on_result` in discovery order. Failures are logged and counted.
pub(crate) async fn hash_files<F>(
    processor: &HashProcessor,
    options: &ProcessOptions,
    files: &[DiscoveredFile],
    parallel: usize,
    mut on_result: F,
) -> anyhow::Result<BatchStats>
where
    F: FnMut(HashedImage) -> anyhow::Result<()>,
{
    let progress = create_progress_bar(files.len() as u64);
    let start_time = Instant::now();
    let mut stats = BatchStats::default();

    // `buffered` keeps input order while running `parallel` futures at once.
    let mut results = stream::iter(files)
        .map(|file| async move {
            let result = processor.process_with_options(&file.path, options).await;
            (file, result)
        })
        .buffered(parallel.max(1));

    while let Some((file, result)) = results.next().await {
        match result {
            Ok(image) => {
                stats.succeeded += 1;
                stats.total_bytes += image.file_size;
                on_result(image)?;
            }
            Err(e) => {
                stats.failed += 1;
                tracing::error!("Failed: {:?} - {}", file.path, e);
            }
        }

        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let processed = stats.succeeded + stats.failed;
            progress.set_message(format!("{:.1} img/sec", processed as f64 / elapsed));
        }
    }

    progress.finish_and_clear();
    stats.elapsed = start_time.elapsed();
    Ok(stats)
}

/// Hash a directory of images and write all records.
///
/// JSONL is streamed as records arrive; JSON needs every record for the
/// array wrapper, so it is collected first.
pub async fn process_batch(
    ctx: &HashContext,
    args: &HashArgs,
    files: Vec<DiscoveredFile>,
) -> anyhow::Result<()> {
    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };
    let mut writer = OutputWriter::new(sink, ctx.format.into(), ctx.pretty);

    let mut collected = Vec::new();
    let stats = hash_files(
        &ctx.processor,
        &ctx.options,
        &files,
        ctx.parallel,
        |image| {
            match ctx.format {
                OutputFormat::Jsonl => writer.write(&image)?,
                OutputFormat::Json => collected.push(image),
            }
            Ok(())
        },
    )
    .await?;

    if ctx.format == OutputFormat::Json {
        writer.write_all(&collected)?;
    }
    writer.flush()?;

    if let Some(output_path) = &args.output {
        tracing::info!(
            "Wrote {} record(s) to {:?}",
            writer.items_written(),
            output_path
        );
    }

    print_summary(&stats);
    Ok(())
}

/// Create a progress bar for batch hashing.
pub(crate) fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after batch hashing.
pub(crate) fn print_summary(stats: &BatchStats) {
    let total = stats.succeeded + stats.failed;

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", stats.succeeded);
    if stats.failed > 0 {
        eprintln!("    Failed:       {:>8}", stats.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", total);
    eprintln!("    Duration:     {:>7.1}s", stats.elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} img/sec", stats.rate());
    eprintln!("    Throughput:   {:>7.1} MB/sec", stats.throughput_mb());
    eprintln!("  ====================================");
}
