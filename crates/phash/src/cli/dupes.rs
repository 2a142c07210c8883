//! The `phash dupes` command: hash a directory and report near-duplicate groups.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Args;
use phash_core::pipeline::FileDiscovery;
use phash_core::{group_near_duplicates, Config, DuplicateGroup, HashProcessor, ProcessOptions};
use serde::Serialize;

use super::hash::batch::{hash_files, print_summary};

/// Arguments for the `dupes` command.
#[derive(Args, Debug, Default)]
pub struct DupesArgs {
    /// Directory to scan
    #[arg(required = true)]
    pub input: PathBuf,

    /// Maximum Hamming distance between duplicates (defaults to `hash.similarity_threshold`)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=64))]
    pub threshold: Option<u32>,

    /// Number of images hashed concurrently (defaults to `processing.parallel_workers`)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// What `dupes` prints.
#[derive(Debug, Serialize)]
struct DupesReport {
    threshold: u32,
    images_hashed: u64,
    groups: Vec<DuplicateGroup>,
}

/// Execute the dupes command.
pub async fn execute(args: DupesArgs, config: &Config) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input not found: {}", args.input.display());
    }

    let threshold = args.threshold.unwrap_or(config.hash.similarity_threshold);
    let parallel = args
        .parallel
        .unwrap_or(config.processing.parallel_workers)
        .max(1);

    let processor = HashProcessor::new(config);
    let files = processor.discover(&args.input);
    tracing::info!(
        "Found {} image(s) to compare ({:.1} MB)",
        files.len(),
        FileDiscovery::total_size(&files) as f64 / 1_000_000.0
    );

    // Only the perceptual hash matters for grouping.
    let options = ProcessOptions {
        skip_content_hash: true,
    };
    let mut records = Vec::with_capacity(files.len());
    let stats = hash_files(&processor, &options, &files, parallel, |image| {
        records.push(image);
        Ok(())
    })
    .await?;

    let report = DupesReport {
        threshold,
        images_hashed: stats.succeeded,
        groups: group_near_duplicates(&records, threshold),
    };
    tracing::info!(
        "{} near-duplicate group(s) among {} image(s)",
        report.groups.len(),
        report.images_hashed
    );

    match &args.output {
        Some(path) => {
            write_report(BufWriter::new(File::create(path)?), &report)?;
            tracing::info!("Output written to {:?}", path);
        }
        None => write_report(std::io::stdout().lock(), &report)?,
    }

    if !files.is_empty() {
        print_summary(&stats);
    }
    Ok(())
}

/// Pretty JSON plus a trailing newline, flushed so write errors surface.
fn write_report<W: Write>(mut writer: W, report: &DupesReport) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};

    fn scene(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            let u = x as f64 / width as f64;
            let v = y as f64 / height as f64;
            let value = 40.0 + 150.0 * u + 50.0 * v;
            image::Rgb([value as u8, value as u8, (value * 0.5) as u8])
        }))
    }

    #[tokio::test]
    async fn groups_resized_copies() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images");
        std::fs::create_dir(&images).unwrap();
        scene(120, 90)
            .save_with_format(images.join("big.png"), ImageFormat::Png)
            .unwrap();
        scene(60, 45)
            .save_with_format(images.join("small.png"), ImageFormat::Png)
            .unwrap();
        scene(120, 90)
            .rotate180()
            .save_with_format(images.join("upside_down.png"), ImageFormat::Png)
            .unwrap();
        let output = dir.path().join("dupes.json");

        let args = DupesArgs {
            input: images,
            output: Some(output.clone()),
            ..Default::default()
        };
        execute(args, &Config::default()).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(value["threshold"], 10);
        assert_eq!(value["images_hashed"], 3);
        let groups = value["groups"].as_array().unwrap();
        assert_eq!(groups.len(), 1);
        let files: Vec<&str> = groups[0]["files"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f.as_str().unwrap())
            .collect();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("big.png"));
        assert!(files[1].ends_with("small.png"));
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let args = DupesArgs {
            input: PathBuf::from("/definitely/not/here"),
            ..Default::default()
        };
        assert!(execute(args, &Config::default()).await.is_err());
    }

    /// Accepts every byte, then fails on flush like a full disk would.
    struct FlushFails;

    impl Write for FlushFails {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::other("disk full"))
        }
    }

    #[test]
    fn write_report_surfaces_flush_errors() {
        let report = DupesReport {
            threshold: 10,
            images_hashed: 0,
            groups: vec![],
        };
        let err = write_report(BufWriter::new(FlushFails), &report).unwrap_err();
        assert!(err.to_string().contains("disk full"));

        let mut buffer = Vec::new();
        write_report(&mut buffer, &report).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["threshold"], 10);
        assert!(buffer.ends_with(b"\n"));
    }
}
