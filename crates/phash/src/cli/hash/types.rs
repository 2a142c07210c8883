//! CLI enum types for the hash command.

use clap::ValueEnum;
use phash_core::OutputFormat as CoreOutputFormat;

/// Supported output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

impl From<CoreOutputFormat> for OutputFormat {
    fn from(format: CoreOutputFormat) -> Self {
        match format {
            CoreOutputFormat::Json => OutputFormat::Json,
            CoreOutputFormat::JsonLines => OutputFormat::Jsonl,
        }
    }
}
