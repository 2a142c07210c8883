//! Pipeline orchestration - wires validation, decoding and hashing together.

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::types::HashedImage;

use super::decode::{format_to_string, ImageDecoder};
use super::discovery::{DiscoveredFile, FileDiscovery};
use super::hash::Hasher;
use super::validate::Validator;

/// Options for controlling per-image processing.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Skip the BLAKE3 content hash
    pub skip_content_hash: bool,
}

impl ProcessOptions {
    /// Options matching the `[hash]` section of a config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            skip_content_hash: !config.hash.content_hash,
        }
    }
}

/// Hashes image files: validate, read, decode, fingerprint.
///
/// Holds no per-image state, so one processor can serve many concurrent calls.
pub struct HashProcessor {
    decoder: ImageDecoder,
    validator: Validator,
    discovery: FileDiscovery,
    hasher: Arc<Hasher>,
}

impl HashProcessor {
    /// Create a new processor with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            decoder: ImageDecoder::new(config.limits.clone()),
            validator: Validator::new(config.limits.clone()),
            discovery: FileDiscovery::new(config.processing.clone()),
            hasher: Arc::new(Hasher::new()),
        }
    }

    /// Hash a single image file with default options.
    pub async fn process(&self, path: &Path) -> Result<HashedImage> {
        self.process_with_options(path, &ProcessOptions::default())
            .await
    }

    /// Hash a single image file.
    pub async fn process_with_options(
        &self,
        path: &Path,
        options: &ProcessOptions,
    ) -> Result<HashedImage> {
        let start = std::time::Instant::now();
        tracing::debug!("Processing: {:?}", path);

        self.validator.validate(path)?;
        tracing::trace!("  Validate: {:?}", start.elapsed());

        let read_start = std::time::Instant::now();
        let bytes = tokio::fs::read(path).await?;
        tracing::trace!("  Read: {:?}", read_start.elapsed());

        let content_hash = if options.skip_content_hash {
            None
        } else {
            Some(Hasher::content_hash_from_bytes(&bytes))
        };

        let decode_start = std::time::Instant::now();
        let decoded = self.decoder.decode_from_bytes(bytes, path).await?;
        tracing::trace!("  Decode: {:?}", decode_start.elapsed());

        // Resizing large images is the expensive part, keep it off the async workers.
        let phash_start = std::time::Instant::now();
        let hasher = Arc::clone(&self.hasher);
        let image = decoded.image;
        let phash = tokio::task::spawn_blocking(move || hasher.perceptual_hash(&image))
            .await
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Hash task join error: {}", e),
            })??;
        tracing::trace!("  Perceptual hash: {:?}", phash_start.elapsed());

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        tracing::debug!(
            "Hashed {:?} in {:?} ({}x{}) -> {}",
            file_name,
            start.elapsed(),
            decoded.width,
            decoded.height,
            phash
        );

        Ok(HashedImage {
            file_path: path.to_path_buf(),
            file_name,
            content_hash,
            width: decoded.width,
            height: decoded.height,
            format: format_to_string(decoded.format),
            file_size: decoded.file_size,
            phash,
        })
    }

    /// Discover all image files at a path.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        self.discovery.discover(path)
    }
}
