//! phash core - 64-bit DCT perceptual hashing for near-duplicate image detection.
//!
//! Visually similar images produce hashes with a small Hamming distance, so
//! resized, recompressed or lightly edited copies can be found without
//! byte-exact comparison.
//!
//! # Architecture
//!
//! ```text
//! bytes → Decode → Normalize (32x32 luma) → DCT-II → 63 AC coefficients → mean threshold → u64
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let a = phash_core::hash_bytes(&std::fs::read("a.jpg")?)?;
//! let b = phash_core::hash_bytes(&std::fs::read("b.jpg")?)?;
//! println!("{a} vs {b}: {} bits apart", a.distance(b));
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod math;
pub mod output;
pub mod pipeline;
pub mod similarity;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, ParseHashError, PhashError, PipelineError, PipelineResult, Result};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{DiscoveredFile, HashProcessor, Hasher, PerceptualHash, ProcessOptions};
pub use similarity::group_near_duplicates;
pub use types::{Comparison, DuplicateGroup, HashedImage};

use image::DynamicImage;
use std::path::Path;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Perceptual hash of an already-decoded image.
pub fn hash_image(image: &DynamicImage) -> Result<PerceptualHash> {
    Ok(Hasher::new().perceptual_hash(image)?)
}

/// Decode encoded image bytes (PNG, JPEG, GIF, BMP, WebP, TIFF) and hash them.
pub fn hash_bytes(bytes: &[u8]) -> Result<PerceptualHash> {
    let decoded = pipeline::decode::decode_bytes(bytes, Path::new(pipeline::decode::MEMORY_SOURCE))?;
    hash_image(&decoded.image)
}

/// Decode a base64-encoded image and hash it.
pub fn hash_base64(encoded: &str) -> Result<PerceptualHash> {
    let decoded = pipeline::decode::decode_base64(encoded)?;
    hash_image(&decoded.image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    use pipeline::decode::tests::png_bytes;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_hash_bytes_and_base64_agree() {
        let bytes = png_bytes(64, 40);
        let direct = hash_bytes(&bytes).unwrap();
        let via_base64 = hash_base64(&BASE64.encode(&bytes)).unwrap();
        assert_eq!(direct, via_base64);
        assert_eq!(direct.to_hex().len(), 16);
    }

    #[test]
    fn test_hash_bytes_rejects_garbage() {
        let err = hash_bytes(b"GIF89a but not really").unwrap_err();
        assert!(matches!(
            err,
            PhashError::Pipeline(PipelineError::Decode { .. })
        ));
    }
}
