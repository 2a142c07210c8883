//! Content and perceptual hashing for image deduplication.

use blake3::Hasher as Blake3Hasher;
use image::DynamicImage;

use crate::error::PipelineResult;
use crate::math::LuminanceMatrix;

use super::dct::Dct;
use super::normalize::{normalize, NORMALIZED_SIZE};
use super::phash::{pack_bits, PerceptualHash};
use super::select::select_low_frequencies;

/// Provides content hashing and perceptual hashing for images.
///
/// The 32-point DCT cosine table is built once and reused for every image.
#[derive(Debug, Clone)]
pub struct Hasher {
    dct: Dct,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a new hasher with a precomputed transform.
    pub fn new() -> Self {
        Self {
            dct: Dct::new(NORMALIZED_SIZE as usize),
        }
    }

    /// Generate a BLAKE3 hash from an in-memory byte buffer.
    pub fn content_hash_from_bytes(data: &[u8]) -> String {
        let mut hasher = Blake3Hasher::new();
        hasher.update(data);
        hasher.finalize().to_hex().to_string()
    }

    /// Generate the 64-bit perceptual hash of a decoded image.
    ///
    /// Normalize to 32x32 luma, transform, keep the 63 lowest AC
    /// coefficients, threshold against their mean.
    pub fn perceptual_hash(&self, image: &DynamicImage) -> PipelineResult<PerceptualHash> {
        let luminance = normalize(image);
        self.hash_luminance(&luminance)
    }

    /// Hash an already-normalized luminance matrix.
    ///
    /// Any matrix of at least 8x8 is accepted; smaller ones fail with
    /// a dimension error.
    pub fn hash_luminance(&self, luminance: &LuminanceMatrix) -> PipelineResult<PerceptualHash> {
        let frequencies = self.dct.transform_2d(luminance);
        let coefficients = select_low_frequencies(&frequencies)?;
        Ok(pack_bits(&coefficients))
    }
}
