//! Record types produced by hashing and comparing images.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::pipeline::PerceptualHash;

/// The hash record for one image file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashedImage {
    // === File Identification ===
    /// Path to the source file, as given or discovered
    pub file_path: PathBuf,

    /// Just the filename portion
    pub file_name: String,

    /// BLAKE3 hash of the file bytes, when enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,

    // === Image Properties ===
    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Detected format ("jpeg", "png", "webp", etc.)
    pub format: String,

    /// File size in bytes
    pub file_size: u64,

    // === Hash ===
    /// 64-bit perceptual hash as 16 lowercase hex digits
    pub phash: PerceptualHash,
}

/// Result of comparing two perceptual hashes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub left: PerceptualHash,
    pub right: PerceptualHash,

    /// Hamming distance, 0..=64
    pub distance: u32,

    /// Threshold the verdict was computed with
    pub threshold: u32,

    /// `distance <= threshold`
    pub similar: bool,
}

impl Comparison {
    pub fn new(left: PerceptualHash, right: PerceptualHash, threshold: u32) -> Self {
        let distance = left.distance(right);
        Self {
            left,
            right,
            distance,
            threshold,
            similar: distance <= threshold,
        }
    }
}

/// A set of images whose hashes are transitively within the similarity threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Files in the group, sorted by path
    pub files: Vec<PathBuf>,

    /// Hashes of `files`, index-aligned
    pub hashes: Vec<PerceptualHash>,

    /// Largest pairwise distance inside the group
    pub max_distance: u32,
}
