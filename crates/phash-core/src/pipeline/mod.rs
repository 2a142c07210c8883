//! Image hashing pipeline components.
//!
//! The perceptual hash itself is a straight chain of pure stages:
//! - **normalize**: resize to 32x32 and convert to luminance
//! - **dct**: separable 2D DCT-II
//! - **select**: the 63 lowest-frequency AC coefficients
//! - **phash**: mean threshold and bit packing into a [`PerceptualHash`]
//!
//! Around it sit the file-level stages:
//! - **validate**: pre-decode checks (existence, size, magic bytes)
//! - **decode**: bytes to pixels via the `image` crate
//! - **discovery**: find image files in directories
//! - **hash**: content (BLAKE3) and perceptual hashing entry points
//! - **processor**: orchestrates one file end to end

pub mod dct;
pub mod decode;
pub mod discovery;
pub mod hash;
pub mod normalize;
pub mod phash;
pub mod processor;
pub mod select;
pub mod validate;

// Re-exports for convenient access
pub use dct::{dct_1d, dct_2d, Dct};
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use hash::Hasher;
pub use normalize::normalize;
pub use phash::{pack_bits, PerceptualHash};
pub use processor::{HashProcessor, ProcessOptions};
pub use select::{select_low_frequencies, Coefficients, COEFFICIENT_COUNT, COEFFICIENT_POSITIONS};
pub use validate::Validator;
