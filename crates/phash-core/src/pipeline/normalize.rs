//! Shape normalization: resize to a fixed square and convert to luminance.

use image::imageops::FilterType;
use image::DynamicImage;

use crate::math::{LuminanceMatrix, Matrix};

/// Side length of the luminance matrix fed to the DCT.
pub const NORMALIZED_SIZE: u32 = 32;

/// Resize `image` to 32x32 (aspect ratio is discarded) and convert to BT.601 luma.
///
/// Works on any decoded image at least 1x1; alpha is ignored and higher bit
/// depths are scaled to 8 bits before the luma weights are applied.
pub fn normalize(image: &DynamicImage) -> LuminanceMatrix {
    let resized = image
        .resize_exact(NORMALIZED_SIZE, NORMALIZED_SIZE, FilterType::Lanczos3)
        .to_rgba8();

    let size = NORMALIZED_SIZE as usize;
    let mut matrix = Matrix::zeros(size, size);
    for (x, y, pixel) in resized.enumerate_pixels() {
        let [r, g, b, _] = pixel.0;
        matrix[(y as usize, x as usize)] = luma(r, g, b);
    }
    matrix
}

/// ITU-R BT.601 luma of an 8-bit RGB sample.
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)
}
