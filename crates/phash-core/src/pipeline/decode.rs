//! Image decoding with format detection, validation, and timeout support.
//!
//! Decoding is delegated entirely to the `image` crate. Failures surface as
//! [`PipelineError::Decode`] and are never retried: a corrupt input stays corrupt.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::{PipelineError, PipelineResult};

/// Label used in errors for images that did not come from a file.
pub const MEMORY_SOURCE: &str = "<memory>";

/// Label used in errors for base64-encoded input.
pub const BASE64_SOURCE: &str = "<base64>";

/// Image decoder with configurable limits and timeout.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
#[derive(Debug)]
pub struct DecodedImage {
    /// The decoded pixel grid
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Size of the encoded input in bytes
    pub file_size: u64,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an image from an in-memory byte buffer with validation and timeout.
    ///
    /// `path` is only used for format fallback and error context.
    pub async fn decode_from_bytes(
        &self,
        bytes: Vec<u8>,
        path: &Path,
    ) -> PipelineResult<DecodedImage> {
        let path_owned = path.to_path_buf();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || decode_bytes(&bytes, &path_owned)).await
        })
        .await;

        match decode_result {
            Ok(Ok(Ok(decoded))) => {
                self.check_dimensions(&decoded, path)?;
                Ok(decoded)
            }
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(e)) => Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                path: path.to_path_buf(),
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    fn check_dimensions(&self, decoded: &DecodedImage, path: &Path) -> PipelineResult<()> {
        if decoded.width > self.limits.max_image_dimension
            || decoded.height > self.limits.max_image_dimension
        {
            return Err(PipelineError::ImageTooLarge {
                path: path.to_path_buf(),
                width: decoded.width,
                height: decoded.height,
                max_dim: self.limits.max_image_dimension,
            });
        }
        Ok(())
    }
}

/// Synchronously decode encoded image bytes.
///
/// The format is sniffed from the content first; the extension of `path` is
/// only consulted when sniffing fails.
pub fn decode_bytes(bytes: &[u8], path: &Path) -> PipelineResult<DecodedImage> {
    let file_size = bytes.len() as u64;
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot detect image format: {}", e),
        })?;
    let format = match reader.format() {
        Some(f) => f,
        None => ImageFormat::from_path(path).map_err(|_| PipelineError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
        })?,
    };
    let image = image::load_from_memory_with_format(bytes, format).map_err(|e| {
        PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    let (width, height) = image.dimensions();
    Ok(DecodedImage {
        image,
        format,
        width,
        height,
        file_size,
    })
}

/// Decode a base64-encoded image (standard alphabet, surrounding whitespace ignored).
pub fn decode_base64(encoded: &str) -> PipelineResult<DecodedImage> {
    let path = Path::new(BASE64_SOURCE);
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Invalid base64: {}", e),
        })?;
    decode_bytes(&bytes, path)
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    /// Encode a small gradient as PNG bytes.
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 90])
        });
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::Png), "png");
        assert_eq!(format_to_string(ImageFormat::WebP), "webp");
    }

    #[test]
    fn test_decode_bytes_png() {
        let bytes = png_bytes(20, 10);
        let decoded = decode_bytes(&bytes, Path::new(MEMORY_SOURCE)).unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
        assert_eq!((decoded.width, decoded.height), (20, 10));
        assert_eq!(decoded.file_size, bytes.len() as u64);
    }

    #[test]
    fn test_format_detected_by_content() {
        // PNG bytes behind a .jpg name are still detected as PNG
        let bytes = png_bytes(8, 8);
        let decoded = decode_bytes(&bytes, Path::new("misnamed.jpg")).unwrap();
        assert_eq!(decoded.format, ImageFormat::Png);
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let err = decode_bytes(b"definitely not an image", Path::new("junk.png")).unwrap_err();
        assert!(matches!(err, PipelineError::Decode { .. }));
    }

    #[test]
    fn test_unknown_format_without_extension() {
        let err = decode_bytes(b"\x00\x01\x02\x03", Path::new(MEMORY_SOURCE)).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_decode_base64() {
        let encoded = BASE64.encode(png_bytes(5, 7));
        let decoded = decode_base64(&format!("  {encoded}\n")).unwrap();
        assert_eq!((decoded.width, decoded.height), (5, 7));

        let err = decode_base64("!!not base64!!").unwrap_err();
        assert!(err.to_string().contains("Invalid base64"));
    }

    #[tokio::test]
    async fn test_decode_from_bytes_enforces_dimension_limit() {
        let decoder = ImageDecoder::new(LimitsConfig {
            max_image_dimension: 16,
            ..LimitsConfig::default()
        });
        let err = decoder
            .decode_from_bytes(png_bytes(32, 8), Path::new("wide.png"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ImageTooLarge { width: 32, .. }
        ));

        let ok = decoder
            .decode_from_bytes(png_bytes(16, 16), Path::new("ok.png"))
            .await
            .unwrap();
        assert_eq!(ok.width, 16);
    }
}
