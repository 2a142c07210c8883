//! Input validation before decoding.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::{PipelineError, PipelineResult};

/// Number of header bytes inspected for a format signature.
const HEADER_LEN: usize = 12;

/// Validates files before they are read and decoded.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Cheap checks before a full decode: the file exists, fits the size
    /// limit, and starts with the signature of a raster format we decode.
    pub fn validate(&self, path: &Path) -> PipelineResult<()> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {}", e),
        })?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        self.check_magic_bytes(path)
    }

    fn check_magic_bytes(&self, path: &Path) -> PipelineResult<()> {
        let mut file = std::fs::File::open(path).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot open file: {}", e),
        })?;

        let mut header = [0u8; HEADER_LEN];
        let bytes_read = file.read(&mut header).map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: format!("Cannot read file header: {}", e),
        })?;

        if bytes_read < 4 {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "File too small to be a valid image".to_string(),
            });
        }

        if !is_valid_image_header(&header[..bytes_read]) {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }

        Ok(())
    }
}

/// True if `header` starts with the signature of JPEG, PNG, GIF, BMP, TIFF or WebP.
pub fn is_valid_image_header(header: &[u8]) -> bool {
    const SIGNATURES: &[&[u8]] = &[
        &[0xFF, 0xD8, 0xFF],            // JPEG
        &[0x89, b'P', b'N', b'G'],      // PNG
        b"GIF8",                        // GIF87a / GIF89a
        b"BM",                          // BMP
        &[b'I', b'I', 0x2A, 0x00],      // TIFF, little-endian
        &[b'M', b'M', 0x00, 0x2A],      // TIFF, big-endian
    ];

    if SIGNATURES.iter().any(|sig| header.starts_with(sig)) {
        return true;
    }

    // WebP: RIFF....WEBP
    if header.starts_with(b"RIFF") {
        return header.len() < HEADER_LEN || &header[8..12] == b"WEBP";
    }

    false
}
