//! File discovery for finding images to hash.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::ProcessingConfig;

/// Discovers image files in directories.
pub struct FileDiscovery {
    config: ProcessingConfig,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Discover all supported image files at a path.
    ///
    /// An explicitly named file is returned whatever its extension; the
    /// decoder sniffs the real format from its content. A directory is walked
    /// recursively, keeping supported extensions only; hidden entries
    /// (dot-prefixed, e.g. macOS `._x.jpg` resource forks) are skipped.
    /// Results are sorted by path.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        if path.is_file() {
            return match std::fs::metadata(path) {
                Ok(meta) => vec![DiscoveredFile {
                    path: path.to_path_buf(),
                    size: meta.len(),
                }],
                Err(e) => {
                    tracing::warn!("Cannot stat {:?}: {}", path, e);
                    vec![]
                }
            };
        }

        let mut files: Vec<DiscoveredFile> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && self.is_supported(e.path()))
            .filter_map(|e| {
                let size = e.metadata().ok()?.len();
                Some(DiscoveredFile {
                    path: e.into_path(),
                    size,
                })
            })
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!("Discovered {} image file(s) under {:?}", files.len(), path);
        files
    }

    /// Check if a file has a supported extension (case-insensitive).
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Get total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
