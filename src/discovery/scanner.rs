//! File system scanner for discovering source images.
//!
//! Recursively scans directories for images the loader can decode, skipping
//! maps and previews this tool wrote itself.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Manifest;
use crate::image_io::{is_image, PREVIEW_SUFFIX};
use crate::types::MapKind;

/// Result of scanning for source images.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Discovered images, sorted within each scanned directory.
    pub images: Vec<PathBuf>,
    /// Generated maps that were skipped.
    pub skipped: Vec<PathBuf>,
}

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Merge another scan result into this one, dropping repeated paths.
    pub fn merge(&mut self, other: ScanResult) {
        for path in other.images {
            if !self.images.contains(&path) {
                self.images.push(path);
            }
        }
        self.skipped.extend(other.skipped);
    }
}

/// Whether `path` looks like a map or preview written by this tool
/// (`hero_n.png`, `hero_v.png`).
pub fn is_generated(path: &Path) -> bool {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    MapKind::ALL
        .iter()
        .map(|k| k.suffix())
        .chain(std::iter::once(PREVIEW_SUFFIX))
        .any(|suffix| stem.len() > suffix.len() && stem.ends_with(suffix))
}

/// Scan a directory, or accept a single image file.
pub fn scan_directory(root: &Path, manifest: &Manifest) -> ScanResult {
    let mut result = ScanResult::new();

    if !root.exists() {
        return result;
    }

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if path.is_dir() || !is_image(path) || manifest.is_excluded(path) {
            continue;
        }

        if is_generated(path) {
            result.skipped.push(path.to_path_buf());
        } else {
            result.images.push(path.to_path_buf());
        }
    }

    result
}

/// Scan multiple source paths relative to `base_path`.
pub fn scan_sources(sources: &[String], base_path: &Path, manifest: &Manifest) -> ScanResult {
    let mut result = ScanResult::new();

    for source in sources {
        let source_path = if Path::new(source).is_absolute() {
            PathBuf::from(source)
        } else {
            base_path.join(source)
        };

        result.merge(scan_directory(&source_path, manifest));
    }

    result
}
