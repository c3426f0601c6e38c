//! Image decoding and PNG output.
//!
//! The core only ever sees decoded, premultiplied RGBA buffers. Decoding
//! happens behind [`ImageLoader`] so callers can swap the filesystem for
//! something else (tests use an in-memory loader).

use std::fs;
use std::path::{Path, PathBuf};

use image::{imageops, RgbaImage};
use log::debug;

use crate::error::{LitError, Result};
use crate::sprite::Processor;
use crate::types::MapKind;

/// File extensions the loader accepts.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tga"];

/// Suffix of exported previews.
pub const PREVIEW_SUFFIX: &str = "_v";

/// Source of decoded images.
pub trait ImageLoader {
    /// Decode `path` into premultiplied RGBA.
    fn load(&self, path: &Path) -> Result<RgbaImage>;

    /// Current size of the file in bytes.
    fn file_len(&self, path: &Path) -> Result<u64>;
}

/// Loads images from disk with the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageLoader;

impl ImageLoader for FsImageLoader {
    fn load(&self, path: &Path) -> Result<RgbaImage> {
        let decoded = image::open(path).map_err(|e| LitError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut pixels = decoded.to_rgba8();
        premultiply(&mut pixels);
        debug!("decoded {} ({}x{})", path.display(), pixels.width(), pixels.height());
        Ok(pixels)
    }

    fn file_len(&self, path: &Path) -> Result<u64> {
        fs::metadata(path).map(|m| m.len()).map_err(|e| LitError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Whether `path` has one of the [`IMAGE_EXTENSIONS`].
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Multiply colour channels by alpha, in place.
pub fn premultiply(image: &mut RgbaImage) {
    for p in image.pixels_mut() {
        let a = p.0[3] as u32;
        for c in &mut p.0[..3] {
            *c = ((*c as u32 * a + 127) / 255) as u8;
        }
    }
}

/// Straight-alpha copy of a premultiplied image.
pub fn unpremultiply(image: &RgbaImage) -> RgbaImage {
    let mut out = image.clone();
    for p in out.pixels_mut() {
        let a = p.0[3] as u32;
        if a == 0 {
            continue;
        }
        for c in &mut p.0[..3] {
            *c = ((*c as u32 * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}

/// Write an image as PNG, scaled up by an integer factor with
/// nearest-neighbour sampling.
pub fn write_png(image: &RgbaImage, path: &Path, scale: u32) -> Result<()> {
    let scale = scale.max(1);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| LitError::Io {
            path: parent.to_path_buf(),
            message: format!("Failed to create output directory: {}", e),
        })?;
    }

    let result = if scale == 1 {
        image.save(path)
    } else {
        imageops::resize(
            image,
            image.width() * scale,
            image.height() * scale,
            imageops::FilterType::Nearest,
        )
        .save(path)
    };

    result.map_err(|e| LitError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write PNG: {}", e),
    })
}

/// Output path of a derived image: `<stem><suffix>.png`.
///
/// Without `out_dir` the file sits next to `source`. In `out_dir`, names
/// that already exist get a `(2)`, `(3)` counter after the stem.
pub fn derived_path(source: &Path, suffix: &str, out_dir: Option<&Path>) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sprite".to_string());

    match out_dir {
        None => source.with_file_name(format!("{}{}.png", stem, suffix)),
        Some(dir) => {
            let mut candidate = dir.join(format!("{}{}.png", stem, suffix));
            let mut n = 1;
            while candidate.exists() {
                n += 1;
                candidate = dir.join(format!("{}({}){}.png", stem, n, suffix));
            }
            candidate
        }
    }
}

/// Write the requested maps of every frame of `processor`.
///
/// Returns the written paths in frame order.
pub fn export_maps(
    processor: &mut Processor,
    kinds: &[MapKind],
    out_dir: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for index in 0..processor.frame_count() {
        let source = processor.frames()[index].path().to_path_buf();
        for kind in kinds {
            let Some(map) = processor.frame_map(index, *kind) else {
                continue;
            };
            let path = derived_path(&source, kind.suffix(), out_dir);
            write_png(map, &path, 1)?;
            written.push(path);
        }
    }
    Ok(written)
}
