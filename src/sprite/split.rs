//! Splitting a sprite sheet into animation frames.

use std::path::{Path, PathBuf};

use image::{imageops, RgbaImage};

use crate::error::{LitError, Result};

/// Digits needed to write every index below `count`, at least one.
pub fn index_width(count: u32) -> usize {
    count.saturating_sub(1).max(1).ilog10() as usize + 1
}

/// Synthetic path of cell `index` out of `count`: `<stem>_<NN><.ext>`.
///
/// Indices are zero-padded so the names sort in cell order.
pub fn frame_path(path: &Path, index: u32, count: u32) -> PathBuf {
    let number = format!("{:0width$}", index, width = index_width(count));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, number, ext.to_string_lossy()),
        None => format!("{}_{}", stem, number),
    };
    path.with_file_name(name)
}

/// Cut `image` into `columns` x `rows` equal cells, row by row.
///
/// Cells are `width / columns` by `height / rows`; leftover pixels on the
/// right and bottom edges are dropped.
pub fn cells(image: &RgbaImage, columns: u32, rows: u32) -> Result<Vec<RgbaImage>> {
    let (w, h) = image.dimensions();
    if columns == 0 || rows == 0 || columns > w || rows > h {
        return Err(LitError::InvalidArgument {
            message: format!("Cannot split a {}x{} image into {}x{} frames", w, h, columns, rows),
            help: Some("Use between 1 frame and one frame per pixel on each axis".to_string()),
        });
    }

    let (cell_w, cell_h) = (w / columns, h / rows);
    let mut out = Vec::with_capacity((columns * rows) as usize);
    for row in 0..rows {
        for col in 0..columns {
            out.push(imageops::crop_imm(image, col * cell_w, row * cell_h, cell_w, cell_h).to_image());
        }
    }
    Ok(out)
}

/// Parse a "HxV" frame grid such as `4x2`.
pub fn parse_grid(s: &str) -> Result<(u32, u32)> {
    let parts: Vec<&str> = s.splitn(2, ['x', 'X']).collect();
    if parts.len() != 2 {
        return Err(LitError::Parse {
            message: format!("Invalid frame grid '{}': expected HxV (e.g. 4x2)", s),
            help: Some("Use the format HxV, for example: 4x1, 8x2".to_string()),
        });
    }

    let parse = |part: &str, axis: &str| -> Result<u32> {
        match part.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(LitError::Parse {
                message: format!("Invalid {} frame count '{}' in '{}'", axis, part, s),
                help: Some("Frame counts must be positive integers".to_string()),
            }),
        }
    };

    Ok((parse(parts[0], "horizontal")?, parse(parts[1], "vertical")?))
}
