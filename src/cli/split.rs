//! Split command implementation.
//!
//! Cuts a sprite sheet into equal cells and writes each as a numbered frame
//! image, ready to be picked up as an animation.

use std::path::PathBuf;

use clap::Args;

use crate::error::{LitError, Result};
use crate::image_io::{unpremultiply, write_png, FsImageLoader, ImageLoader};
use crate::output::{display_path, plural, Printer};
use crate::sprite::{split, Processor};

/// Split a sprite sheet into numbered frame images
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Sprite sheet to split
    #[arg(required = true)]
    pub input: PathBuf,

    /// Frame grid as HxV (e.g. 4x2)
    #[arg(long, short)]
    pub grid: String,

    /// Output directory (default: next to the sheet)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(args: SplitArgs, printer: &Printer) -> Result<Vec<PathBuf>> {
    let path = &args.input;
    if !path.exists() {
        return Err(LitError::Io {
            path: path.clone(),
            message: format!("File not found: {}", display_path(path)),
        });
    }

    let (columns, rows) = split::parse_grid(&args.grid)?;

    printer.status("Loading", &display_path(path));
    let mut sheet = Processor::new(sheet_name(path));
    sheet.load_image(path.clone(), FsImageLoader.load(path)?)?;

    let frames = sheet.split_into_frames(columns, rows)?;
    let mut written = Vec::with_capacity(frames.frame_count());
    for frame in frames.frames() {
        let target = match (&args.output, frame.path().file_name()) {
            (Some(dir), Some(name)) => dir.join(name),
            _ => frame.path().to_path_buf(),
        };
        write_png(&unpremultiply(frame.diffuse()), &target, 1)?;
        printer.status("Wrote", &printer.cyan(&display_path(&target)));
        written.push(target);
    }

    let (w, h) = frames.dimensions().unwrap_or_default();
    printer.success(
        "Finished",
        &format!("{} of {}x{}", plural(written.len(), "frame", "frames"), w, h),
    );
    Ok(written)
}

fn sheet_name(path: &std::path::Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sheet".to_string())
}
