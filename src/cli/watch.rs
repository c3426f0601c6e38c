//! Watch command implementation.
//!
//! Generates maps once, then keeps them in sync with their sources: every
//! settled change to a source image reloads it, regenerates what it
//! invalidated and rewrites that sprite's maps.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;

use crate::error::Result;
use crate::image_io::{export_maps, FsImageLoader, ImageLoader};
use crate::output::{display_path, plural, Printer};
use crate::types::MapKind;
use crate::watch::SourceWatcher;
use crate::workspace::Workspace;

use super::generate::export_workspace;
use super::{discover_inputs, load_workspace};

/// Regenerate maps whenever a source image changes
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Image files or directories (default: current directory)
    pub paths: Vec<PathBuf>,

    /// Output directory (default: next to each source image)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Maps to write, comma separated (default: all)
    #[arg(long, value_delimiter = ',')]
    pub maps: Vec<MapKind>,

    /// Quiet period in milliseconds before a burst of changes is handled
    #[arg(long)]
    pub debounce: Option<u64>,
}

pub fn run(args: WatchArgs, printer: &Printer) -> Result<()> {
    let discovery = discover_inputs(&args.paths)?;
    let manifest = &discovery.manifest;
    let mut workspace = load_workspace(&discovery, printer);
    if workspace.is_empty() {
        printer.warning("Warning", "No source images found");
        return Ok(());
    }

    let kinds = if args.maps.is_empty() { manifest.maps.clone() } else { args.maps.clone() };
    let out_dir = args
        .output
        .clone()
        .or_else(|| manifest.output.as_ref().map(|o| discovery.root.join(o)));
    let debounce = args
        .debounce
        .map(Duration::from_millis)
        .unwrap_or_else(|| manifest.debounce());

    workspace.regenerate_all();
    export_workspace(&mut workspace, &kinds, out_dir.as_deref(), printer)?;

    let mut watcher = SourceWatcher::new(debounce)?;
    watcher.watch_files(&workspace.watched_paths())?;
    printer.info(
        "Watching",
        &format!("{} (Ctrl-C to stop)", plural(watcher.len(), "file", "files")),
    );

    loop {
        let changed = watcher.recv()?;
        for path in changed {
            match handle_change(&mut workspace, &path, &kinds, out_dir.as_deref(), &FsImageLoader) {
                Ok(0) => {}
                Ok(n) => printer.success(
                    "Updated",
                    &format!("{} {}", display_path(&path), printer.dim(&format!("({})", plural(n, "map", "maps")))),
                ),
                Err(e) => printer.error("Error", &format!("{}: {}", display_path(&path), e)),
            }
        }
    }
}

/// Reload `path` and rewrite the maps of every sprite that reads it.
/// Returns the number of map files written.
pub(crate) fn handle_change(
    workspace: &mut Workspace,
    path: &Path,
    kinds: &[MapKind],
    out_dir: Option<&Path>,
    loader: &dyn ImageLoader,
) -> Result<usize> {
    if workspace.on_source_changed(path, loader)? == 0 {
        return Ok(0);
    }

    let mut written = 0;
    for processor in workspace.processors_mut() {
        if !processor.source_paths().iter().any(|p| p == path) {
            continue;
        }
        processor.regenerate();
        written += export_maps(processor, kinds, out_dir)?.len();
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParameterSet;
    use image::{Rgba, RgbaImage};
    use std::fs;
    use tempfile::tempdir;

    fn save(path: &Path, value: u8) {
        RgbaImage::from_pixel(4, 4, Rgba([value, value, value, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_handle_change_rewrites_maps() {
        let dir = tempdir().unwrap();
        let rock = dir.path().join("rock.png");
        let wall = dir.path().join("wall.png");
        save(&rock, 10);
        save(&wall, 10);

        let mut ws = Workspace::new();
        let params = ParameterSet::default();
        ws.load_sprite("rock", &[rock.clone()], &params, &FsImageLoader).unwrap();
        ws.load_sprite("wall", &[wall.clone()], &params, &FsImageLoader).unwrap();
        ws.regenerate_all();

        save(&rock, 200);
        let written = handle_change(&mut ws, &rock, &[MapKind::Normal], None, &FsImageLoader).unwrap();

        assert_eq!(written, 1);
        assert!(dir.path().join("rock_n.png").exists());
        assert!(!dir.path().join("wall_n.png").exists());
    }

    #[test]
    fn test_handle_change_skips_empty_and_unknown_files() {
        let dir = tempdir().unwrap();
        let rock = dir.path().join("rock.png");
        save(&rock, 10);

        let mut ws = Workspace::new();
        ws.load_sprite("rock", &[rock.clone()], &ParameterSet::default(), &FsImageLoader)
            .unwrap();

        fs::write(&rock, b"").unwrap();
        assert_eq!(handle_change(&mut ws, &rock, &MapKind::ALL, None, &FsImageLoader).unwrap(), 0);

        let other = dir.path().join("other.png");
        save(&other, 10);
        assert_eq!(handle_change(&mut ws, &other, &MapKind::ALL, None, &FsImageLoader).unwrap(), 0);
        assert!(!dir.path().join("rock_n.png").exists());
    }
}
