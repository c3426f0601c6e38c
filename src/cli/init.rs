//! Init command implementation.
//!
//! Generates a `litsprite.yaml` manifest from discovered source images.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use crate::config::{Manifest, MANIFEST_FILENAME};
use crate::discovery::discover;
use crate::error::{LitError, Result};
use crate::output::{display_path, plural, Printer};

/// Initialize a litsprite project by generating a litsprite.yaml manifest
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to scan (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Directory for generated maps, relative to the project
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Overwrite existing litsprite.yaml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<()> {
    let manifest_path = args.path.join(MANIFEST_FILENAME);

    if manifest_path.exists() && !args.force {
        return Err(LitError::Config {
            message: format!("{} already exists", MANIFEST_FILENAME),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    // No manifest yet (or it is being replaced), so scan everything
    printer.status("Scanning", &display_path(&args.path));
    let discovery = discover(&args.path)?;
    let source_dirs = source_dirs(&discovery.root, &discovery.scan.images);

    let mut manifest = Manifest {
        output: args.output.clone(),
        ..Manifest::default()
    };
    if !(source_dirs.is_empty() || (source_dirs.len() == 1 && source_dirs.contains("."))) {
        manifest.sources = source_dirs.iter().cloned().collect();
    }

    let yaml = manifest.to_yaml()?;
    fs::write(&manifest_path, yaml).map_err(|e| LitError::Io {
        path: manifest_path.clone(),
        message: format!("Failed to write manifest: {}", e),
    })?;

    if !source_dirs.is_empty() {
        let dirs: Vec<&str> = source_dirs.iter().map(String::as_str).collect();
        printer.info("Discovered", &dirs.join(", "));
    }

    printer.success(
        "Created",
        &format!(
            "{} ({} found)",
            MANIFEST_FILENAME,
            plural(discovery.sprites.len(), "sprite", "sprites")
        ),
    );

    Ok(())
}

/// Unique parent directories of `files`, relative to `root`.
fn source_dirs(root: &Path, files: &[PathBuf]) -> BTreeSet<String> {
    files
        .iter()
        .filter_map(|file| file.parent())
        .map(|parent| {
            let relative = parent.strip_prefix(root).unwrap_or(parent);
            if relative.as_os_str().is_empty() {
                ".".to_string()
            } else {
                format!("{}/", relative.display())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    fn image(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255])).save(path).unwrap();
    }

    fn args(path: &Path, force: bool) -> InitArgs {
        InitArgs {
            path: path.to_path_buf(),
            output: None,
            force,
        }
    }

    #[test]
    fn test_init_creates_manifest() {
        let dir = tempdir().unwrap();
        image(&dir.path().join("hero.png"));

        run(args(dir.path(), false), &Printer::plain()).unwrap();

        let manifest = Manifest::load(&dir.path().join(MANIFEST_FILENAME)).unwrap();
        assert!(manifest.sources.is_empty());
        assert_eq!(manifest.output, None);
        assert_eq!(manifest, Manifest::default());
    }

    #[test]
    fn test_init_errors_if_manifest_exists() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILENAME), "output: build").unwrap();

        let result = run(args(dir.path(), false), &Printer::plain());
        assert!(matches!(result, Err(LitError::Config { .. })));
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILENAME), "output: build").unwrap();

        let mut a = args(dir.path(), true);
        a.output = Some(PathBuf::from("maps"));
        run(a, &Printer::plain()).unwrap();

        let manifest = Manifest::load(&dir.path().join(MANIFEST_FILENAME)).unwrap();
        assert_eq!(manifest.output, Some(PathBuf::from("maps")));
    }

    #[test]
    fn test_init_discovers_source_directories() {
        let dir = tempdir().unwrap();
        image(&dir.path().join("sprites/hero.png"));
        image(&dir.path().join("tiles/wall.png"));

        run(args(dir.path(), false), &Printer::plain()).unwrap();

        let manifest = Manifest::load(&dir.path().join(MANIFEST_FILENAME)).unwrap();
        assert_eq!(manifest.sources, vec!["sprites/".to_string(), "tiles/".to_string()]);
    }

    #[test]
    fn test_source_dirs_relative_to_root() {
        let dirs = source_dirs(
            Path::new("/proj"),
            &[PathBuf::from("/proj/a.png"), PathBuf::from("/proj/art/b.png")],
        );
        assert_eq!(dirs.into_iter().collect::<Vec<_>>(), [".", "art/"]);
    }
}
