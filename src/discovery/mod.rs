//! Finding the source images of a litsprite project.
//!
//! A project is either a directory with a `litsprite.yaml` manifest, or any
//! directory or list of files scanned by convention. Discovered images are
//! grouped into sprites: numbered files become animation frames.
//!
//! # Example
//!
//! ```ignore
//! use litsprite::discovery::discover;
//!
//! let result = discover("./art")?;
//! for sprite in &result.sprites {
//!     println!("{}: {} frame(s)", sprite.name, sprite.files.len());
//! }
//! ```

mod scanner;
mod sequence;

use std::path::{Path, PathBuf};

use crate::config::{Manifest, MANIFEST_FILENAME};
use crate::error::Result;

pub use scanner::{is_generated, scan_directory, scan_sources, ScanResult};
pub use sequence::{group_sequences, SpriteSource};

/// Result of discovering sprites in a project.
#[derive(Debug)]
pub struct DiscoveryResult {
    /// The project root directory.
    pub root: PathBuf,

    /// The loaded manifest (default if no litsprite.yaml was found).
    pub manifest: Manifest,

    /// Whether a litsprite.yaml manifest was found.
    pub has_manifest: bool,

    /// Scan results with discovered files.
    pub scan: ScanResult,

    /// Discovered images grouped into sprites.
    pub sprites: Vec<SpriteSource>,
}

/// Discover sprites in a project directory.
///
/// Uses the manifest's sources and options when `litsprite.yaml` exists in
/// `root`, otherwise scans all of `root`.
pub fn discover(root: impl AsRef<Path>) -> Result<DiscoveryResult> {
    let root = root.as_ref().to_path_buf();

    let manifest_path = root.join(MANIFEST_FILENAME);
    let (manifest, has_manifest) = if manifest_path.exists() {
        (Manifest::load(&manifest_path)?, true)
    } else {
        (Manifest::default(), false)
    };

    let scan = scan_sources(&manifest.effective_sources(), &root, &manifest);
    let sprites = group_sequences(&scan.images, manifest.animate);

    Ok(DiscoveryResult {
        root,
        manifest,
        has_manifest,
        scan,
        sprites,
    })
}

/// Discover sprites from explicit files and directories, with a given
/// manifest and no manifest lookup.
pub fn discover_paths(paths: &[PathBuf], manifest: Manifest) -> Result<DiscoveryResult> {
    let mut scan = ScanResult::new();
    for path in paths {
        scan.merge(scan_directory(path, &manifest));
    }
    let sprites = group_sequences(&scan.images, manifest.animate);

    let root = paths
        .first()
        .and_then(|p| if p.is_dir() { Some(p.as_path()) } else { p.parent() })
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(DiscoveryResult {
        root,
        manifest,
        has_manifest: false,
        scan,
        sprites,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_discover_empty_directory() {
        let dir = tempdir().unwrap();

        let result = discover(dir.path()).unwrap();

        assert!(!result.has_manifest);
        assert!(result.scan.is_empty());
        assert!(result.sprites.is_empty());
    }

    #[test]
    fn test_discover_groups_animations() {
        let dir = tempdir().unwrap();
        for name in ["walk_2.png", "walk_1.png", "rock.png", "rock_n.png"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let result = discover(dir.path()).unwrap();

        let names: Vec<&str> = result.sprites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["rock", "walk"]);
        assert_eq!(result.sprites[1].files.len(), 2);
        assert!(result.sprites[1].files[0].ends_with("walk_1.png"));
    }

    #[test]
    fn test_discover_with_manifest() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("litsprite.yaml"),
            r#"
sources:
  - art/
output: maps
animate: false
"#,
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("art")).unwrap();
        fs::write(dir.path().join("art/walk_1.png"), b"").unwrap();
        fs::write(dir.path().join("art/walk_2.png"), b"").unwrap();
        fs::write(dir.path().join("ignored.png"), b"").unwrap();

        let result = discover(dir.path()).unwrap();

        assert!(result.has_manifest);
        assert_eq!(result.manifest.output, Some(PathBuf::from("maps")));
        assert_eq!(result.scan.total(), 2);
        assert_eq!(result.sprites.len(), 2);
    }

    #[test]
    fn test_discover_paths() {
        let dir = tempdir().unwrap();
        let hero = dir.path().join("hero.png");
        fs::write(&hero, b"").unwrap();
        fs::write(dir.path().join("other.png"), b"").unwrap();

        let result = discover_paths(&[hero.clone()], Manifest::default()).unwrap();

        assert_eq!(result.root, dir.path());
        assert_eq!(result.sprites, vec![SpriteSource::single(hero)]);
    }
}
