//! Project manifest (litsprite.yaml) parsing.
//!
//! The manifest names the source images of a project, where generated maps
//! go, and the default generation and shading options.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LitError, Result};
use crate::preview::ShadingSettings;
use crate::types::{MapKind, ParameterSet};

/// The name of the manifest file.
pub const MANIFEST_FILENAME: &str = "litsprite.yaml";

/// Project manifest loaded from litsprite.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Source directories or files to scan for images.
    /// Defaults to the project directory if empty.
    pub sources: Vec<String>,

    /// Output directory for generated maps. Maps are written next to their
    /// source image when unset.
    pub output: Option<PathBuf>,

    /// Patterns to exclude from discovery.
    pub excludes: Vec<String>,

    /// Group numbered files (`walk_01.png`, `walk_02.png`) into animations.
    pub animate: bool,

    /// Maps written by `litsprite generate`.
    pub maps: Vec<MapKind>,

    /// Default generation options for every sprite.
    pub parameters: ParameterSet,

    /// Preview shading.
    pub shading: ShadingSettings,

    /// Animation frame interval in milliseconds.
    pub frame_interval_ms: u64,

    /// Quiet period before a burst of file changes is handled.
    pub debounce_ms: u64,

    /// Integer zoom of exported previews.
    pub zoom: Option<u32>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            sources: vec![],
            output: None,
            excludes: vec![],
            animate: true,
            maps: MapKind::ALL.to_vec(),
            parameters: ParameterSet::default(),
            shading: ShadingSettings::default(),
            frame_interval_ms: 100,
            debounce_ms: 250,
            zoom: None,
        }
    }
}

impl Manifest {
    /// Load manifest from a litsprite.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LitError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse manifest from YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        let mut manifest: Manifest = serde_yaml::from_str(content).map_err(|e| LitError::Parse {
            message: format!("Invalid manifest: {}", e),
            help: Some(format!("Check {} syntax", MANIFEST_FILENAME)),
        })?;
        manifest.validate()?;
        manifest.parameters.clamp_to_ranges();
        Ok(manifest)
    }

    /// Serialize back to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| LitError::Config {
            message: format!("Cannot serialize manifest: {}", e),
            help: None,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.frame_interval_ms == 0 {
            return Err(LitError::Config {
                message: "frame_interval_ms must be greater than zero".to_string(),
                help: Some("The default is 100".to_string()),
            });
        }
        if self.zoom == Some(0) {
            return Err(LitError::Config {
                message: "zoom must be at least 1".to_string(),
                help: None,
            });
        }
        Ok(())
    }

    /// Check if a path should be excluded based on exclude patterns.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy().replace('\\', "/");
        self.excludes
            .iter()
            .any(|pattern| matches_pattern(&path_str, pattern))
    }

    /// Get effective source paths, defaulting to the current directory.
    pub fn effective_sources(&self) -> Vec<String> {
        if self.sources.is_empty() {
            vec![".".to_string()]
        } else {
            self.sources.clone()
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn effective_zoom(&self) -> u32 {
        self.zoom.unwrap_or(1)
    }
}

/// Simple glob matching: `*.ext`, `dir/*`, `**/dir/*`, or a plain substring.
fn matches_pattern(path: &str, pattern: &str) -> bool {
    if let Some(rest) = pattern.strip_prefix("**/") {
        if let Some(dir) = rest.strip_suffix("/*") {
            return path.starts_with(&format!("{}/", dir)) || path.contains(&format!("/{}/", dir));
        }
        return path.contains(rest);
    }

    if let Some(suffix) = pattern.strip_prefix('*') {
        if !pattern.contains('/') {
            return path.ends_with(suffix);
        }
    }

    if let Some(dir) = pattern.strip_suffix("/*") {
        return path.starts_with(&format!("{}/", dir)) || path.contains(&format!("/{}/", dir));
    }

    path.contains(pattern)
}
