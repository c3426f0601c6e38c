//! The persisted project record.
//!
//! A project file is JSON with two groups: `general` (preview shading, view
//! mode and the sample lights) and `sprites` (files, override maps and the
//! parameter set of every sprite). Key names follow the existing project
//! files, so colours are `{r, g, b}` and positions `{x, y, z}`.

use std::fs;
use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{LitError, Result};
use crate::generate::{NeighbourTile, Neighbours};
use crate::preview::ShadingSettings;
use crate::sprite::DEFAULT_FRAME_INTERVAL;
use crate::types::{Colour, LightSource, ParameterSet, ViewMode};

/// Extension of project files.
pub const PROJECT_EXTENSION: &str = "litsprite";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectRecord {
    pub general: GeneralSettings,
    pub sprites: Vec<SpriteRecord>,
}

/// Workspace-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    #[serde(flatten)]
    pub shading: ShadingSettings,
    pub viewmode: ViewMode,
    #[serde(rename = "lights per texture")]
    pub lights_per_sprite: bool,
    #[serde(rename = "sample lights")]
    pub sample_lights: Vec<LightRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteRecord {
    pub name: String,
    pub frames: Vec<FrameRecord>,
    pub parameters: ParameterSet,
    /// Milliseconds between animation frames.
    #[serde(rename = "frame interval")]
    pub frame_interval: u64,
    pub position: PlaneRecord,
    /// Private lights, used when lights are per sprite.
    pub lights: Vec<LightRecord>,
}

impl Default for SpriteRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            frames: Vec::new(),
            parameters: ParameterSet::default(),
            frame_interval: DEFAULT_FRAME_INTERVAL.as_millis() as u64,
            position: PlaneRecord::default(),
            lights: Vec::new(),
        }
    }
}

/// Source files of one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub file: PathBuf,
    #[serde(rename = "height map", default, skip_serializing_if = "Option::is_none")]
    pub height_map: Option<PathBuf>,
    #[serde(rename = "specular map", default, skip_serializing_if = "Option::is_none")]
    pub specular_map: Option<PathBuf>,
    /// Neighbour slots that do not wrap onto the frame itself.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub neighbours: Vec<NeighbourRecord>,
}

/// One neighbour slot, `row` 0 north and `col` 0 west. A slot without a
/// file is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighbourRecord {
    pub row: usize,
    pub col: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl NeighbourRecord {
    /// Records for every slot of `neighbours` that is not the frame itself.
    pub fn from_neighbours(neighbours: &Neighbours) -> Vec<Self> {
        let mut records = Vec::new();
        for row in 0..3 {
            for col in 0..3 {
                let file = match neighbours.get(row, col) {
                    NeighbourTile::Itself => continue,
                    NeighbourTile::Empty => None,
                    NeighbourTile::Tile { path, .. } => Some(path.clone()),
                };
                records.push(Self { row, col, file });
            }
        }
        records
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaneRecord {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightRecord {
    pub position: PositionRecord,
    #[serde(rename = "diffuse color")]
    pub diffuse_color: Colour,
    #[serde(rename = "specular color")]
    pub specular_color: Colour,
    #[serde(rename = "diffuse intensity")]
    pub diffuse_intensity: f32,
    #[serde(rename = "specular intensity")]
    pub specular_intensity: f32,
    #[serde(rename = "specular scatter")]
    pub specular_scatter: f32,
}

impl From<Vec2> for PlaneRecord {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<PlaneRecord> for Vec2 {
    fn from(p: PlaneRecord) -> Self {
        Vec2::new(p.x, p.y)
    }
}

impl From<&LightSource> for LightRecord {
    fn from(light: &LightSource) -> Self {
        Self {
            position: PositionRecord {
                x: light.position.x,
                y: light.position.y,
                z: light.position.z,
            },
            diffuse_color: light.diffuse_color,
            specular_color: light.specular_color,
            diffuse_intensity: light.diffuse_intensity,
            specular_intensity: light.specular_intensity,
            specular_scatter: light.specular_scatter,
        }
    }
}

impl From<&LightRecord> for LightSource {
    fn from(record: &LightRecord) -> Self {
        Self {
            position: Vec3::new(record.position.x, record.position.y, record.position.z),
            diffuse_color: record.diffuse_color,
            specular_color: record.specular_color,
            diffuse_intensity: record.diffuse_intensity,
            specular_intensity: record.specular_intensity,
            specular_scatter: record.specular_scatter,
        }
    }
}

/// Convert a light list for storage.
pub fn lights_to_records(lights: &[LightSource]) -> Vec<LightRecord> {
    lights.iter().map(LightRecord::from).collect()
}

pub fn lights_from_records(records: &[LightRecord]) -> Vec<LightSource> {
    records.iter().map(LightSource::from).collect()
}

impl ProjectRecord {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| LitError::Parse {
            message: format!("Cannot serialize project: {}", e),
            help: None,
        })
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let mut record: Self = serde_json::from_str(content).map_err(|e| LitError::Parse {
            message: format!("Invalid project file: {}", e),
            help: Some("Project files are JSON with `general` and `sprites` groups".to_string()),
        })?;
        for sprite in &mut record.sprites {
            sprite.parameters.clamp_to_ranges();
        }
        Ok(record)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| LitError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to write project: {}", e),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| LitError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read project: {}", e),
        })?;
        Self::from_json(&content)
    }

    /// Every file the project refers to.
    pub fn files(&self) -> Vec<&Path> {
        self.sprites
            .iter()
            .flat_map(|s| &s.frames)
            .flat_map(|f| {
                std::iter::once(f.file.as_path())
                    .chain(f.height_map.as_deref())
                    .chain(f.specular_map.as_deref())
                    .chain(f.neighbours.iter().filter_map(|n| n.file.as_deref()))
            })
            .collect()
    }
}
