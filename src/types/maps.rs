//! Generated map kinds and preview view modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LitError, Result};

/// One kind of generated lighting map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapKind {
    Normal,
    Parallax,
    Specular,
    Occlusion,
}

impl MapKind {
    /// All map kinds, in cache-slot order.
    pub const ALL: [MapKind; 4] = [
        MapKind::Normal,
        MapKind::Parallax,
        MapKind::Specular,
        MapKind::Occlusion,
    ];

    /// Cache slot index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// File name suffix used when exporting this map.
    pub fn suffix(self) -> &'static str {
        match self {
            MapKind::Normal => "_n",
            MapKind::Parallax => "_p",
            MapKind::Specular => "_s",
            MapKind::Occlusion => "_o",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MapKind::Normal => "normal",
            MapKind::Parallax => "parallax",
            MapKind::Specular => "specular",
            MapKind::Occlusion => "occlusion",
        }
    }
}

impl fmt::Display for MapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MapKind {
    type Err = LitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "n" => Ok(MapKind::Normal),
            "parallax" | "height" | "p" => Ok(MapKind::Parallax),
            "specular" | "s" => Ok(MapKind::Specular),
            "occlusion" | "ao" | "o" => Ok(MapKind::Occlusion),
            other => Err(LitError::Parse {
                message: format!("Unknown map kind '{}'", other),
                help: Some("Use one of: normal, parallax, specular, occlusion".to_string()),
            }),
        }
    }
}

/// Which image the preview displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// The raw diffuse texture.
    Texture,
    Normal,
    Specular,
    Parallax,
    Occlusion,
    /// The lit composition.
    #[default]
    Preview,
}

impl ViewMode {
    /// The generated map shown by this mode, if any.
    pub fn map_kind(self) -> Option<MapKind> {
        match self {
            ViewMode::Normal => Some(MapKind::Normal),
            ViewMode::Specular => Some(MapKind::Specular),
            ViewMode::Parallax => Some(MapKind::Parallax),
            ViewMode::Occlusion => Some(MapKind::Occlusion),
            ViewMode::Texture | ViewMode::Preview => None,
        }
    }
}

impl FromStr for ViewMode {
    type Err = LitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "texture" | "diffuse" => Ok(ViewMode::Texture),
            "preview" | "lit" => Ok(ViewMode::Preview),
            other => other.parse::<MapKind>().map(ViewMode::from).map_err(|_| LitError::Parse {
                message: format!("Unknown view mode '{}'", other),
                help: Some(
                    "Use one of: texture, normal, specular, parallax, occlusion, preview"
                        .to_string(),
                ),
            }),
        }
    }
}

impl From<MapKind> for ViewMode {
    fn from(kind: MapKind) -> Self {
        match kind {
            MapKind::Normal => ViewMode::Normal,
            MapKind::Parallax => ViewMode::Parallax,
            MapKind::Specular => ViewMode::Specular,
            MapKind::Occlusion => ViewMode::Occlusion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_match_all() {
        for (i, kind) in MapKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_parse_map_kind() {
        assert_eq!("Normal".parse::<MapKind>().unwrap(), MapKind::Normal);
        assert_eq!("ao".parse::<MapKind>().unwrap(), MapKind::Occlusion);
        assert!("albedo".parse::<MapKind>().is_err());
    }

    #[test]
    fn test_parse_view_mode() {
        assert_eq!("diffuse".parse::<ViewMode>().unwrap(), ViewMode::Texture);
        assert_eq!("specular".parse::<ViewMode>().unwrap(), ViewMode::Specular);
        assert_eq!("preview".parse::<ViewMode>().unwrap(), ViewMode::Preview);
        assert!("wireframe".parse::<ViewMode>().is_err());
    }

    #[test]
    fn test_view_mode_map_kind() {
        assert_eq!(ViewMode::Parallax.map_kind(), Some(MapKind::Parallax));
        assert_eq!(ViewMode::Preview.map_kind(), None);
    }
}
