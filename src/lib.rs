//! litsprite - Lighting maps and lit previews for 2D sprites
//!
//! Generates normal, parallax, specular and occlusion maps from sprite
//! images, and composites the selected sprites under a set of point lights
//! into a lit preview.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod generate;
pub mod image_io;
pub mod output;
pub mod preview;
pub mod project;
pub mod sprite;
pub mod tools;
pub mod types;
pub mod watch;
pub mod workspace;

pub use config::{Manifest, MANIFEST_FILENAME};
pub use discovery::{discover, discover_paths, DiscoveryResult, ScanResult, SpriteSource};
pub use error::{LitError, Result};
pub use generate::{generate, MapSources, NeighbourTile, Neighbours};
pub use image_io::{export_maps, write_png, FsImageLoader, ImageLoader};
pub use preview::{Compositor, Selection, ShadingSettings, SpriteLayer, Viewport};
pub use project::ProjectRecord;
pub use sprite::{Frame, MapState, Processor};
pub use tools::{BrushTool, PixelBrush, ToolConfig, ToolRegistry};
pub use types::{Colour, LightSource, MapKind, ParameterSet, Setting, ViewMode};
pub use watch::SourceWatcher;
pub use workspace::{RenderedPreview, Workspace};
