//! Core domain types for litsprite.
//!
//! - `Colour` - RGBA colour values
//! - `LightSource` - preview point lights
//! - `MapKind` / `ViewMode` - generated maps and what the preview shows
//! - `ParameterSet` - per-sprite generation options and the invalidation table

mod colour;
mod light;
mod maps;
pub mod params;

pub use colour::Colour;
pub use light::LightSource;
pub use maps::{MapKind, ViewMode};
pub use params::{
    NormalParams, OcclusionParams, Param, ParallaxMode, ParallaxParams, ParameterSet, Setting,
    SpecularParams,
};
