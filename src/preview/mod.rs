//! Lit preview of the selected sprites.
//!
//! The compositor never owns sprites or lights. Each render receives a
//! [`Selection`] snapshot: the layers to draw and the light list that is
//! active for them.

mod compositor;
mod settings;
pub mod shading;

pub use compositor::{Compositor, Selection, SpriteLayer, Viewport};
pub use settings::{ShadingSettings, AMBIENT_SLIDER, BLEND_SLIDER, TOON_BANDS};
