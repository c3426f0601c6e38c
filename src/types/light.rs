//! Point lights of the preview.

use glam::Vec3;

use super::Colour;

/// A point light hovering above the sprite plane.
///
/// `position.x`/`position.y` are view pixels (y down); `position.z` is the
/// light's height above the texture plane, in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct LightSource {
    pub position: Vec3,
    pub diffuse_color: Colour,
    pub specular_color: Colour,
    pub diffuse_intensity: f32,
    pub specular_intensity: f32,
    /// Exponent of the specular lobe; larger is sharper.
    pub specular_scatter: f32,
}

impl Default for LightSource {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 64.0),
            diffuse_color: Colour::LIGHT,
            specular_color: Colour::LIGHT,
            diffuse_intensity: 0.8,
            specular_intensity: 0.6,
            specular_scatter: 32.0,
        }
    }
}

impl LightSource {
    /// Create a default light at the given plane position and height.
    pub fn at(x: f32, y: f32, height: f32) -> Self {
        Self {
            position: Vec3::new(x, y, height),
            ..Default::default()
        }
    }

    /// Distance from the texture plane.
    pub fn height(&self) -> f32 {
        self.position.z
    }

    pub fn set_height(&mut self, height: f32) {
        self.position.z = height.max(0.0);
    }

    /// Set both diffuse and specular colour.
    pub fn set_color(&mut self, color: Colour) {
        self.diffuse_color = color;
        self.specular_color = color;
    }

    /// Unit vector from `point` (on the texture plane) towards the light.
    pub fn direction_from(&self, point: Vec3) -> Vec3 {
        (self.position - point).normalize_or(Vec3::Z)
    }
}
