//! Global shading options of the preview.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::types::Colour;

/// Ambient light slider domain; intensity is `ambient_light / 100`.
pub const AMBIENT_SLIDER: RangeInclusive<i32> = 0..=100;

/// Blend slider domain; the lit/unlit mix is `blend / 100`.
pub const BLEND_SLIDER: RangeInclusive<i32> = 0..=100;

/// Number of bands the toon style posterizes shading into.
pub const TOON_BANDS: f32 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingSettings {
    #[serde(rename = "ambient color")]
    pub ambient_color: Colour,
    #[serde(rename = "ambient light")]
    pub ambient_light: i32,
    #[serde(rename = "background color")]
    pub background: Colour,
    pub blend: i32,
    /// Largest parallax displacement, in texture pixels.
    #[serde(rename = "parallax height")]
    pub parallax_height: f32,
    pub pixelated: bool,
    pub toon: bool,
}

impl Default for ShadingSettings {
    fn default() -> Self {
        Self {
            ambient_color: Colour::WHITE,
            ambient_light: 50,
            background: Colour::BACKGROUND,
            blend: 100,
            parallax_height: 6.0,
            pixelated: false,
            toon: false,
        }
    }
}

impl ShadingSettings {
    pub fn ambient_intensity(&self) -> f32 {
        self.ambient_light.clamp(*AMBIENT_SLIDER.start(), *AMBIENT_SLIDER.end()) as f32 / 100.0
    }

    /// Mix factor between the unlit texture (0) and the lit result (1).
    pub fn blend_factor(&self) -> f32 {
        self.blend.clamp(*BLEND_SLIDER.start(), *BLEND_SLIDER.end()) as f32 / 100.0
    }
}
