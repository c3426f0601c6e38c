//! The per-sprite parameter set and its invalidation table.
//!
//! Every slider of the map generators lives in [`ParameterSet`]. Values are
//! stored the way the sliders produce them (integers), except contrast which
//! is kept as a multiplier of the slider value times [`CONTRAST_SCALE`].
//! The numeric ranges below are a calibration contract: changing them changes
//! the visual output of every saved project.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::MapKind;

/// Contrast multiplier per slider step.
pub const CONTRAST_SCALE: f32 = 0.001;

/// Contrast slider domain (multiplier 0.0 to 5.0).
pub const CONTRAST_SLIDER: RangeInclusive<i32> = 0..=5000;

/// Brightness slider domain, in 8-bit levels.
pub const BRIGHTNESS_SLIDER: RangeInclusive<i32> = -255..=255;

/// Blur radius slider domain, in pixels.
pub const BLUR_SLIDER: RangeInclusive<i32> = 0..=50;

/// Normal and bevel depth slider domain (divided by [`DEPTH_SCALE`]).
pub const DEPTH_SLIDER: RangeInclusive<i32> = 0..=1000;

/// Depth units per unit of gradient scale.
pub const DEPTH_SCALE: f32 = 100.0;

/// Bevel width slider domain, in pixels.
pub const BEVEL_DISTANCE_SLIDER: RangeInclusive<i32> = 0..=100;

/// 8-bit threshold slider domain.
pub const THRESHOLD_SLIDER: RangeInclusive<i32> = 0..=255;

/// Parallax soft band slider domain.
pub const SOFT_SLIDER: RangeInclusive<i32> = 0..=100;

/// Parallax focus slider domain; the easing gamma is `focus / FOCUS_SCALE`.
pub const FOCUS_SLIDER: RangeInclusive<i32> = 1..=100;

/// Focus units per unit of gamma.
pub const FOCUS_SCALE: f32 = 10.0;

/// Quantization level count domain.
pub const QUANTIZATION_SLIDER: RangeInclusive<i32> = 2..=64;

/// Erode (negative) / dilate (positive) radius domain.
pub const ERODE_DILATE_SLIDER: RangeInclusive<i32> = -20..=20;

/// Occlusion distance slider domain, in pixels.
pub const DISTANCE_SLIDER: RangeInclusive<i32> = 1..=100;

fn clamp_to(value: i32, range: RangeInclusive<i32>) -> i32 {
    value.clamp(*range.start(), *range.end())
}

/// Convert a contrast slider position to the stored multiplier.
pub fn contrast_from_slider(slider: i32) -> f32 {
    clamp_to(slider, CONTRAST_SLIDER) as f32 * CONTRAST_SCALE
}

/// Clamp a stored contrast multiplier to the slider's domain. NaN becomes 1.0.
fn clamp_contrast(contrast: f32) -> f32 {
    if contrast.is_nan() {
        return 1.0;
    }
    contrast.clamp(
        *CONTRAST_SLIDER.start() as f32 * CONTRAST_SCALE,
        *CONTRAST_SLIDER.end() as f32 * CONTRAST_SCALE,
    )
}

/// Convert a stored contrast multiplier back to its slider position.
pub fn contrast_to_slider(contrast: f32) -> i32 {
    (contrast / CONTRAST_SCALE).round() as i32
}

/// How the parallax height field is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParallaxMode {
    /// Two-level height field from a soft threshold.
    #[default]
    Binary,
    /// Smooth height field from the height source.
    HeightMap,
    /// Smooth height field quantized into discrete levels.
    Quantization,
}

/// Normal map options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalParams {
    pub depth: i32,
    #[serde(rename = "blur radius")]
    pub blur_radius: i32,
    #[serde(rename = "bevel depth")]
    pub bevel_depth: i32,
    #[serde(rename = "bevel distance")]
    pub bevel_distance: i32,
    #[serde(rename = "bevel blur radius")]
    pub bevel_blur_radius: i32,
    #[serde(rename = "bevel soft")]
    pub bevel_soft: bool,
    #[serde(rename = "invert x")]
    pub invert_x: bool,
    #[serde(rename = "invert y")]
    pub invert_y: bool,
    pub tileable: bool,
}

impl Default for NormalParams {
    fn default() -> Self {
        Self {
            depth: 100,
            blur_radius: 0,
            bevel_depth: 50,
            bevel_distance: 0,
            bevel_blur_radius: 0,
            bevel_soft: true,
            invert_x: false,
            invert_y: false,
            tileable: false,
        }
    }
}

/// Parallax (height) map options, plus the preview-only parallax flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxParams {
    pub mode: ParallaxMode,
    pub soft: i32,
    pub threshold: i32,
    pub focus: i32,
    #[serde(rename = "min height")]
    pub min_height: i32,
    pub quantization: i32,
    #[serde(rename = "erode dilate")]
    pub erode_dilate: i32,
    pub brightness: i32,
    pub contrast: f32,
    pub invert: bool,
    #[serde(rename = "is parallax")]
    pub is_parallax: bool,
    #[serde(rename = "tile x")]
    pub tile_x: bool,
    #[serde(rename = "tile y")]
    pub tile_y: bool,
}

impl Default for ParallaxParams {
    fn default() -> Self {
        Self {
            mode: ParallaxMode::Binary,
            soft: 0,
            threshold: 128,
            focus: 10,
            min_height: 0,
            quantization: 8,
            erode_dilate: 0,
            brightness: 0,
            contrast: 1.0,
            invert: false,
            is_parallax: false,
            tile_x: false,
            tile_y: false,
        }
    }
}

/// Specular map options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecularParams {
    pub blur: i32,
    pub brightness: i32,
    pub contrast: f32,
    pub threshold: i32,
    pub invert: bool,
}

impl Default for SpecularParams {
    fn default() -> Self {
        Self {
            blur: 1,
            brightness: 0,
            contrast: 1.0,
            threshold: 0,
            invert: false,
        }
    }
}

/// Ambient occlusion map options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcclusionParams {
    pub blur: i32,
    pub brightness: i32,
    pub contrast: f32,
    pub threshold: i32,
    pub invert: bool,
    #[serde(rename = "distance mode")]
    pub distance_mode: bool,
    pub distance: i32,
}

impl Default for OcclusionParams {
    fn default() -> Self {
        Self {
            blur: 2,
            brightness: 0,
            contrast: 1.0,
            threshold: 0,
            invert: false,
            distance_mode: false,
            distance: 10,
        }
    }
}

/// All generation options of one sprite, applied to every frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    pub normal: NormalParams,
    pub parallax: ParallaxParams,
    pub specular: SpecularParams,
    pub occlusion: OcclusionParams,
}

/// Identifies one field of a [`ParameterSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Param {
    NormalDepth,
    NormalBlurRadius,
    BevelDepth,
    BevelDistance,
    BevelBlurRadius,
    BevelSoft,
    NormalInvertX,
    NormalInvertY,
    Tileable,
    ParallaxMode,
    ParallaxSoft,
    ParallaxThreshold,
    ParallaxFocus,
    ParallaxMinHeight,
    ParallaxQuantization,
    ParallaxErodeDilate,
    ParallaxBrightness,
    ParallaxContrast,
    ParallaxInvert,
    IsParallax,
    TileX,
    TileY,
    SpecularBlur,
    SpecularBrightness,
    SpecularContrast,
    SpecularThreshold,
    SpecularInvert,
    OcclusionBlur,
    OcclusionBrightness,
    OcclusionContrast,
    OcclusionThreshold,
    OcclusionInvert,
    OcclusionDistanceMode,
    OcclusionDistance,
}

impl Param {
    /// Map kinds whose cached output depends on this parameter.
    ///
    /// This is the single invalidation table of the crate.
    pub fn affects(self) -> &'static [MapKind] {
        use Param::*;
        match self {
            NormalDepth | NormalBlurRadius | BevelDepth | BevelDistance | BevelBlurRadius
            | BevelSoft | NormalInvertX | NormalInvertY | Tileable => &[MapKind::Normal],
            ParallaxMode | ParallaxSoft | ParallaxThreshold | ParallaxFocus
            | ParallaxMinHeight | ParallaxQuantization | ParallaxErodeDilate
            | ParallaxBrightness | ParallaxContrast | ParallaxInvert => &[MapKind::Parallax],
            SpecularBlur | SpecularBrightness | SpecularContrast | SpecularThreshold
            | SpecularInvert => &[MapKind::Specular],
            OcclusionBlur | OcclusionBrightness | OcclusionContrast | OcclusionThreshold
            | OcclusionInvert | OcclusionDistanceMode | OcclusionDistance => {
                &[MapKind::Occlusion]
            }
            // Preview-only flags
            IsParallax | TileX | TileY => &[],
        }
    }
}

/// A single parameter change, as produced by one slider or toggle.
///
/// Integer payloads are raw slider positions and are clamped to the
/// slider domain; contrast payloads are slider positions converted with
/// [`contrast_from_slider`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Setting {
    NormalDepth(i32),
    NormalBlurRadius(i32),
    BevelDepth(i32),
    BevelDistance(i32),
    BevelBlurRadius(i32),
    BevelSoft(bool),
    NormalInvertX(bool),
    NormalInvertY(bool),
    Tileable(bool),
    ParallaxMode(ParallaxMode),
    ParallaxSoft(i32),
    ParallaxThreshold(i32),
    ParallaxFocus(i32),
    ParallaxMinHeight(i32),
    ParallaxQuantization(i32),
    ParallaxErodeDilate(i32),
    ParallaxBrightness(i32),
    ParallaxContrast(i32),
    ParallaxInvert(bool),
    IsParallax(bool),
    TileX(bool),
    TileY(bool),
    SpecularBlur(i32),
    SpecularBrightness(i32),
    SpecularContrast(i32),
    SpecularThreshold(i32),
    SpecularInvert(bool),
    OcclusionBlur(i32),
    OcclusionBrightness(i32),
    OcclusionContrast(i32),
    OcclusionThreshold(i32),
    OcclusionInvert(bool),
    OcclusionDistanceMode(bool),
    OcclusionDistance(i32),
}

impl Setting {
    /// The parameter this setting writes.
    pub fn param(&self) -> Param {
        match self {
            Setting::NormalDepth(_) => Param::NormalDepth,
            Setting::NormalBlurRadius(_) => Param::NormalBlurRadius,
            Setting::BevelDepth(_) => Param::BevelDepth,
            Setting::BevelDistance(_) => Param::BevelDistance,
            Setting::BevelBlurRadius(_) => Param::BevelBlurRadius,
            Setting::BevelSoft(_) => Param::BevelSoft,
            Setting::NormalInvertX(_) => Param::NormalInvertX,
            Setting::NormalInvertY(_) => Param::NormalInvertY,
            Setting::Tileable(_) => Param::Tileable,
            Setting::ParallaxMode(_) => Param::ParallaxMode,
            Setting::ParallaxSoft(_) => Param::ParallaxSoft,
            Setting::ParallaxThreshold(_) => Param::ParallaxThreshold,
            Setting::ParallaxFocus(_) => Param::ParallaxFocus,
            Setting::ParallaxMinHeight(_) => Param::ParallaxMinHeight,
            Setting::ParallaxQuantization(_) => Param::ParallaxQuantization,
            Setting::ParallaxErodeDilate(_) => Param::ParallaxErodeDilate,
            Setting::ParallaxBrightness(_) => Param::ParallaxBrightness,
            Setting::ParallaxContrast(_) => Param::ParallaxContrast,
            Setting::ParallaxInvert(_) => Param::ParallaxInvert,
            Setting::IsParallax(_) => Param::IsParallax,
            Setting::TileX(_) => Param::TileX,
            Setting::TileY(_) => Param::TileY,
            Setting::SpecularBlur(_) => Param::SpecularBlur,
            Setting::SpecularBrightness(_) => Param::SpecularBrightness,
            Setting::SpecularContrast(_) => Param::SpecularContrast,
            Setting::SpecularThreshold(_) => Param::SpecularThreshold,
            Setting::SpecularInvert(_) => Param::SpecularInvert,
            Setting::OcclusionBlur(_) => Param::OcclusionBlur,
            Setting::OcclusionBrightness(_) => Param::OcclusionBrightness,
            Setting::OcclusionContrast(_) => Param::OcclusionContrast,
            Setting::OcclusionThreshold(_) => Param::OcclusionThreshold,
            Setting::OcclusionInvert(_) => Param::OcclusionInvert,
            Setting::OcclusionDistanceMode(_) => Param::OcclusionDistanceMode,
            Setting::OcclusionDistance(_) => Param::OcclusionDistance,
        }
    }
}

/// Write `value` into `slot`, reporting whether it changed.
fn store<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

impl ParameterSet {
    /// Apply one setting. Returns `true` when the stored value changed.
    pub fn apply(&mut self, setting: Setting) -> bool {
        let n = &mut self.normal;
        let p = &mut self.parallax;
        let s = &mut self.specular;
        let o = &mut self.occlusion;

        match setting {
            Setting::NormalDepth(v) => store(&mut n.depth, clamp_to(v, DEPTH_SLIDER)),
            Setting::NormalBlurRadius(v) => store(&mut n.blur_radius, clamp_to(v, BLUR_SLIDER)),
            Setting::BevelDepth(v) => store(&mut n.bevel_depth, clamp_to(v, DEPTH_SLIDER)),
            Setting::BevelDistance(v) => {
                store(&mut n.bevel_distance, clamp_to(v, BEVEL_DISTANCE_SLIDER))
            }
            Setting::BevelBlurRadius(v) => {
                store(&mut n.bevel_blur_radius, clamp_to(v, BLUR_SLIDER))
            }
            Setting::BevelSoft(v) => store(&mut n.bevel_soft, v),
            Setting::NormalInvertX(v) => store(&mut n.invert_x, v),
            Setting::NormalInvertY(v) => store(&mut n.invert_y, v),
            Setting::Tileable(v) => store(&mut n.tileable, v),
            Setting::ParallaxMode(v) => store(&mut p.mode, v),
            Setting::ParallaxSoft(v) => store(&mut p.soft, clamp_to(v, SOFT_SLIDER)),
            Setting::ParallaxThreshold(v) => {
                store(&mut p.threshold, clamp_to(v, THRESHOLD_SLIDER))
            }
            Setting::ParallaxFocus(v) => store(&mut p.focus, clamp_to(v, FOCUS_SLIDER)),
            Setting::ParallaxMinHeight(v) => {
                store(&mut p.min_height, clamp_to(v, THRESHOLD_SLIDER))
            }
            Setting::ParallaxQuantization(v) => {
                store(&mut p.quantization, clamp_to(v, QUANTIZATION_SLIDER))
            }
            Setting::ParallaxErodeDilate(v) => {
                store(&mut p.erode_dilate, clamp_to(v, ERODE_DILATE_SLIDER))
            }
            Setting::ParallaxBrightness(v) => {
                store(&mut p.brightness, clamp_to(v, BRIGHTNESS_SLIDER))
            }
            Setting::ParallaxContrast(v) => store(&mut p.contrast, contrast_from_slider(v)),
            Setting::ParallaxInvert(v) => store(&mut p.invert, v),
            Setting::IsParallax(v) => store(&mut p.is_parallax, v),
            Setting::TileX(v) => store(&mut p.tile_x, v),
            Setting::TileY(v) => store(&mut p.tile_y, v),
            Setting::SpecularBlur(v) => store(&mut s.blur, clamp_to(v, BLUR_SLIDER)),
            Setting::SpecularBrightness(v) => {
                store(&mut s.brightness, clamp_to(v, BRIGHTNESS_SLIDER))
            }
            Setting::SpecularContrast(v) => store(&mut s.contrast, contrast_from_slider(v)),
            Setting::SpecularThreshold(v) => {
                store(&mut s.threshold, clamp_to(v, THRESHOLD_SLIDER))
            }
            Setting::SpecularInvert(v) => store(&mut s.invert, v),
            Setting::OcclusionBlur(v) => store(&mut o.blur, clamp_to(v, BLUR_SLIDER)),
            Setting::OcclusionBrightness(v) => {
                store(&mut o.brightness, clamp_to(v, BRIGHTNESS_SLIDER))
            }
            Setting::OcclusionContrast(v) => store(&mut o.contrast, contrast_from_slider(v)),
            Setting::OcclusionThreshold(v) => {
                store(&mut o.threshold, clamp_to(v, THRESHOLD_SLIDER))
            }
            Setting::OcclusionInvert(v) => store(&mut o.invert, v),
            Setting::OcclusionDistanceMode(v) => store(&mut o.distance_mode, v),
            Setting::OcclusionDistance(v) => store(&mut o.distance, clamp_to(v, DISTANCE_SLIDER)),
        }
    }

    /// Pull every field into its slider domain.
    ///
    /// [`apply`](Self::apply) clamps as it goes; sets read from a manifest
    /// or project file go through this instead.
    pub fn clamp_to_ranges(&mut self) {
        let n = &mut self.normal;
        n.depth = clamp_to(n.depth, DEPTH_SLIDER);
        n.blur_radius = clamp_to(n.blur_radius, BLUR_SLIDER);
        n.bevel_depth = clamp_to(n.bevel_depth, DEPTH_SLIDER);
        n.bevel_distance = clamp_to(n.bevel_distance, BEVEL_DISTANCE_SLIDER);
        n.bevel_blur_radius = clamp_to(n.bevel_blur_radius, BLUR_SLIDER);

        let p = &mut self.parallax;
        p.soft = clamp_to(p.soft, SOFT_SLIDER);
        p.threshold = clamp_to(p.threshold, THRESHOLD_SLIDER);
        p.focus = clamp_to(p.focus, FOCUS_SLIDER);
        p.min_height = clamp_to(p.min_height, THRESHOLD_SLIDER);
        p.quantization = clamp_to(p.quantization, QUANTIZATION_SLIDER);
        p.erode_dilate = clamp_to(p.erode_dilate, ERODE_DILATE_SLIDER);
        p.brightness = clamp_to(p.brightness, BRIGHTNESS_SLIDER);
        p.contrast = clamp_contrast(p.contrast);

        let s = &mut self.specular;
        s.blur = clamp_to(s.blur, BLUR_SLIDER);
        s.brightness = clamp_to(s.brightness, BRIGHTNESS_SLIDER);
        s.contrast = clamp_contrast(s.contrast);
        s.threshold = clamp_to(s.threshold, THRESHOLD_SLIDER);

        let o = &mut self.occlusion;
        o.blur = clamp_to(o.blur, BLUR_SLIDER);
        o.brightness = clamp_to(o.brightness, BRIGHTNESS_SLIDER);
        o.contrast = clamp_contrast(o.contrast);
        o.threshold = clamp_to(o.threshold, THRESHOLD_SLIDER);
        o.distance = clamp_to(o.distance, DISTANCE_SLIDER);
    }

    /// A copy with every field in its slider domain.
    pub fn clamped(&self) -> Self {
        let mut params = self.clone();
        params.clamp_to_ranges();
        params
    }

    /// Map kinds whose inputs differ between `self` and `other`.
    pub fn changed_maps(&self, other: &ParameterSet) -> Vec<MapKind> {
        let mut kinds = Vec::new();
        if self.normal != other.normal {
            kinds.push(MapKind::Normal);
        }
        if !self.parallax.same_height_field(&other.parallax) {
            kinds.push(MapKind::Parallax);
        }
        if self.specular != other.specular {
            kinds.push(MapKind::Specular);
        }
        if self.occlusion != other.occlusion {
            kinds.push(MapKind::Occlusion);
        }
        kinds
    }
}

impl ParallaxParams {
    /// Compare only the fields that feed the parallax generator.
    fn same_height_field(&self, other: &ParallaxParams) -> bool {
        let strip = |p: &ParallaxParams| ParallaxParams {
            is_parallax: false,
            tile_x: false,
            tile_y: false,
            ..p.clone()
        };
        strip(self) == strip(other)
    }
}
