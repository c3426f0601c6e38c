//! Per-pixel lighting of the preview.
//!
//! Colours are `Vec4` with components in `0.0..=1.0` and premultiplied
//! alpha. Positions are scene pixels with y pointing down and z pointing
//! out of the texture towards the viewer.

use glam::{Vec2, Vec3, Vec3Swizzles, Vec4, Vec4Swizzles};

use super::settings::{ShadingSettings, TOON_BANDS};
use crate::types::LightSource;

/// Everything the lighting model needs to know about one texel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub position: Vec3,
    /// Premultiplied diffuse colour.
    pub albedo: Vec4,
    /// Unit surface normal in scene space.
    pub normal: Vec3,
    /// Specular map value, `0..=1`.
    pub specular: f32,
    /// Occlusion map value, `0..=1`; 1 is fully exposed.
    pub occlusion: f32,
}

/// Decode normal map channels (`0..=255`) into a scene-space unit normal.
///
/// The green channel points up the texture, so it is flipped into the
/// y-down scene.
pub fn decode_normal(rgb: [f32; 3]) -> Vec3 {
    let n = Vec3::new(
        (rgb[0] - 128.0) / 127.0,
        -(rgb[1] - 128.0) / 127.0,
        (rgb[2] - 128.0) / 127.0,
    );
    n.normalize_or(Vec3::Z)
}

/// Mirror `incident` about `normal`.
fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * incident.dot(normal) * normal
}

fn posterize(v: Vec3) -> Vec3 {
    (v * TOON_BANDS).round() / TOON_BANDS
}

/// Light one fragment. Returns a premultiplied colour with the albedo's alpha.
pub fn shade(
    fragment: &Fragment,
    viewer: Vec3,
    lights: &[LightSource],
    settings: &ShadingSettings,
) -> Vec4 {
    let n = fragment.normal;
    let view = (viewer - fragment.position).normalize_or(Vec3::Z);

    let mut diffuse = Vec3::ZERO;
    let mut specular = Vec3::ZERO;
    for light in lights {
        let l = light.direction_from(fragment.position);
        let lambert = n.dot(l).max(0.0);
        diffuse += light.diffuse_color.to_vec3() * lambert * light.diffuse_intensity;

        let r = reflect(-l, n);
        let lobe = r.dot(view).max(0.0).powf(light.specular_scatter.max(1.0));
        specular += light.specular_color.to_vec3() * light.specular_intensity * lobe * fragment.specular;
    }

    if settings.toon {
        diffuse = posterize(diffuse);
        specular = posterize(specular);
    }

    let tex = fragment.albedo.xyz();
    let alpha = fragment.albedo.w;
    let ambient = settings.ambient_color.to_vec3() * settings.ambient_intensity();

    let lit = tex * diffuse + tex * ambient * fragment.occlusion + specular * alpha;
    let out = tex.lerp(lit, settings.blend_factor());
    out.min(Vec3::splat(alpha)).extend(alpha)
}

/// Texture-space shift of a parallax-mapped fragment.
///
/// `height` is the parallax map value in `0..=1`; the shift grows with the
/// viewing angle and points towards the viewer.
pub fn parallax_offset(position: Vec3, viewer: Vec3, height: f32, scale: f32) -> Vec2 {
    let v = (viewer - position).normalize_or(Vec3::Z);
    v.xy() / v.z.max(0.05) * height * scale
}

/// Premultiplied source-over.
pub fn over(src: Vec4, dst: Vec4) -> Vec4 {
    src + dst * (1.0 - src.w)
}
