//! Normal map generation.
//!
//! The surface height is the luminance of the height source (the height
//! override or the diffuse). An optional bevel adds a ramp along the
//! silhouette so flat sprites still catch light at their edges.

use glam::Vec3;
use image::{Rgba, RgbaImage};

use super::filters::{self, HeightField};
use super::tile::{self, EdgeMode, Neighbours};
use super::MapSources;
use crate::types::params::DEPTH_SCALE;
use crate::types::NormalParams;

/// The encoding of a normal pointing straight out of the texture.
pub const FLAT: [u8; 3] = [128, 128, 255];

pub fn generate(sources: &MapSources<'_>, params: &NormalParams) -> RgbaImage {
    let diffuse = sources.diffuse;
    let (w, h) = diffuse.dimensions();
    if w == 0 || h == 0 {
        return RgbaImage::new(w, h);
    }

    let bevel = has_bevel(params);
    let blur = params.blur_radius.max(0) as u32;
    let margin = margin_for(params);

    let wrap = Neighbours::default();
    let neighbours = params
        .tileable
        .then(|| sources.neighbours.unwrap_or(&wrap));

    // An override has no neighbour tiles of its own: it wraps onto itself.
    let height_neighbours = match sources.height {
        Some(_) => params.tileable.then_some(&wrap),
        None => neighbours,
    };
    let height_source = sources.height.unwrap_or(diffuse);

    let extended = tile::extend(height_source, height_neighbours, margin, EdgeMode::Clamp);
    let mut surface = HeightField::from_luminance(&extended);
    surface.map_in_place(|v| v / 255.0);
    let surface = filters::gaussian_blur(&surface, blur);
    let depth = params.depth as f32 / DEPTH_SCALE;

    let bevel_field = bevel.then(|| bevel_height(diffuse, neighbours, margin, params));
    let bevel_scale = params.bevel_depth as f32 / DEPTH_SCALE;

    RgbaImage::from_fn(w, h, |x, y| {
        let alpha = diffuse.get_pixel(x, y).0[3];
        if alpha == 0 {
            return Rgba([FLAT[0], FLAT[1], FLAT[2], 0]);
        }

        let (ex, ey) = (x + margin, y + margin);
        let (sx, sy) = surface.gradient(ex, ey);
        let (mut gx, mut gy) = (sx * depth, sy * depth);

        if let Some(field) = &bevel_field {
            let (bx, by) = field.gradient(ex, ey);
            gx += bx * bevel_scale;
            gy += by * bevel_scale;
        }

        if params.invert_x {
            gx = -gx;
        }
        if params.invert_y {
            gy = -gy;
        }

        encode(gx, gy, alpha)
    })
}

fn has_bevel(params: &NormalParams) -> bool {
    params.bevel_distance > 0 && params.bevel_depth != 0
}

/// Pixels of context needed around the frame: the filter reach plus one
/// pixel for the Sobel window.
fn margin_for(params: &NormalParams) -> u32 {
    let blur = params.blur_radius.max(0) as u32;
    let bevel_reach = if has_bevel(params) {
        (params.bevel_distance as u32).saturating_add(params.bevel_blur_radius.max(0) as u32)
    } else {
        0
    };
    blur.saturating_add(bevel_reach).saturating_add(1)
}

/// Bevel height on the extended buffer: a ramp of `bevel_distance` pixels
/// rising from the silhouette edge.
fn bevel_height(
    diffuse: &RgbaImage,
    neighbours: Option<&Neighbours>,
    margin: u32,
    params: &NormalParams,
) -> HeightField {
    let extended = tile::extend(diffuse, neighbours, margin, EdgeMode::Transparent);
    let (w, h) = extended.dimensions();
    let opaque = filters::opaque_mask(&extended);
    let distance = filters::distance_to_transparent(&opaque, w, h);

    let levels = bevel_levels(params);
    let top = levels.len() - 1;
    let mut field = HeightField::new(w, h, 0.0);
    for y in 0..h {
        for x in 0..w {
            let d = distance[(y * w + x) as usize] as usize;
            field.set(x, y, levels[d.min(top)]);
        }
    }

    filters::gaussian_blur(&field, params.bevel_blur_radius.max(0) as u32)
}

/// Bevel height at each distance `0..=bevel_distance` from the silhouette.
///
/// Consecutive levels differ by at least [`min_bevel_step`], so every pixel
/// of the band encodes at least one code away from flat. Without it the soft
/// profile flattens the innermost pixels of wide bevels.
fn bevel_levels(params: &NormalParams) -> Vec<f32> {
    let reach = params.bevel_distance.max(1) as usize;
    let r = reach as f32;
    let mut levels: Vec<f32> = (0..=reach)
        .map(|d| {
            let t = d as f32 / r;
            let profile = if params.bevel_soft {
                1.0 - (1.0 - t) * (1.0 - t)
            } else {
                t
            };
            profile * r
        })
        .collect();

    let step = min_bevel_step(params.bevel_depth as f32 / DEPTH_SCALE);
    for d in (1..=reach).rev() {
        levels[d - 1] = levels[d - 1].min(levels[d] - step);
    }
    levels
}

/// Height step whose central difference, scaled by `bevel_scale`, moves an
/// encoded channel by one code.
fn min_bevel_step(bevel_scale: f32) -> f32 {
    2.0 / (127.0 * bevel_scale.abs().max(f32::EPSILON))
}

fn encode(gx: f32, gy: f32, alpha: u8) -> Rgba<u8> {
    let n = Vec3::new(-gx, gy, 1.0).normalize();
    let channel = |c: f32| (128.0 + 127.0 * c).round().clamp(0.0, 255.0) as u8;
    Rgba([channel(n.x), channel(n.y), channel(n.z), alpha])
}
