//! Ambient occlusion map generation.

use image::RgbaImage;

use super::filters::{self, HeightField};
use super::tile::{self, EdgeMode};
use super::MapSources;
use crate::types::OcclusionParams;

pub fn generate(sources: &MapSources<'_>, params: &OcclusionParams) -> RgbaImage {
    let diffuse = sources.diffuse;
    let mut field = HeightField::from_luminance(diffuse);
    filters::threshold_to_zero(&mut field, params.threshold);

    if params.distance_mode {
        darken_towards_silhouette(&mut field, diffuse, params.distance.max(1));
    }

    let mut field = filters::gaussian_blur(&field, params.blur.max(0) as u32);
    filters::brightness_contrast(&mut field, params.brightness, params.contrast);
    if params.invert {
        filters::invert(&mut field);
    }

    filters::to_grey_image(&field, diffuse)
}

/// Scale each sample by `min(d, distance) / distance`, where `d` is the
/// distance to the nearest transparent pixel. The image border counts as
/// transparent.
fn darken_towards_silhouette(field: &mut HeightField, diffuse: &RgbaImage, distance: i32) {
    let bordered = tile::extend(diffuse, None, 1, EdgeMode::Transparent);
    let (bw, bh) = bordered.dimensions();
    let opaque = filters::opaque_mask(&bordered);
    let dist = filters::distance_to_transparent(&opaque, bw, bh);

    let reach = distance as f32;
    for y in 0..field.height() {
        for x in 0..field.width() {
            let d = dist[((y + 1) * bw + x + 1) as usize] as f32;
            let v = field.get(x, y) * d.min(reach) / reach;
            field.set(x, y, v);
        }
    }
}
