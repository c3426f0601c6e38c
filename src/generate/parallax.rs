//! Parallax (height) map generation.

use image::RgbaImage;

use super::filters::{self, HeightField};
use super::MapSources;
use crate::types::params::FOCUS_SCALE;
use crate::types::{ParallaxMode, ParallaxParams};

pub fn generate(sources: &MapSources<'_>, params: &ParallaxParams) -> RgbaImage {
    let diffuse = sources.diffuse;
    let source = sources.height.unwrap_or(diffuse);
    let mut field = HeightField::from_luminance(source);
    let opaque = filters::opaque_mask(diffuse);
    let gamma = params.focus as f32 / FOCUS_SCALE;

    match params.mode {
        ParallaxMode::Binary => {
            field.map_in_place(|v| {
                255.0 * filters::soft_threshold(v, params.threshold, params.soft, gamma)
            });
            floor_opaque(&mut field, &opaque, params.min_height);
            field = filters::erode_dilate(&field, params.erode_dilate);
        }
        ParallaxMode::HeightMap => {
            filters::brightness_contrast(&mut field, params.brightness, params.contrast);
            field = filters::gaussian_blur(&field, params.soft.max(0) as u32);
        }
        ParallaxMode::Quantization => {
            filters::brightness_contrast(&mut field, params.brightness, params.contrast);
            filters::quantize(&mut field, params.quantization);
            field.map_in_place(|v| {
                v * filters::soft_threshold(v, params.threshold, params.soft, gamma)
            });
            floor_opaque(&mut field, &opaque, params.min_height);
            field = filters::erode_dilate(&field, params.erode_dilate);
        }
    }

    if params.invert {
        filters::invert(&mut field);
    }

    filters::to_grey_image(&field, diffuse)
}

/// Raise opaque samples to at least `min_height`.
fn floor_opaque(field: &mut HeightField, opaque: &[bool], min_height: i32) {
    if min_height <= 0 {
        return;
    }
    let floor = min_height as f32;
    let width = field.width();
    for y in 0..field.height() {
        for x in 0..width {
            if opaque[(y * width + x) as usize] && field.get(x, y) < floor {
                field.set(x, y, floor);
            }
        }
    }
}
