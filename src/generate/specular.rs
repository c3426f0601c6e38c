//! Specular map generation.

use image::RgbaImage;

use super::filters::{self, HeightField};
use super::MapSources;
use crate::types::SpecularParams;

pub fn generate(sources: &MapSources<'_>, params: &SpecularParams) -> RgbaImage {
    let source = sources.specular.unwrap_or(sources.diffuse);
    let field = HeightField::from_luminance(source);
    let mut field = filters::gaussian_blur(&field, params.blur.max(0) as u32);

    filters::threshold_to_zero(&mut field, params.threshold);
    filters::brightness_contrast(&mut field, params.brightness, params.contrast);
    if params.invert {
        filters::invert(&mut field);
    }

    filters::to_grey_image(&field, sources.diffuse)
}
