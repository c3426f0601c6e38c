//! Lighting map generators.
//!
//! Each generator is a pure function of its source buffers and the sprite's
//! [`ParameterSet`]: the same inputs always produce the same map, and no
//! generator keeps state between calls. Every map has the dimensions of the
//! diffuse frame and takes its alpha from it.

pub mod filters;
mod normal;
mod occlusion;
mod parallax;
mod specular;
pub mod tile;

use image::RgbaImage;

use crate::types::{MapKind, ParameterSet};

pub use normal::FLAT as FLAT_NORMAL;
pub use tile::{EdgeMode, NeighbourTile, Neighbours};

/// The source buffers of one frame.
#[derive(Debug, Clone, Copy)]
pub struct MapSources<'a> {
    /// Premultiplied RGBA diffuse pixels.
    pub diffuse: &'a RgbaImage,
    /// Height override, used instead of the diffuse for normal and parallax.
    pub height: Option<&'a RgbaImage>,
    /// Specular override, used instead of the diffuse for the specular map.
    pub specular: Option<&'a RgbaImage>,
    /// Tiles around the frame; `None` wraps the frame onto itself.
    pub neighbours: Option<&'a Neighbours>,
}

impl<'a> MapSources<'a> {
    pub fn new(diffuse: &'a RgbaImage) -> Self {
        Self {
            diffuse,
            height: None,
            specular: None,
            neighbours: None,
        }
    }
}

/// Generate one map kind. Parameters outside their slider domain are
/// clamped first.
pub fn generate(kind: MapKind, sources: &MapSources<'_>, params: &ParameterSet) -> RgbaImage {
    let params = params.clamped();
    match kind {
        MapKind::Normal => normal::generate(sources, &params.normal),
        MapKind::Parallax => parallax::generate(sources, &params.parallax),
        MapKind::Specular => specular::generate(sources, &params.specular),
        MapKind::Occlusion => occlusion::generate(sources, &params.occlusion),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sprite() -> RgbaImage {
        RgbaImage::from_fn(20, 12, |x, y| {
            if x < 2 || y < 2 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([(x * 12) as u8, (y * 20) as u8, 90, 255])
            }
        })
    }

    #[test]
    fn test_maps_match_diffuse_size_and_alpha() {
        let img = sprite();
        let params = ParameterSet::default();
        for kind in MapKind::ALL {
            let map = generate(kind, &MapSources::new(&img), &params);
            assert_eq!(map.dimensions(), img.dimensions(), "{}", kind);
            for (src, out) in img.pixels().zip(map.pixels()) {
                assert_eq!(src.0[3], out.0[3], "{}", kind);
            }
        }
    }

    #[test]
    fn test_every_kind_is_deterministic() {
        let img = sprite();
        let mut params = ParameterSet::default();
        params.normal.bevel_distance = 3;
        params.occlusion.distance_mode = true;

        for kind in MapKind::ALL {
            let a = generate(kind, &MapSources::new(&img), &params);
            let b = generate(kind, &MapSources::new(&img), &params);
            assert_eq!(a, b, "{}", kind);
        }
    }

    #[test]
    fn test_out_of_range_parameters_are_clamped() {
        let img = sprite();
        let wild: ParameterSet = serde_json::from_str(
            r#"{"normal": {"bevel distance": 2147483647, "bevel blur radius": 5},
                "occlusion": {"distance": 2147483647, "distance mode": true}}"#,
        )
        .unwrap();

        for kind in MapKind::ALL {
            let map = generate(kind, &MapSources::new(&img), &wild);
            let expected = generate(kind, &MapSources::new(&img), &wild.clamped());
            assert_eq!(map, expected, "{}", kind);
        }
    }

    #[test]
    fn test_empty_diffuse() {
        let img = RgbaImage::new(0, 0);
        for kind in MapKind::ALL {
            let map = generate(kind, &MapSources::new(&img), &ParameterSet::default());
            assert_eq!(map.dimensions(), (0, 0));
        }
    }
}
