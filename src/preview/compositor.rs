//! Composition of the selected sprites into one preview image.

use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};
use image::{Rgba, RgbaImage};

use super::settings::ShadingSettings;
use super::shading::{self, Fragment};
use crate::types::{LightSource, ViewMode};

/// One sprite as seen by the compositor: borrowed maps of its current frame
/// plus where and how it is drawn.
#[derive(Debug, Clone, Copy)]
pub struct SpriteLayer<'a> {
    pub diffuse: &'a RgbaImage,
    pub normal: &'a RgbaImage,
    pub parallax: &'a RgbaImage,
    pub specular: &'a RgbaImage,
    pub occlusion: &'a RgbaImage,
    /// Scene position of the top-left corner.
    pub offset: Vec2,
    pub is_parallax: bool,
    pub tile_x: bool,
    pub tile_y: bool,
}

impl SpriteLayer<'_> {
    fn size(&self) -> Vec2 {
        Vec2::new(self.diffuse.width() as f32, self.diffuse.height() as f32)
    }

    fn image(&self, mode: ViewMode) -> &RgbaImage {
        match mode {
            ViewMode::Normal => self.normal,
            ViewMode::Parallax => self.parallax,
            ViewMode::Specular => self.specular,
            ViewMode::Occlusion => self.occlusion,
            ViewMode::Texture | ViewMode::Preview => self.diffuse,
        }
    }

    /// Wrap `p` into the texture along tiled axes.
    fn wrap(&self, p: Vec2) -> Vec2 {
        let size = self.size();
        Vec2::new(
            if self.tile_x { p.x.rem_euclid(size.x) } else { p.x },
            if self.tile_y { p.y.rem_euclid(size.y) } else { p.y },
        )
    }

    /// Texture coordinates of scene point `p`, if the layer covers it.
    fn local(&self, p: Vec2) -> Option<Vec2> {
        let size = self.size();
        if size.x <= 0.0 || size.y <= 0.0 {
            return None;
        }
        let local = self.wrap(p - self.offset);
        let inside = local.x >= 0.0 && local.y >= 0.0 && local.x < size.x && local.y < size.y;
        inside.then_some(local)
    }
}

/// The sprites and lights taking part in one render.
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    /// Bottom to top.
    pub layers: Vec<SpriteLayer<'a>>,
    pub lights: &'a [LightSource],
}

impl Selection<'_> {
    /// Scene rectangle covered by the layers (tiling ignored).
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        self.layers.iter().fold(None, |acc, layer| {
            let (lo, hi) = (layer.offset, layer.offset + layer.size());
            Some(match acc {
                Some((min, max)) => (Vec2::min(min, lo), Vec2::max(max, hi)),
                None => (lo, hi),
            })
        })
    }

    /// The eye point: above the centre of the bounds, as far away as the
    /// bounds are wide. Fixed in the scene, so panning and zoom do not
    /// change the shading.
    pub fn viewer(&self) -> Vec3 {
        match self.bounds() {
            Some((min, max)) => {
                let centre = (min + max) / 2.0;
                let extent = (max - min).max_element().max(1.0);
                centre.extend(extent)
            }
            None => Vec3::Z,
        }
    }
}

/// Which part of the scene a render shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Output pixels per scene pixel.
    pub zoom: f32,
    /// Scene point at the top-left corner of the output.
    pub origin: Vec2,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            zoom: 1.0,
            origin: Vec2::ZERO,
        }
    }

    /// A viewport showing the scene rectangle `min..max` at `zoom`.
    pub fn covering(min: Vec2, max: Vec2, zoom: f32) -> Self {
        let zoom = if zoom > 0.0 { zoom } else { 1.0 };
        let size = ((max - min) * zoom).ceil().max(Vec2::ZERO);
        Self {
            width: size.x as u32,
            height: size.y as u32,
            zoom,
            origin: min,
        }
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = if zoom > 0.0 { zoom } else { 1.0 };
        self
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Scene point at the centre of output pixel `(x, y)`.
    fn scene_point(&self, x: u32, y: u32) -> Vec2 {
        self.origin + (Vec2::new(x as f32, y as f32) + 0.5) / self.zoom
    }
}

/// Renders selections with the workspace's shading settings.
#[derive(Debug, Clone, Copy)]
pub struct Compositor<'s> {
    settings: &'s ShadingSettings,
}

impl<'s> Compositor<'s> {
    pub fn new(settings: &'s ShadingSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ShadingSettings {
        self.settings
    }

    /// Render `selection` in `mode` into an image the size of `viewport`.
    pub fn render(&self, selection: &Selection<'_>, mode: ViewMode, viewport: &Viewport) -> RgbaImage {
        let background = self.settings.background.to_vec3().extend(1.0);
        let viewer = selection.viewer();

        RgbaImage::from_fn(viewport.width, viewport.height, |x, y| {
            let point = viewport.scene_point(x, y);
            let mut colour = background;
            for layer in &selection.layers {
                if let Some(local) = layer.local(point) {
                    let texel = self.texel(layer, local, point, mode, viewer, selection.lights);
                    colour = shading::over(texel, colour);
                }
            }
            to_pixel(colour)
        })
    }

    /// Render at zoom 1 over the layers' bounds.
    ///
    /// Identical, pixel for pixel, to [`Self::render`] at zoom 1 over the
    /// same scene rectangle.
    pub fn render_native(&self, selection: &Selection<'_>, mode: ViewMode) -> RgbaImage {
        match selection.bounds() {
            Some((min, max)) => {
                self.render(selection, mode, &Viewport::covering(min.floor(), max.ceil(), 1.0))
            }
            None => RgbaImage::new(0, 0),
        }
    }

    /// Premultiplied colour of one layer at texture point `local`.
    fn texel(
        &self,
        layer: &SpriteLayer<'_>,
        local: Vec2,
        point: Vec2,
        mode: ViewMode,
        viewer: Vec3,
        lights: &[LightSource],
    ) -> Vec4 {
        let pixelated = self.settings.pixelated;
        match mode {
            // Diffuse pixels are already premultiplied
            ViewMode::Texture => sample(layer.diffuse, local, pixelated),
            ViewMode::Preview => self.lit(layer, local, point, viewer, lights),
            _ => premultiply(sample(layer.image(mode), local, pixelated)),
        }
    }

    fn lit(
        &self,
        layer: &SpriteLayer<'_>,
        local: Vec2,
        point: Vec2,
        viewer: Vec3,
        lights: &[LightSource],
    ) -> Vec4 {
        let pixelated = self.settings.pixelated;
        let position = point.extend(0.0);

        let mut uv = local;
        if layer.is_parallax {
            let height = sample(layer.parallax, uv, pixelated).x;
            uv = layer.wrap(
                uv + shading::parallax_offset(position, viewer, height, self.settings.parallax_height),
            );
        }

        let normal = sample(layer.normal, uv, pixelated).xyz() * 255.0;
        let fragment = Fragment {
            position,
            albedo: sample(layer.diffuse, uv, pixelated),
            normal: shading::decode_normal(normal.to_array()),
            specular: sample(layer.specular, uv, pixelated).x,
            occlusion: sample(layer.occlusion, uv, pixelated).x,
        };

        shading::shade(&fragment, viewer, lights, self.settings)
    }
}

/// Texel `(x, y)` clamped into the image, channels in `0..=1`.
fn texel_at(image: &RgbaImage, x: i64, y: i64) -> Vec4 {
    let x = x.clamp(0, image.width() as i64 - 1) as u32;
    let y = y.clamp(0, image.height() as i64 - 1) as u32;
    let [r, g, b, a] = image.get_pixel(x, y).0;
    Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0
}

/// Sample at texture point `p`: nearest when pixelated, else bilinear
/// between texel centres.
fn sample(image: &RgbaImage, p: Vec2, pixelated: bool) -> Vec4 {
    if image.width() == 0 || image.height() == 0 {
        return Vec4::ZERO;
    }
    if pixelated {
        return texel_at(image, p.x.floor() as i64, p.y.floor() as i64);
    }

    let q = p - 0.5;
    let base = q.floor();
    let f = q - base;
    let (x, y) = (base.x as i64, base.y as i64);

    let top = texel_at(image, x, y).lerp(texel_at(image, x + 1, y), f.x);
    let bottom = texel_at(image, x, y + 1).lerp(texel_at(image, x + 1, y + 1), f.x);
    top.lerp(bottom, f.y)
}

fn premultiply(c: Vec4) -> Vec4 {
    (c.xyz() * c.w).extend(c.w)
}

fn to_pixel(c: Vec4) -> Rgba<u8> {
    let channel = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba([channel(c.x), channel(c.y), channel(c.z), channel(c.w)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Colour;

    struct Maps {
        diffuse: RgbaImage,
        normal: RgbaImage,
        parallax: RgbaImage,
        specular: RgbaImage,
        occlusion: RgbaImage,
    }

    impl Maps {
        fn new(w: u32, h: u32) -> Self {
            let diffuse = RgbaImage::from_fn(w, h, |x, y| {
                if (x + y) % 5 == 0 {
                    Rgba([0, 0, 0, 0])
                } else {
                    Rgba([(x * 20) as u8, (y * 20) as u8, 100, 255])
                }
            });
            let alpha = |x, y| diffuse.get_pixel(x, y).0[3];
            Self {
                normal: RgbaImage::from_fn(w, h, |x, y| Rgba([100 + x as u8, 140, 230, alpha(x, y)])),
                parallax: RgbaImage::from_fn(w, h, |x, y| Rgba([200, 200, 200, alpha(x, y)])),
                specular: RgbaImage::from_fn(w, h, |x, y| Rgba([180, 180, 180, alpha(x, y)])),
                occlusion: RgbaImage::from_fn(w, h, |x, y| Rgba([220, 220, 220, alpha(x, y)])),
                diffuse,
            }
        }

        fn layer(&self, offset: Vec2) -> SpriteLayer<'_> {
            SpriteLayer {
                diffuse: &self.diffuse,
                normal: &self.normal,
                parallax: &self.parallax,
                specular: &self.specular,
                occlusion: &self.occlusion,
                offset,
                is_parallax: false,
                tile_x: false,
                tile_y: false,
            }
        }
    }

    fn lights() -> Vec<LightSource> {
        vec![LightSource::at(3.0, 2.0, 20.0), LightSource::at(12.0, 9.0, 8.0)]
    }

    #[test]
    fn test_empty_selection_renders_background() {
        let settings = ShadingSettings::default();
        let out = Compositor::new(&settings).render(&Selection::default(), ViewMode::Preview, &Viewport::new(3, 2));
        let bg = Colour::BACKGROUND;
        assert!(out.pixels().all(|p| p.0 == [bg.r, bg.g, bg.b, 255]));
    }

    #[test]
    fn test_texture_mode_composes_diffuse_over_background() {
        let maps = Maps::new(8, 8);
        let settings = ShadingSettings::default();
        let selection = Selection {
            layers: vec![maps.layer(Vec2::ZERO)],
            lights: &[],
        };

        let out = Compositor::new(&settings).render_native(&selection, ViewMode::Texture);
        assert_eq!(out.get_pixel(1, 0).0, [20, 0, 100, 255]);
        let bg = Colour::BACKGROUND;
        assert_eq!(out.get_pixel(0, 0).0, [bg.r, bg.g, bg.b, 255]);
    }

    #[test]
    fn test_native_matches_on_screen_at_zoom_one() {
        let maps = Maps::new(12, 10);
        let lights = lights();
        for (pixelated, toon) in [(false, false), (true, false), (false, true)] {
            let settings = ShadingSettings {
                pixelated,
                toon,
                ..Default::default()
            };
            let compositor = Compositor::new(&settings);
            let selection = Selection {
                layers: vec![maps.layer(Vec2::new(4.0, 3.0))],
                lights: &lights,
            };

            let native = compositor.render_native(&selection, ViewMode::Preview);
            let on_screen = compositor.render(
                &selection,
                ViewMode::Preview,
                &Viewport::new(40, 30).with_origin(Vec2::new(-6.0, -5.0)),
            );

            assert_eq!(native.dimensions(), (12, 10));
            for (x, y, p) in native.enumerate_pixels() {
                assert_eq!(p, on_screen.get_pixel(x + 10, y + 8));
            }
        }
    }

    #[test]
    fn test_pixelated_and_smooth_agree_at_zoom_one() {
        let maps = Maps::new(8, 8);
        let lights = lights();
        let selection = Selection {
            layers: vec![maps.layer(Vec2::ZERO)],
            lights: &lights,
        };

        let smooth = ShadingSettings::default();
        let pixelated = ShadingSettings {
            pixelated: true,
            ..Default::default()
        };
        assert_eq!(
            Compositor::new(&smooth).render_native(&selection, ViewMode::Preview),
            Compositor::new(&pixelated).render_native(&selection, ViewMode::Preview)
        );
    }

    #[test]
    fn test_zoom_scales_output() {
        let maps = Maps::new(8, 8);
        let settings = ShadingSettings {
            pixelated: true,
            ..Default::default()
        };
        let selection = Selection {
            layers: vec![maps.layer(Vec2::ZERO)],
            lights: &[],
        };

        let viewport = Viewport::covering(Vec2::ZERO, Vec2::splat(8.0), 2.0);
        let out = Compositor::new(&settings).render(&selection, ViewMode::Normal, &viewport);
        assert_eq!(out.dimensions(), (16, 16));
        assert_eq!(out.get_pixel(2, 0), out.get_pixel(3, 1));
    }

    #[test]
    fn test_tiled_layer_repeats() {
        let maps = Maps::new(4, 4);
        let settings = ShadingSettings::default();
        let mut layer = maps.layer(Vec2::ZERO);
        layer.tile_x = true;
        let selection = Selection {
            layers: vec![layer],
            lights: &[],
        };

        let out = Compositor::new(&settings).render(&selection, ViewMode::Texture, &Viewport::new(12, 4));
        for x in 0..4 {
            assert_eq!(out.get_pixel(x, 1), out.get_pixel(x + 8, 1));
        }
    }

    #[test]
    fn test_parallax_shifts_sampling() {
        let maps = Maps::new(12, 12);
        let lights = lights();
        let settings = ShadingSettings::default();
        let mut layer = maps.layer(Vec2::ZERO);
        let flat = Selection {
            layers: vec![layer],
            lights: &lights,
        };
        layer.is_parallax = true;
        let raised = Selection {
            layers: vec![layer],
            lights: &lights,
        };

        let compositor = Compositor::new(&settings);
        assert_ne!(
            compositor.render_native(&flat, ViewMode::Preview),
            compositor.render_native(&raised, ViewMode::Preview)
        );
    }

    #[test]
    fn test_selection_bounds_and_viewer() {
        let a = Maps::new(4, 4);
        let b = Maps::new(6, 2);
        let selection = Selection {
            layers: vec![a.layer(Vec2::ZERO), b.layer(Vec2::new(10.0, 8.0))],
            lights: &[],
        };
        assert_eq!(selection.bounds(), Some((Vec2::ZERO, Vec2::new(16.0, 10.0))));
        assert_eq!(selection.viewer(), Vec3::new(8.0, 5.0, 16.0));
    }
}
