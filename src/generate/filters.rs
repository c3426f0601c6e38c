//! Scalar image filters shared by the map generators.
//!
//! All filters work on a [`HeightField`] of `f32` samples on the 8-bit scale
//! (`0.0..=255.0`), so slider values compare directly against samples.
//! Every filter clamps at the field edges; callers that need to see across
//! an edge pass a field extended with [`super::tile::extend`].

use image::{Rgba, RgbaImage};

/// Distance assigned to pixels with no transparent pixel in reach.
pub const FAR: u32 = u32::MAX / 2;

/// A single-channel float image.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl HeightField {
    /// Create a field filled with `value`.
    pub fn new(width: u32, height: u32, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }

    /// Per-pixel luminance of a premultiplied RGBA image.
    ///
    /// Transparent pixels have premultiplied colour zero, so they read as 0.
    pub fn from_luminance(image: &RgbaImage) -> Self {
        let data = image.pixels().map(luminance).collect();
        Self {
            width: image.width(),
            height: image.height(),
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Sample at `(x, y)`.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[self.offset(x, y)]
    }

    /// Sample with coordinates clamped into the field.
    #[inline]
    pub fn get_clamped(&self, x: i64, y: i64) -> f32 {
        let x = x.clamp(0, self.width as i64 - 1) as u32;
        let y = y.clamp(0, self.height as i64 - 1) as u32;
        self.get(x, y)
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        let i = self.offset(x, y);
        self.data[i] = value;
    }

    /// Apply `f` to every sample.
    pub fn map_in_place(&mut self, f: impl Fn(f32) -> f32) {
        for v in &mut self.data {
            *v = f(*v);
        }
    }

    /// Cut `margin` pixels off every side.
    pub fn crop(&self, margin: u32) -> HeightField {
        let width = self.width.saturating_sub(2 * margin);
        let height = self.height.saturating_sub(2 * margin);
        let mut out = HeightField::new(width, height, 0.0);
        for y in 0..height {
            for x in 0..width {
                out.set(x, y, self.get(x + margin, y + margin));
            }
        }
        out
    }

    /// Sobel gradient at `(x, y)`, normalised so a ramp of slope `s` gives `s`.
    pub fn gradient(&self, x: u32, y: u32) -> (f32, f32) {
        let (x, y) = (x as i64, y as i64);
        let s = |dx: i64, dy: i64| self.get_clamped(x + dx, y + dy);

        let gx = (s(1, -1) + 2.0 * s(1, 0) + s(1, 1)) - (s(-1, -1) + 2.0 * s(-1, 0) + s(-1, 1));
        let gy = (s(-1, 1) + 2.0 * s(0, 1) + s(1, 1)) - (s(-1, -1) + 2.0 * s(0, -1) + s(1, -1));

        (gx / 8.0, gy / 8.0)
    }
}

/// Rec. 601 luma of a pixel, on the 8-bit scale.
#[inline]
pub fn luminance(pixel: &Rgba<u8>) -> f32 {
    let [r, g, b, _] = pixel.0;
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

/// Normalised Gaussian weights for `-radius..=radius` with sigma `radius / 2`.
fn gaussian_kernel(radius: u32) -> Vec<f32> {
    let sigma = (radius as f32 / 2.0).max(0.5);
    let r = radius as i32;
    let weights: Vec<f32> = (-r..=r)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Separable Gaussian blur. A radius of zero returns the field unchanged.
pub fn gaussian_blur(field: &HeightField, radius: u32) -> HeightField {
    if radius == 0 || field.data.is_empty() {
        return field.clone();
    }

    let kernel = gaussian_kernel(radius);
    let r = radius as i64;

    let mut horizontal = HeightField::new(field.width, field.height, 0.0);
    for y in 0..field.height {
        for x in 0..field.width {
            let sum: f32 = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * field.get_clamped(x as i64 + k as i64 - r, y as i64))
                .sum();
            horizontal.set(x, y, sum);
        }
    }

    let mut out = HeightField::new(field.width, field.height, 0.0);
    for y in 0..field.height {
        for x in 0..field.width {
            let sum: f32 = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * horizontal.get_clamped(x as i64, y as i64 + k as i64 - r))
                .sum();
            out.set(x, y, sum);
        }
    }

    out
}

/// `v' = (v - 128) * contrast + 128 + brightness`, clamped to 8-bit range.
pub fn brightness_contrast(field: &mut HeightField, brightness: i32, contrast: f32) {
    let brightness = brightness as f32;
    field.map_in_place(|v| ((v - 128.0) * contrast + 128.0 + brightness).clamp(0.0, 255.0));
}

/// Zero every sample below `threshold`.
pub fn threshold_to_zero(field: &mut HeightField, threshold: i32) {
    let t = threshold as f32;
    field.map_in_place(|v| if v < t { 0.0 } else { v });
}

/// `255 - v` for every sample.
pub fn invert(field: &mut HeightField) {
    field.map_in_place(|v| 255.0 - v);
}

/// Snap samples to `levels` evenly spaced values between 0 and 255.
pub fn quantize(field: &mut HeightField, levels: i32) {
    let steps = (levels.max(2) - 1) as f32;
    field.map_in_place(|v| (v / 255.0 * steps).round() * 255.0 / steps);
}

/// Weight in `0..=1` of a sample against a threshold with a soft band.
///
/// With `soft == 0` this is a hard step at `threshold`. Otherwise the weight
/// ramps across `threshold ± soft`, eased with `gamma`.
pub fn soft_threshold(value: f32, threshold: i32, soft: i32, gamma: f32) -> f32 {
    let t = threshold as f32;
    if soft <= 0 {
        return if value >= t { 1.0 } else { 0.0 };
    }
    let soft = soft as f32;
    let x = ((value - (t - soft)) / (2.0 * soft)).clamp(0.0, 1.0);
    x.powf(gamma.max(f32::EPSILON))
}

/// Grey-level morphology with a square kernel.
///
/// Positive `radius` dilates (local maximum), negative erodes (local minimum).
pub fn erode_dilate(field: &HeightField, radius: i32) -> HeightField {
    if radius == 0 {
        return field.clone();
    }

    let r = radius.unsigned_abs() as i64;
    let pick: fn(f32, f32) -> f32 = if radius > 0 { f32::max } else { f32::min };

    // A square kernel is separable: rows then columns.
    let pass = |src: &HeightField, horizontal: bool| {
        let mut out = HeightField::new(src.width, src.height, 0.0);
        for y in 0..src.height {
            for x in 0..src.width {
                let mut acc = src.get(x, y);
                for k in -r..=r {
                    let (sx, sy) = if horizontal {
                        (x as i64 + k, y as i64)
                    } else {
                        (x as i64, y as i64 + k)
                    };
                    if sx >= 0 && sy >= 0 && sx < src.width as i64 && sy < src.height as i64 {
                        acc = pick(acc, src.get(sx as u32, sy as u32));
                    }
                }
                out.set(x, y, acc);
            }
        }
        out
    };

    let rows = pass(field, true);
    pass(&rows, false)
}

/// Chessboard distance from each pixel to the nearest transparent pixel.
///
/// `opaque` is row-major with `width * height` entries. Transparent pixels
/// get 0; pixels with no transparent pixel in the buffer get [`FAR`].
pub fn distance_to_transparent(opaque: &[bool], width: u32, height: u32) -> Vec<u32> {
    let (w, h) = (width as usize, height as usize);
    let mut dist: Vec<u32> = opaque.iter().map(|&o| if o { FAR } else { 0 }).collect();

    let at = |x: usize, y: usize| y * w + x;

    // Forward pass: left, up-left, up, up-right.
    for y in 0..h {
        for x in 0..w {
            let mut d = dist[at(x, y)];
            if d == 0 {
                continue;
            }
            if x > 0 {
                d = d.min(dist[at(x - 1, y)] + 1);
            }
            if y > 0 {
                d = d.min(dist[at(x, y - 1)] + 1);
                if x > 0 {
                    d = d.min(dist[at(x - 1, y - 1)] + 1);
                }
                if x + 1 < w {
                    d = d.min(dist[at(x + 1, y - 1)] + 1);
                }
            }
            dist[at(x, y)] = d;
        }
    }

    // Backward pass: right, down-right, down, down-left.
    for y in (0..h).rev() {
        for x in (0..w).rev() {
            let mut d = dist[at(x, y)];
            if d == 0 {
                continue;
            }
            if x + 1 < w {
                d = d.min(dist[at(x + 1, y)] + 1);
            }
            if y + 1 < h {
                d = d.min(dist[at(x, y + 1)] + 1);
                if x + 1 < w {
                    d = d.min(dist[at(x + 1, y + 1)] + 1);
                }
                if x > 0 {
                    d = d.min(dist[at(x - 1, y + 1)] + 1);
                }
            }
            dist[at(x, y)] = d;
        }
    }

    dist
}

/// Opacity mask of an image (`alpha > 0`).
pub fn opaque_mask(image: &RgbaImage) -> Vec<bool> {
    image.pixels().map(|p| p.0[3] > 0).collect()
}

/// Render a field as a grey RGBA image whose alpha comes from `alpha_source`.
pub fn to_grey_image(field: &HeightField, alpha_source: &RgbaImage) -> RgbaImage {
    RgbaImage::from_fn(field.width, field.height, |x, y| {
        let v = field.get(x, y).round().clamp(0.0, 255.0) as u8;
        let a = alpha_source.get_pixel(x, y).0[3];
        Rgba([v, v, v, a])
    })
}
