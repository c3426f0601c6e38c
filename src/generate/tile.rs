//! Neighbour-aware edge extension for tileable sprites.
//!
//! A frame can name the eight tiles that surround it when the sprite is laid
//! out on a grid. Filters that look past the frame border (blur, gradients,
//! bevels) run on a buffer extended with pixels from those tiles, so the
//! generated maps continue seamlessly into the neighbouring tiles.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{Rgba, RgbaImage};

/// What occupies one of the eight slots around a frame.
#[derive(Debug, Clone, Default)]
pub enum NeighbourTile {
    /// The frame itself (the sprite wraps onto itself).
    #[default]
    Itself,
    /// Another image, loaded from `path`.
    Tile { path: PathBuf, pixels: Arc<RgbaImage> },
    /// No neighbour: sampling clamps at this edge.
    Empty,
}

impl NeighbourTile {
    /// A tile from an external image.
    pub fn tile(path: impl Into<PathBuf>, pixels: RgbaImage) -> Self {
        NeighbourTile::Tile {
            path: path.into(),
            pixels: Arc::new(pixels),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            NeighbourTile::Tile { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// The 3x3 grid of tiles around a frame, indexed `[row][col]`.
///
/// Row 0 is north, column 0 is west. The centre slot is always the frame.
#[derive(Debug, Clone, Default)]
pub struct Neighbours {
    slots: [[NeighbourTile; 3]; 3],
}

impl Neighbours {
    /// Every slot empty: tileable sampling degrades to edge clamp.
    pub fn empty() -> Self {
        let mut n = Self::default();
        for row in 0..3 {
            for col in 0..3 {
                n.set(row, col, NeighbourTile::Empty);
            }
        }
        n
    }

    pub fn get(&self, row: usize, col: usize) -> &NeighbourTile {
        &self.slots[row.min(2)][col.min(2)]
    }

    /// Replace a slot. Writes to the centre slot are ignored.
    pub fn set(&mut self, row: usize, col: usize, tile: NeighbourTile) {
        if (row, col) == (1, 1) || row > 2 || col > 2 {
            return;
        }
        self.slots[row][col] = tile;
    }

    /// Paths of every external tile.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.slots
            .iter()
            .flatten()
            .filter_map(|t| t.path().map(Path::to_path_buf))
            .collect()
    }

    /// Replace the pixels of every tile loaded from `path`.
    pub fn refresh(&mut self, path: &Path, pixels: &Arc<RgbaImage>) -> bool {
        let mut hit = false;
        for tile in self.slots.iter_mut().flatten() {
            if let NeighbourTile::Tile { path: p, pixels: px } = tile {
                if p == path {
                    *px = Arc::clone(pixels);
                    hit = true;
                }
            }
        }
        hit
    }
}

/// What lies past the frame border when no neighbours are consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeMode {
    /// Repeat the nearest border pixel.
    Clamp,
    /// Fully transparent pixels.
    Transparent,
}

/// Extend `centre` by `margin` pixels on every side.
///
/// With `neighbours`, pixels outside the frame are read from the matching
/// slot, wrapping coordinates into the tile. Empty slots and tiles whose
/// size differs from the frame fall back to clamping. Without neighbours,
/// `edge` decides.
pub fn extend(
    centre: &RgbaImage,
    neighbours: Option<&Neighbours>,
    margin: u32,
    edge: EdgeMode,
) -> RgbaImage {
    let (w, h) = centre.dimensions();
    if w == 0 || h == 0 {
        return centre.clone();
    }
    let m = margin as i64;

    RgbaImage::from_fn(w + 2 * margin, h + 2 * margin, |ex, ey| {
        let x = ex as i64 - m;
        let y = ey as i64 - m;
        sample(centre, neighbours, edge, x, y)
    })
}

fn region(v: i64, len: u32) -> usize {
    if v < 0 {
        0
    } else if v >= len as i64 {
        2
    } else {
        1
    }
}

fn clamp_sample(image: &RgbaImage, x: i64, y: i64) -> Rgba<u8> {
    let cx = x.clamp(0, image.width() as i64 - 1) as u32;
    let cy = y.clamp(0, image.height() as i64 - 1) as u32;
    *image.get_pixel(cx, cy)
}

fn wrap_sample(image: &RgbaImage, x: i64, y: i64) -> Rgba<u8> {
    let wx = x.rem_euclid(image.width() as i64) as u32;
    let wy = y.rem_euclid(image.height() as i64) as u32;
    *image.get_pixel(wx, wy)
}

fn sample(
    centre: &RgbaImage,
    neighbours: Option<&Neighbours>,
    edge: EdgeMode,
    x: i64,
    y: i64,
) -> Rgba<u8> {
    let (w, h) = centre.dimensions();
    let (col, row) = (region(x, w), region(y, h));
    if (row, col) == (1, 1) {
        return *centre.get_pixel(x as u32, y as u32);
    }

    match neighbours {
        Some(n) => match n.get(row, col) {
            NeighbourTile::Itself => wrap_sample(centre, x, y),
            NeighbourTile::Tile { pixels, .. } if pixels.dimensions() == (w, h) => {
                wrap_sample(pixels, x, y)
            }
            _ => clamp_sample(centre, x, y),
        },
        None => match edge {
            EdgeMode::Clamp => clamp_sample(centre, x, y),
            EdgeMode::Transparent => Rgba([0, 0, 0, 0]),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image() -> RgbaImage {
        RgbaImage::from_fn(4, 4, |x, y| Rgba([(x * 10) as u8, (y * 10) as u8, 0, 255]))
    }

    #[test]
    fn test_extend_clamp() {
        let img = gradient_image();
        let ext = extend(&img, None, 2, EdgeMode::Clamp);
        assert_eq!(ext.dimensions(), (8, 8));
        assert_eq!(ext.get_pixel(0, 0), img.get_pixel(0, 0));
        assert_eq!(ext.get_pixel(7, 3), img.get_pixel(3, 1));
        assert_eq!(ext.get_pixel(2, 2), img.get_pixel(0, 0));
    }

    #[test]
    fn test_extend_transparent() {
        let img = gradient_image();
        let ext = extend(&img, None, 1, EdgeMode::Transparent);
        assert_eq!(ext.get_pixel(0, 3).0, [0, 0, 0, 0]);
        assert_eq!(ext.get_pixel(1, 1), img.get_pixel(0, 0));
    }

    #[test]
    fn test_extend_wraps_onto_itself() {
        let img = gradient_image();
        let ext = extend(&img, Some(&Neighbours::default()), 1, EdgeMode::Transparent);
        // West of (0, 0) is (3, 0) of the same image
        assert_eq!(ext.get_pixel(0, 1), img.get_pixel(3, 0));
        // North-west corner wraps both axes
        assert_eq!(ext.get_pixel(0, 0), img.get_pixel(3, 3));
    }

    #[test]
    fn test_extend_reads_neighbour_tile() {
        let img = gradient_image();
        let east = RgbaImage::from_pixel(4, 4, Rgba([200, 0, 0, 255]));
        let mut n = Neighbours::empty();
        n.set(1, 2, NeighbourTile::tile("east.png", east));

        let ext = extend(&img, Some(&n), 1, EdgeMode::Transparent);
        assert_eq!(ext.get_pixel(5, 2).0, [200, 0, 0, 255]);
        // Empty west slot clamps
        assert_eq!(ext.get_pixel(0, 2), img.get_pixel(0, 1));
    }

    #[test]
    fn test_mismatched_tile_clamps() {
        let img = gradient_image();
        let mut n = Neighbours::empty();
        n.set(1, 2, NeighbourTile::tile("small.png", RgbaImage::new(2, 2)));

        let ext = extend(&img, Some(&n), 1, EdgeMode::Transparent);
        assert_eq!(ext.get_pixel(5, 2), img.get_pixel(3, 1));
    }

    #[test]
    fn test_centre_slot_is_fixed() {
        let mut n = Neighbours::default();
        n.set(1, 1, NeighbourTile::Empty);
        assert!(matches!(n.get(1, 1), NeighbourTile::Itself));
    }

    #[test]
    fn test_refresh_by_path() {
        let mut n = Neighbours::empty();
        n.set(0, 1, NeighbourTile::tile("north.png", RgbaImage::new(4, 4)));

        let fresh = Arc::new(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 4])));
        assert!(n.refresh(Path::new("north.png"), &fresh));
        assert!(!n.refresh(Path::new("south.png"), &fresh));
        assert_eq!(n.paths(), vec![PathBuf::from("north.png")]);
    }
}
