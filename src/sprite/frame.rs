//! One still image of a sprite and its generated map caches.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use log::debug;

use crate::error::{LitError, Result};
use crate::generate::{self, MapSources, NeighbourTile, Neighbours};
use crate::types::{MapKind, ParameterSet};

/// Cache state of one generated map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapState {
    Clean,
    #[default]
    Dirty,
}

/// An image loaded from a file, used as a diffuse or override source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pub path: PathBuf,
    pub pixels: RgbaImage,
}

impl SourceImage {
    pub fn new(path: impl Into<PathBuf>, pixels: RgbaImage) -> Self {
        Self {
            path: path.into(),
            pixels,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Frame {
    diffuse: SourceImage,
    height: Option<SourceImage>,
    specular: Option<SourceImage>,
    neighbours: Neighbours,
    maps: [RgbaImage; 4],
    states: [MapState; 4],
}

impl Frame {
    pub fn new(path: impl Into<PathBuf>, pixels: RgbaImage) -> Self {
        Self {
            diffuse: SourceImage::new(path, pixels),
            height: None,
            specular: None,
            neighbours: Neighbours::default(),
            maps: std::array::from_fn(|_| RgbaImage::new(0, 0)),
            states: [MapState::Dirty; 4],
        }
    }

    pub fn path(&self) -> &Path {
        &self.diffuse.path
    }

    pub fn diffuse(&self) -> &RgbaImage {
        &self.diffuse.pixels
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.diffuse.pixels.dimensions()
    }

    /// Replace the diffuse pixels. Every map becomes dirty.
    pub fn set_diffuse(&mut self, pixels: RgbaImage) {
        self.diffuse.pixels = pixels;
        self.mark_all_dirty();
    }

    /// Edit the diffuse pixels. Every map becomes dirty.
    ///
    /// An edit that leaves the image at a different size is discarded.
    pub fn edit_diffuse<R>(&mut self, edit: impl FnOnce(&mut RgbaImage) -> R) -> Result<R> {
        let expected = self.dimensions();
        let mut pixels = self.diffuse.pixels.clone();
        let result = edit(&mut pixels);
        if pixels.dimensions() != expected {
            return Err(LitError::dimension_mismatch(
                self.diffuse.path.clone(),
                expected,
                pixels.dimensions(),
            ));
        }
        self.diffuse.pixels = pixels;
        self.mark_all_dirty();
        Ok(result)
    }

    pub fn height_override(&self) -> Option<&SourceImage> {
        self.height.as_ref()
    }

    pub fn specular_override(&self) -> Option<&SourceImage> {
        self.specular.as_ref()
    }

    /// Set or clear the height override. Normal and parallax become dirty.
    pub fn set_height_override(&mut self, source: Option<SourceImage>) {
        self.height = source;
        self.mark_dirty(MapKind::Normal);
        self.mark_dirty(MapKind::Parallax);
    }

    /// Set or clear the specular override. The specular map becomes dirty.
    pub fn set_specular_override(&mut self, source: Option<SourceImage>) {
        self.specular = source;
        self.mark_dirty(MapKind::Specular);
    }

    pub fn neighbours(&self) -> &Neighbours {
        &self.neighbours
    }

    /// Replace one neighbour slot. Only the normal map samples neighbours.
    pub fn set_neighbour(&mut self, row: usize, col: usize, tile: NeighbourTile) {
        self.neighbours.set(row, col, tile);
        self.mark_dirty(MapKind::Normal);
    }

    pub fn state(&self, kind: MapKind) -> MapState {
        self.states[kind.index()]
    }

    pub fn mark_dirty(&mut self, kind: MapKind) {
        self.states[kind.index()] = MapState::Dirty;
    }

    pub fn mark_all_dirty(&mut self) {
        self.states = [MapState::Dirty; 4];
    }

    pub fn is_clean(&self) -> bool {
        self.states.iter().all(|s| *s == MapState::Clean)
    }

    /// The cached map, whatever its state.
    pub fn cached(&self, kind: MapKind) -> &RgbaImage {
        &self.maps[kind.index()]
    }

    pub fn sources(&self) -> MapSources<'_> {
        MapSources {
            diffuse: &self.diffuse.pixels,
            height: self.height.as_ref().map(|s| &s.pixels),
            specular: self.specular.as_ref().map(|s| &s.pixels),
            neighbours: Some(&self.neighbours),
        }
    }

    /// Regenerate `kind` if dirty and return the cache.
    pub fn ensure(&mut self, kind: MapKind, params: &ParameterSet) -> &RgbaImage {
        let slot = kind.index();
        if self.states[slot] == MapState::Dirty {
            debug!("generating {} map for {}", kind, self.diffuse.path.display());
            let map = generate::generate(kind, &self.sources(), params);
            self.maps[slot] = map;
            self.states[slot] = MapState::Clean;
        }
        &self.maps[slot]
    }

    /// Regenerate every dirty map.
    pub fn regenerate(&mut self, params: &ParameterSet) {
        for kind in MapKind::ALL {
            self.ensure(kind, params);
        }
    }

    /// Every file this frame reads from.
    pub fn source_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.diffuse.path.clone()];
        paths.extend(self.height.iter().map(|s| s.path.clone()));
        paths.extend(self.specular.iter().map(|s| s.path.clone()));
        paths.extend(self.neighbours.paths());
        paths
    }

    /// Swap in new pixels for every source loaded from `path`.
    ///
    /// Returns the map kinds that became dirty.
    pub fn reload_source(&mut self, path: &Path, pixels: &RgbaImage) -> Vec<MapKind> {
        let mut dirty = Vec::new();

        let size = pixels.dimensions();
        if self.diffuse.path == path && self.diffuse.pixels.dimensions() == size {
            self.set_diffuse(pixels.clone());
            dirty.extend(MapKind::ALL);
        }
        if let Some(height) = self
            .height
            .as_mut()
            .filter(|s| s.path == path && s.pixels.dimensions() == size)
        {
            height.pixels = pixels.clone();
            self.mark_dirty(MapKind::Normal);
            self.mark_dirty(MapKind::Parallax);
            dirty.extend([MapKind::Normal, MapKind::Parallax]);
        }
        if let Some(specular) = self
            .specular
            .as_mut()
            .filter(|s| s.path == path && s.pixels.dimensions() == size)
        {
            specular.pixels = pixels.clone();
            self.mark_dirty(MapKind::Specular);
            dirty.push(MapKind::Specular);
        }
        if self.neighbours.refresh(path, &Arc::new(pixels.clone())) {
            self.mark_dirty(MapKind::Normal);
            dirty.push(MapKind::Normal);
        }

        dirty.sort();
        dirty.dedup();
        dirty
    }
}
