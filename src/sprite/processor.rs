//! Per-sprite orchestration: frames, parameters, caches and playback.

use std::path::{Path, PathBuf};
use std::time::Duration;

use glam::Vec2;
use image::RgbaImage;
use log::{debug, warn};

use super::animation::{Affordances, Animation};
use super::frame::{Frame, SourceImage};
use super::split;
use crate::error::{LitError, Result};
use crate::generate::NeighbourTile;
use crate::preview::SpriteLayer;
use crate::types::{LightSource, MapKind, ParameterSet, Setting};

/// One sprite: an ordered list of same-sized frames sharing one parameter set.
///
/// Generated maps are cached per frame and regenerated lazily. Every
/// parameter change dirties exactly the map kinds listed by
/// [`crate::types::Param::affects`], in every frame.
#[derive(Debug, Clone)]
pub struct Processor {
    name: String,
    frames: Vec<Frame>,
    params: ParameterSet,
    current: usize,
    animation: Animation,
    selected: bool,
    connected: bool,
    lights: Vec<LightSource>,
    position: Vec2,
}

impl Processor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: Vec::new(),
            params: ParameterSet::default(),
            current: 0,
            animation: Animation::default(),
            selected: false,
            connected: false,
            lights: Vec::new(),
            position: Vec2::ZERO,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // -- Frames ---------------------------------------------------------

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Size shared by every frame, once one is loaded.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.frames.first().map(Frame::dimensions)
    }

    pub fn current_frame_index(&self) -> usize {
        self.current
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.get(self.current)
    }

    /// Diffuse pixels of the current frame.
    pub fn texture(&self) -> Option<&RgbaImage> {
        self.current_frame().map(Frame::diffuse)
    }

    fn check_dimensions(&self, path: &Path, pixels: &RgbaImage) -> Result<()> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(LitError::Decode {
                path: path.to_path_buf(),
                message: "image has no pixels".to_string(),
            });
        }
        match self.dimensions() {
            Some(expected) if expected != pixels.dimensions() => {
                warn!(
                    "rejecting {}: {:?} does not match sprite size {:?}",
                    path.display(),
                    pixels.dimensions(),
                    expected
                );
                Err(LitError::dimension_mismatch(path, expected, pixels.dimensions()))
            }
            _ => Ok(()),
        }
    }

    /// Add a frame, or replace the frame loaded from the same path.
    ///
    /// Returns the frame index. A frame whose size differs from the sprite's
    /// is rejected and nothing changes.
    pub fn load_image(&mut self, path: impl Into<PathBuf>, pixels: RgbaImage) -> Result<usize> {
        let path = path.into();
        self.check_dimensions(&path, &pixels)?;

        if let Some(index) = self.frames.iter().position(|f| f.path() == path) {
            debug!("{}: replacing frame {} from {}", self.name, index, path.display());
            self.frames[index].set_diffuse(pixels);
            return Ok(index);
        }

        debug!("{}: adding frame from {}", self.name, path.display());
        self.frames.push(Frame::new(path, pixels));
        Ok(self.frames.len() - 1)
    }

    fn current_frame_mut(&mut self) -> Result<&mut Frame> {
        let name = &self.name;
        self.frames
            .get_mut(self.current)
            .ok_or_else(|| LitError::InvalidArgument {
                message: format!("Sprite '{}' has no frames", name),
                help: Some("Load an image before attaching override maps".to_string()),
            })
    }

    /// Use `pixels` as the height source of the current frame.
    pub fn load_height_map(&mut self, path: impl Into<PathBuf>, pixels: RgbaImage) -> Result<()> {
        let path = path.into();
        self.check_dimensions(&path, &pixels)?;
        self.current_frame_mut()?
            .set_height_override(Some(SourceImage::new(path, pixels)));
        Ok(())
    }

    /// Use `pixels` as the specular source of the current frame.
    pub fn load_specular_map(&mut self, path: impl Into<PathBuf>, pixels: RgbaImage) -> Result<()> {
        let path = path.into();
        self.check_dimensions(&path, &pixels)?;
        self.current_frame_mut()?
            .set_specular_override(Some(SourceImage::new(path, pixels)));
        Ok(())
    }

    /// Go back to deriving height from the diffuse.
    pub fn reset_height_map(&mut self) {
        if let Some(frame) = self.frames.get_mut(self.current) {
            frame.set_height_override(None);
        }
    }

    pub fn reset_specular_map(&mut self) {
        if let Some(frame) = self.frames.get_mut(self.current) {
            frame.set_specular_override(None);
        }
    }

    /// Set a neighbour slot of the current frame (row 0 is north).
    pub fn set_neighbour(&mut self, row: usize, col: usize, tile: NeighbourTile) {
        if let Some(frame) = self.frames.get_mut(self.current) {
            frame.set_neighbour(row, col, tile);
        }
    }

    /// Select a frame. Out-of-range indices clamp.
    pub fn set_current_frame(&mut self, index: isize) {
        let last = self.frames.len().saturating_sub(1) as isize;
        self.current = index.clamp(0, last) as usize;
    }

    /// Step to the next frame, wrapping. Disabled while playing.
    pub fn next_frame(&mut self) {
        if !self.animation.is_playing() && !self.frames.is_empty() {
            self.current = (self.current + 1) % self.frames.len();
        }
    }

    /// Step to the previous frame, wrapping. Disabled while playing.
    pub fn previous_frame(&mut self) {
        if !self.animation.is_playing() && !self.frames.is_empty() {
            let n = self.frames.len();
            self.current = (self.current + n - 1) % n;
        }
    }

    /// Remove the current frame.
    ///
    /// Does nothing and returns `false` when it is the last frame or while
    /// the animation plays.
    pub fn remove_current_frame(&mut self) -> bool {
        if !self.affordances().remove_frame {
            return false;
        }
        let removed = self.frames.remove(self.current);
        debug!("{}: removed frame {}", self.name, removed.path().display());
        self.set_current_frame(self.current as isize);
        true
    }

    /// Run a pixel edit on the current frame's diffuse. Every map of that
    /// frame becomes dirty. An edit that resizes the frame is rejected and
    /// the frame keeps its pixels.
    pub fn edit_current_frame<R>(&mut self, edit: impl FnOnce(&mut RgbaImage) -> R) -> Result<R> {
        self.current_frame_mut()?.edit_diffuse(edit)
    }

    // -- Parameters -----------------------------------------------------

    pub fn settings(&self) -> &ParameterSet {
        &self.params
    }

    /// Apply one parameter change. Returns `true` if the value changed.
    pub fn apply(&mut self, setting: Setting) -> bool {
        if !self.params.apply(setting) {
            return false;
        }
        let kinds = setting.param().affects();
        debug!("{}: {:?} dirties {:?}", self.name, setting, kinds);
        self.mark_dirty(kinds);
        true
    }

    /// Replace the whole parameter set, dirtying every map whose inputs changed.
    /// Out-of-range values are clamped to their slider domain.
    pub fn copy_settings(&mut self, params: &ParameterSet) {
        let params = params.clamped();
        let kinds = self.params.changed_maps(&params);
        self.params = params;
        self.mark_dirty(&kinds);
    }

    fn mark_dirty(&mut self, kinds: &[MapKind]) {
        for frame in &mut self.frames {
            for kind in kinds {
                frame.mark_dirty(*kind);
            }
        }
    }

    // -- Maps -----------------------------------------------------------

    /// A map of frame `index`, regenerated first if dirty.
    pub fn frame_map(&mut self, index: usize, kind: MapKind) -> Option<&RgbaImage> {
        let params = &self.params;
        self.frames
            .get_mut(index)
            .map(|frame| frame.ensure(kind, params))
    }

    /// A map of the current frame, regenerated first if dirty.
    pub fn map(&mut self, kind: MapKind) -> Option<&RgbaImage> {
        self.frame_map(self.current, kind)
    }

    pub fn normal(&mut self) -> Option<&RgbaImage> {
        self.map(MapKind::Normal)
    }

    pub fn parallax(&mut self) -> Option<&RgbaImage> {
        self.map(MapKind::Parallax)
    }

    pub fn specular(&mut self) -> Option<&RgbaImage> {
        self.map(MapKind::Specular)
    }

    pub fn occlusion(&mut self) -> Option<&RgbaImage> {
        self.map(MapKind::Occlusion)
    }

    /// Bring every map of every frame up to date.
    pub fn regenerate(&mut self) {
        let params = &self.params;
        for frame in &mut self.frames {
            frame.regenerate(params);
        }
    }

    /// Bring the current frame's maps up to date.
    pub fn regenerate_current(&mut self) {
        let params = &self.params;
        if let Some(frame) = self.frames.get_mut(self.current) {
            frame.regenerate(params);
        }
    }

    pub fn is_clean(&self) -> bool {
        self.frames.iter().all(Frame::is_clean)
    }

    // -- Animation ------------------------------------------------------

    pub fn play(&mut self) {
        self.animation.play();
    }

    pub fn stop(&mut self) {
        self.animation.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.animation.is_playing()
    }

    pub fn frame_interval(&self) -> Duration {
        self.animation.interval()
    }

    pub fn set_frame_interval(&mut self, interval: Duration) {
        self.animation.set_interval(interval);
    }

    /// Advance playback by `dt`. Returns `true` if the current frame changed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let steps = self.animation.tick(dt) as usize;
        if steps == 0 || self.frames.len() < 2 {
            return false;
        }
        let before = self.current;
        self.current = (self.current + steps) % self.frames.len();
        self.current != before
    }

    pub fn affordances(&self) -> Affordances {
        Affordances::for_state(self.animation.is_playing(), self.frames.len())
    }

    // -- Derived sprites and sources -------------------------------------

    /// Cut the current frame into `columns` x `rows` cells as a new sprite.
    pub fn split_into_frames(&self, columns: u32, rows: u32) -> Result<Processor> {
        let frame = self.current_frame().ok_or_else(|| LitError::InvalidArgument {
            message: format!("Sprite '{}' has no frames to split", self.name),
            help: None,
        })?;

        let cells = split::cells(frame.diffuse(), columns, rows)?;
        let count = columns * rows;

        let mut out = Processor::new(format!("{}(frames)", self.name));
        out.params = self.params.clone();
        out.animation.set_interval(self.animation.interval());
        for (index, cell) in cells.into_iter().enumerate() {
            let path = split::frame_path(frame.path(), index as u32, count);
            out.load_image(path, cell)?;
        }
        Ok(out)
    }

    /// Every file this sprite reads, without duplicates.
    pub fn source_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.frames.iter().flat_map(Frame::source_paths).collect();
        paths.sort();
        paths.dedup();
        paths
    }

    /// Reload every source read from `path`. Returns `true` if anything
    /// matched.
    pub fn reload_source(&mut self, path: &Path, pixels: &RgbaImage) -> bool {
        let mut hit = false;
        for frame in &mut self.frames {
            let dirty = frame.reload_source(path, pixels);
            if !dirty.is_empty() {
                debug!("{}: {} dirties {:?}", self.name, path.display(), dirty);
                hit = true;
            }
        }
        hit
    }

    // -- Preview --------------------------------------------------------

    /// Scene position of the sprite's top-left corner.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// The current frame as a compositor layer.
    ///
    /// Reads the caches as they are; call [`Self::regenerate`] first.
    pub fn layer(&self) -> Option<SpriteLayer<'_>> {
        let frame = self.current_frame()?;
        let parallax = &self.params.parallax;
        Some(SpriteLayer {
            diffuse: frame.diffuse(),
            normal: frame.cached(MapKind::Normal),
            parallax: frame.cached(MapKind::Parallax),
            specular: frame.cached(MapKind::Specular),
            occlusion: frame.cached(MapKind::Occlusion),
            offset: self.position,
            is_parallax: parallax.is_parallax,
            tile_x: parallax.tile_x,
            tile_y: parallax.tile_y,
        })
    }

    // -- Lights and flags -----------------------------------------------

    /// The sprite's private light list.
    pub fn lights(&self) -> &[LightSource] {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut Vec<LightSource> {
        &mut self.lights
    }

    pub fn set_lights(&mut self, lights: Vec<LightSource>) {
        self.lights = lights;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sprite_pixels(w: u32, h: u32, seed: u8) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            let inside = x > 1 && y > 1 && x < w - 2 && y < h - 2;
            if inside {
                Rgba([(x as u8).wrapping_mul(17) ^ seed, (y as u8).wrapping_mul(29), 120, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
    }

    fn processor() -> Processor {
        let mut p = Processor::new("hero");
        p.load_image("hero_0.png", sprite_pixels(16, 16, 0)).unwrap();
        p
    }

    fn snapshot(p: &mut Processor) -> Vec<RgbaImage> {
        MapKind::ALL
            .iter()
            .map(|k| p.map(*k).cloned().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_load_appends_and_replaces() {
        let mut p = processor();
        assert_eq!(p.load_image("hero_1.png", sprite_pixels(16, 16, 1)).unwrap(), 1);
        assert_eq!(p.load_image("hero_0.png", sprite_pixels(16, 16, 2)).unwrap(), 0);
        assert_eq!(p.frame_count(), 2);
    }

    #[test]
    fn test_mismatched_frame_is_rejected() {
        let mut p = processor();
        let err = p.load_image("big.png", RgbaImage::new(32, 16)).unwrap_err();
        assert!(matches!(err, LitError::DimensionMismatch { found_width: 32, .. }));
        assert_eq!(p.frame_count(), 1);

        assert!(matches!(
            p.load_image("empty.png", RgbaImage::new(0, 0)),
            Err(LitError::Decode { .. })
        ));
        assert!(p.load_height_map("h.png", RgbaImage::new(8, 8)).is_err());
        assert!(p.current_frame().unwrap().height_override().is_none());
    }

    #[test]
    fn test_set_current_frame_clamps() {
        let mut p = processor();
        p.load_image("hero_1.png", sprite_pixels(16, 16, 1)).unwrap();
        p.load_image("hero_2.png", sprite_pixels(16, 16, 2)).unwrap();

        p.set_current_frame(10);
        assert_eq!(p.current_frame_index(), 2);
        p.set_current_frame(-4);
        assert_eq!(p.current_frame_index(), 0);

        p.previous_frame();
        assert_eq!(p.current_frame_index(), 2);
        p.next_frame();
        assert_eq!(p.current_frame_index(), 0);
    }

    #[test]
    fn test_parameter_change_touches_only_its_map() {
        let mut p = processor();
        let before = snapshot(&mut p);

        assert!(p.apply(Setting::SpecularBrightness(80)));
        assert!(!p.is_clean());
        let after = snapshot(&mut p);

        for kind in MapKind::ALL {
            let i = kind.index();
            if kind == MapKind::Specular {
                assert_ne!(before[i], after[i]);
            } else {
                assert_eq!(before[i], after[i], "{} changed", kind);
            }
        }
    }

    #[test]
    fn test_preview_flags_keep_maps_clean() {
        let mut p = processor();
        p.regenerate();
        assert!(p.apply(Setting::IsParallax(true)));
        assert!(p.apply(Setting::TileX(true)));
        assert!(p.is_clean());
    }

    #[test]
    fn test_regeneration_is_idempotent() {
        let mut p = processor();
        let first = snapshot(&mut p);
        p.current_frame_mut().unwrap().mark_all_dirty();
        assert_eq!(snapshot(&mut p), first);
    }

    #[test]
    fn test_copy_settings_dirties_changed_groups() {
        let mut p = processor();
        p.regenerate();

        let mut params = p.settings().clone();
        params.occlusion.blur = 9;
        p.copy_settings(&params);

        let frame = p.current_frame().unwrap();
        assert_eq!(frame.state(MapKind::Occlusion), crate::sprite::MapState::Dirty);
        assert_eq!(frame.state(MapKind::Normal), crate::sprite::MapState::Clean);
        assert_eq!(p.settings().occlusion.blur, 9);
    }

    #[test]
    fn test_remove_current_frame() {
        let mut p = processor();
        assert!(!p.remove_current_frame());

        p.load_image("hero_1.png", sprite_pixels(16, 16, 1)).unwrap();
        p.set_current_frame(1);
        p.play();
        assert!(!p.remove_current_frame());

        p.stop();
        assert!(p.remove_current_frame());
        assert_eq!(p.frame_count(), 1);
        assert_eq!(p.current_frame_index(), 0);
    }

    #[test]
    fn test_playback_wraps() {
        let mut p = processor();
        p.load_image("hero_1.png", sprite_pixels(16, 16, 1)).unwrap();
        p.load_image("hero_2.png", sprite_pixels(16, 16, 2)).unwrap();
        p.play();

        assert!(p.tick(Duration::from_millis(100)));
        assert_eq!(p.current_frame_index(), 1);
        assert!(p.tick(Duration::from_millis(200)));
        assert_eq!(p.current_frame_index(), 0);

        // Stepping is disabled while playing
        p.next_frame();
        assert_eq!(p.current_frame_index(), 0);
        assert!(!p.affordances().edit_parameters);
    }

    #[test]
    fn test_split_into_frames() {
        let mut p = Processor::new("sheet");
        p.load_image("art/sheet.png", sprite_pixels(40, 20, 0)).unwrap();
        p.apply(Setting::NormalDepth(250));

        let split = p.split_into_frames(4, 2).unwrap();
        assert_eq!(split.name(), "sheet(frames)");
        assert_eq!(split.frame_count(), 8);
        assert_eq!(split.dimensions(), Some((10, 10)));
        assert_eq!(split.settings().normal.depth, 250);

        let names: Vec<&Path> = split.frames().iter().map(Frame::path).collect();
        assert_eq!(names[0], Path::new("art/sheet_0.png"));
        assert_eq!(names[7], Path::new("art/sheet_7.png"));
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_reload_source_by_path() {
        let mut p = processor();
        p.load_specular_map("shine.png", sprite_pixels(16, 16, 3)).unwrap();
        p.regenerate();

        assert_eq!(
            p.source_paths(),
            vec![PathBuf::from("hero_0.png"), PathBuf::from("shine.png")]
        );
        assert!(p.reload_source(Path::new("shine.png"), &sprite_pixels(16, 16, 4)));
        assert_eq!(
            p.current_frame().unwrap().state(MapKind::Specular),
            crate::sprite::MapState::Dirty
        );
        assert!(!p.reload_source(Path::new("nope.png"), &sprite_pixels(16, 16, 4)));
    }

    #[test]
    fn test_layer_reads_current_frame() {
        let mut p = processor();
        p.set_position(Vec2::new(5.0, 6.0));
        p.apply(Setting::TileY(true));
        p.regenerate();

        let layer = p.layer().unwrap();
        assert_eq!(layer.offset, Vec2::new(5.0, 6.0));
        assert!(layer.tile_y && !layer.tile_x);
        assert_eq!(layer.normal.dimensions(), (16, 16));
        assert!(Processor::new("empty").layer().is_none());
    }

    #[test]
    fn test_edit_current_frame_dirties_all() {
        let mut p = processor();
        p.regenerate();
        p.edit_current_frame(|img| img.put_pixel(4, 4, Rgba([255, 0, 0, 255])))
            .unwrap();
        let frame = p.current_frame().unwrap();
        assert!(MapKind::ALL
            .iter()
            .all(|k| frame.state(*k) == crate::sprite::MapState::Dirty));
    }

    #[test]
    fn test_edit_current_frame_rejects_resize() {
        let mut p = processor();
        p.regenerate();
        let before = p.texture().unwrap().clone();

        let result = p.edit_current_frame(|img| *img = RgbaImage::new(3, 3));
        assert!(matches!(result, Err(LitError::DimensionMismatch { .. })));
        assert_eq!(p.texture(), Some(&before));
        assert!(p.is_clean());

        assert!(Processor::new("empty").edit_current_frame(|_| ()).is_err());
    }

    #[test]
    fn test_copy_settings_clamps() {
        let mut p = processor();
        let mut wild = ParameterSet::default();
        wild.normal.bevel_distance = i32::MAX;
        wild.occlusion.distance = -7;

        p.copy_settings(&wild);
        assert_eq!(p.settings().normal.bevel_distance, 100);
        assert_eq!(p.settings().occlusion.distance, 1);
        p.regenerate();
        assert!(p.is_clean());
    }
}
