//! The set of open sprites and everything shared between them.
//!
//! A [`Workspace`] owns the processors, the sample light list, the preview
//! settings and the installed tools. It keeps track of which sprites are
//! selected and which one is active, and fans file changes out to every
//! sprite that reads the changed file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use glam::Vec2;
use image::RgbaImage;
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::error::{LitError, Result};
use crate::image_io::{derived_path, write_png, ImageLoader, PREVIEW_SUFFIX};
use crate::preview::{Compositor, Selection, ShadingSettings, Viewport};
use crate::generate::NeighbourTile;
use crate::project::{
    lights_from_records, lights_to_records, FrameRecord, GeneralSettings, NeighbourRecord,
    ProjectRecord, SpriteRecord,
};
use crate::sprite::Processor;
use crate::tools::ToolRegistry;
use crate::types::{LightSource, ParameterSet, ViewMode};

/// A rendered preview and where it was saved.
#[derive(Debug, Clone)]
pub struct RenderedPreview {
    pub image: RgbaImage,
    pub path: Option<PathBuf>,
}

pub struct Workspace {
    processors: Vec<Processor>,
    sample_lights: Vec<LightSource>,
    shading: ShadingSettings,
    lights_per_sprite: bool,
    view_mode: ViewMode,
    active: Option<usize>,
    tools: ToolRegistry,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            processors: Vec::new(),
            sample_lights: vec![LightSource::default()],
            shading: ShadingSettings::default(),
            lights_per_sprite: false,
            view_mode: ViewMode::default(),
            active: None,
            tools: ToolRegistry::new(),
        }
    }

    // -- Processors -----------------------------------------------------

    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }

    pub fn processors_mut(&mut self) -> &mut [Processor] {
        &mut self.processors
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    fn unique_name(&self, base: &str) -> String {
        let taken = |name: &str| self.processors.iter().any(|p| p.name() == name);
        let mut name = base.to_string();
        let mut n = 1;
        while taken(&name) {
            n += 1;
            name = format!("{} ({})", base, n);
        }
        name
    }

    /// Add a sprite, renaming it if the name is taken, and make it the
    /// active one. Returns the name it was stored under.
    pub fn add_processor(&mut self, mut processor: Processor) -> String {
        let name = self.unique_name(processor.name());
        processor.set_name(name.clone());
        debug!("adding sprite {}", name);
        self.processors.push(processor);
        self.active = Some(self.processors.len() - 1);
        name
    }

    /// Create a sprite from image files, one frame per file.
    ///
    /// The sprite starts with `params`. Any file that fails to load aborts
    /// the sprite and nothing is added.
    pub fn load_sprite(
        &mut self,
        name: &str,
        files: &[PathBuf],
        params: &ParameterSet,
        loader: &dyn ImageLoader,
    ) -> Result<String> {
        let mut processor = Processor::new(name);
        processor.copy_settings(params);
        for file in files {
            processor.load_image(file.clone(), loader.load(file)?)?;
        }
        Ok(self.add_processor(processor))
    }

    pub fn remove_processor(&mut self, name: &str) -> Option<Processor> {
        let index = self.processors.iter().position(|p| p.name() == name)?;
        let removed = self.processors.remove(index);
        self.active = match self.active {
            Some(a) if a == index => None,
            Some(a) if a > index => Some(a - 1),
            other => other,
        };
        Some(removed)
    }

    pub fn find(&self, name: &str) -> Option<&Processor> {
        self.processors.iter().find(|p| p.name() == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Processor> {
        self.processors.iter_mut().find(|p| p.name() == name)
    }

    // -- Selection ------------------------------------------------------

    /// Select exactly the sprites in `names`. The first becomes active and
    /// is the one bound to the parameter controls.
    ///
    /// Unknown names fail and leave the selection unchanged.
    pub fn select(&mut self, names: &[&str]) -> Result<()> {
        if let Some(missing) = names.iter().find(|n| self.find(n).is_none()) {
            return Err(LitError::InvalidArgument {
                message: format!("No sprite named '{}'", missing),
                help: None,
            });
        }

        let first = names.first().copied();
        for (i, p) in self.processors.iter_mut().enumerate() {
            let selected = names.contains(&p.name());
            p.set_selected(selected);
            let is_first = Some(p.name()) == first;
            p.set_connected(is_first);
            if is_first {
                self.active = Some(i);
            }
        }
        if first.is_none() {
            self.active = None;
        }
        Ok(())
    }

    /// Select every sprite.
    pub fn select_all(&mut self) {
        for p in &mut self.processors {
            p.set_selected(true);
            p.set_connected(false);
        }
        if let Some(p) = self.active.and_then(|i| self.processors.get_mut(i)) {
            p.set_connected(true);
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = &Processor> {
        self.processors.iter().filter(|p| p.is_selected())
    }

    /// The sprite tools and parameter edits act on.
    pub fn active(&self) -> Option<&Processor> {
        self.active.and_then(|i| self.processors.get(i))
    }

    pub fn active_mut(&mut self) -> Option<&mut Processor> {
        match self.active {
            Some(i) => self.processors.get_mut(i),
            None => None,
        }
    }

    /// Index of the sprite with private lights in use, if any.
    fn private_light_owner(&self) -> Option<usize> {
        if !self.lights_per_sprite {
            return None;
        }
        let mut selected = self
            .processors
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_selected());
        match (selected.next(), selected.next()) {
            (Some((i, _)), None) => Some(i),
            _ => None,
        }
    }

    /// Lights shading the current selection: the private list of the single
    /// selected sprite when lights are per sprite, else the sample lights.
    pub fn active_lights(&self) -> &[LightSource] {
        match self.private_light_owner().map(|i| &self.processors[i]) {
            Some(p) if !p.lights().is_empty() => p.lights(),
            _ => &self.sample_lights,
        }
    }

    /// Mutable access to the list [`Self::active_lights`] reads. A sprite's
    /// private list starts as a copy of the sample lights.
    pub fn active_lights_mut(&mut self) -> &mut Vec<LightSource> {
        match self.private_light_owner() {
            Some(i) => {
                let sample = &self.sample_lights;
                let p = &mut self.processors[i];
                if p.lights().is_empty() {
                    p.set_lights(sample.clone());
                }
                p.lights_mut()
            }
            None => &mut self.sample_lights,
        }
    }

    pub fn sample_lights(&self) -> &[LightSource] {
        &self.sample_lights
    }

    pub fn sample_lights_mut(&mut self) -> &mut Vec<LightSource> {
        &mut self.sample_lights
    }

    pub fn lights_per_sprite(&self) -> bool {
        self.lights_per_sprite
    }

    pub fn set_lights_per_sprite(&mut self, enabled: bool) {
        self.lights_per_sprite = enabled;
    }

    // -- Preview --------------------------------------------------------

    pub fn shading(&self) -> &ShadingSettings {
        &self.shading
    }

    pub fn shading_mut(&mut self) -> &mut ShadingSettings {
        &mut self.shading
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    /// Bring the current frames of the selected sprites up to date and
    /// snapshot them for rendering.
    pub fn selection(&mut self) -> Selection<'_> {
        self.refresh_selected();
        self.snapshot()
    }

    fn refresh_selected(&mut self) {
        for p in self.processors.iter_mut().filter(|p| p.is_selected()) {
            p.regenerate_current();
        }
    }

    fn snapshot(&self) -> Selection<'_> {
        Selection {
            layers: self.selected().filter_map(Processor::layer).collect(),
            lights: self.active_lights(),
        }
    }

    /// Render the selection into `viewport` in the current view mode.
    pub fn render(&mut self, viewport: &Viewport) -> RgbaImage {
        self.refresh_selected();
        let selection = self.snapshot();
        Compositor::new(&self.shading).render(&selection, self.view_mode, viewport)
    }

    /// Render the selection over its bounds at an integer `zoom`.
    ///
    /// With `out_dir` the image is also saved there, named after the active
    /// sprite's current frame with a `_v` suffix.
    pub fn render_to_buffer(
        &mut self,
        view: ViewMode,
        zoom: u32,
        out_dir: Option<&Path>,
    ) -> Result<RenderedPreview> {
        let zoom = zoom.max(1);
        let source = self
            .active()
            .and_then(Processor::current_frame)
            .map(|f| f.path().to_path_buf());

        self.refresh_selected();
        let selection = self.snapshot();
        let (min, max) = selection.bounds().ok_or_else(|| LitError::InvalidArgument {
            message: "Nothing to render: no sprite is selected".to_string(),
            help: Some("Select at least one loaded sprite".to_string()),
        })?;
        let viewport = Viewport::covering(min.floor(), max.ceil(), zoom as f32);
        let image = Compositor::new(&self.shading).render(&selection, view, &viewport);

        let path = match out_dir {
            Some(dir) => {
                let source = source.unwrap_or_else(|| PathBuf::from("preview.png"));
                let path = derived_path(&source, PREVIEW_SUFFIX, Some(dir));
                write_png(&image, &path, 1)?;
                Some(path)
            }
            None => None,
        };
        Ok(RenderedPreview { image, path })
    }

    /// Advance every playing animation. Returns `true` if any frame changed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let mut changed = false;
        for p in &mut self.processors {
            changed |= p.tick(dt);
        }
        changed
    }

    // -- Batch work and reloads ------------------------------------------

    /// Regenerate every dirty map of every sprite on the rayon pool, one
    /// task per sprite.
    pub fn regenerate_all(&mut self) {
        self.processors.par_iter_mut().for_each(Processor::regenerate);
    }

    /// Every file some sprite reads, without duplicates.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.processors.iter().flat_map(Processor::source_paths).collect();
        paths.sort();
        paths.dedup();
        paths
    }

    /// Reload `path` into every sprite that reads it. Returns how many
    /// sprites changed.
    ///
    /// Missing and empty files are ignored: an empty file is usually still
    /// being written and the next notification picks it up.
    pub fn on_source_changed(&mut self, path: &Path, loader: &dyn ImageLoader) -> Result<usize> {
        match loader.file_len(path) {
            Ok(0) => {
                debug!("{} is empty, waiting for the write to finish", path.display());
                return Ok(0);
            }
            Err(e) => {
                debug!("ignoring change to {}: {}", path.display(), e);
                return Ok(0);
            }
            Ok(_) => {}
        }

        if !self
            .processors
            .iter()
            .any(|p| p.source_paths().iter().any(|s| s == path))
        {
            return Ok(0);
        }

        let pixels = loader.load(path)?;
        let mut count = 0;
        for p in &mut self.processors {
            if p.reload_source(path, &pixels) {
                count += 1;
            }
        }
        info!("reloaded {} into {} sprite(s)", path.display(), count);
        Ok(count)
    }

    // -- Parameters -----------------------------------------------------

    /// Copy `params` into every selected sprite.
    pub fn apply_settings_to_selected(&mut self, params: &ParameterSet) {
        for p in self.processors.iter_mut().filter(|p| p.is_selected()) {
            p.copy_settings(params);
        }
    }

    // -- Tools ----------------------------------------------------------

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tools
    }

    /// Stroke with the selected tool on the active sprite.
    pub fn apply_tool(&mut self, x: u32, y: u32) -> bool {
        let Some(i) = self.active else {
            return false;
        };
        match self.processors.get_mut(i) {
            Some(p) => self.tools.apply(p, x, y),
            None => false,
        }
    }

    // -- Persistence ----------------------------------------------------

    pub fn to_record(&self) -> ProjectRecord {
        let sprites = self
            .processors
            .iter()
            .map(|p| SpriteRecord {
                name: p.name().to_string(),
                frames: p
                    .frames()
                    .iter()
                    .map(|f| FrameRecord {
                        file: f.path().to_path_buf(),
                        height_map: f.height_override().map(|s| s.path.clone()),
                        specular_map: f.specular_override().map(|s| s.path.clone()),
                        neighbours: NeighbourRecord::from_neighbours(f.neighbours()),
                    })
                    .collect(),
                parameters: p.settings().clone(),
                frame_interval: p.frame_interval().as_millis() as u64,
                position: p.position().into(),
                lights: lights_to_records(p.lights()),
            })
            .collect();

        ProjectRecord {
            general: GeneralSettings {
                shading: self.shading.clone(),
                viewmode: self.view_mode,
                lights_per_sprite: self.lights_per_sprite,
                sample_lights: lights_to_records(&self.sample_lights),
            },
            sprites,
        }
    }

    /// Replace the workspace contents with `record`.
    ///
    /// Sprites whose files fail to load are skipped; their errors are
    /// returned.
    pub fn apply_record(&mut self, record: &ProjectRecord, loader: &dyn ImageLoader) -> Vec<LitError> {
        self.processors.clear();
        self.active = None;

        let general = &record.general;
        self.shading = general.shading.clone();
        self.view_mode = general.viewmode;
        self.lights_per_sprite = general.lights_per_sprite;
        self.sample_lights = lights_from_records(&general.sample_lights);

        let mut errors = Vec::new();
        for sprite in &record.sprites {
            match restore_sprite(sprite, loader) {
                Ok(p) => {
                    self.add_processor(p);
                }
                Err(e) => {
                    warn!("cannot restore sprite {}: {}", sprite.name, e);
                    errors.push(e);
                }
            }
        }
        errors
    }
}

fn restore_sprite(record: &SpriteRecord, loader: &dyn ImageLoader) -> Result<Processor> {
    let mut p = Processor::new(record.name.clone());
    p.copy_settings(&record.parameters);
    if record.frame_interval > 0 {
        p.set_frame_interval(Duration::from_millis(record.frame_interval));
    }
    p.set_position(Vec2::from(record.position));
    p.set_lights(lights_from_records(&record.lights));

    for frame in &record.frames {
        let index = p.load_image(frame.file.clone(), loader.load(&frame.file)?)?;
        p.set_current_frame(index as isize);
        if let Some(path) = &frame.height_map {
            p.load_height_map(path.clone(), loader.load(path)?)?;
        }
        if let Some(path) = &frame.specular_map {
            p.load_specular_map(path.clone(), loader.load(path)?)?;
        }
        for slot in &frame.neighbours {
            let tile = match &slot.file {
                Some(path) => NeighbourTile::tile(path.clone(), loader.load(path)?),
                None => NeighbourTile::Empty,
            };
            p.set_neighbour(slot.row, slot.col, tile);
        }
    }
    p.set_current_frame(0);
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectRecord;
    use crate::tools::PixelBrush;
    use crate::types::{Colour, MapKind, Setting};
    use image::Rgba;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::collections::HashMap;
    use tempfile::tempdir;

    /// Loader over in-memory images.
    #[derive(Default)]
    struct MemoryLoader {
        images: HashMap<PathBuf, RgbaImage>,
        empty: Vec<PathBuf>,
        loads: Cell<usize>,
    }

    impl MemoryLoader {
        fn with(mut self, path: &str, image: RgbaImage) -> Self {
            self.images.insert(PathBuf::from(path), image);
            self
        }
    }

    impl ImageLoader for MemoryLoader {
        fn load(&self, path: &Path) -> Result<RgbaImage> {
            self.loads.set(self.loads.get() + 1);
            self.images.get(path).cloned().ok_or_else(|| LitError::Decode {
                path: path.to_path_buf(),
                message: "not found".to_string(),
            })
        }

        fn file_len(&self, path: &Path) -> Result<u64> {
            if self.empty.iter().any(|p| p == path) {
                return Ok(0);
            }
            match self.images.get(path) {
                Some(img) => Ok(img.as_raw().len() as u64),
                None => Err(LitError::Io {
                    path: path.to_path_buf(),
                    message: "missing".to_string(),
                }),
            }
        }
    }

    fn blob(w: u32, h: u32, shade: u8) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            if x > 1 && y > 1 && x + 2 < w && y + 2 < h {
                Rgba([shade, shade / 2, (x * 9) as u8, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
    }

    fn loader() -> MemoryLoader {
        MemoryLoader::default()
            .with("hero_1.png", blob(12, 12, 200))
            .with("hero_2.png", blob(12, 12, 90))
            .with("hero_h.png", blob(12, 12, 30))
            .with("rock.png", blob(8, 8, 140))
            .with("big.png", blob(16, 16, 140))
    }

    fn workspace(loader: &MemoryLoader) -> Workspace {
        let mut ws = Workspace::new();
        let files = [PathBuf::from("hero_1.png"), PathBuf::from("hero_2.png")];
        ws.load_sprite("hero", &files, &ParameterSet::default(), loader).unwrap();
        ws.load_sprite("rock", &[PathBuf::from("rock.png")], &ParameterSet::default(), loader)
            .unwrap();
        ws
    }

    #[test]
    fn test_add_processor_makes_names_unique() {
        let mut ws = Workspace::new();
        assert_eq!(ws.add_processor(Processor::new("hero")), "hero");
        assert_eq!(ws.add_processor(Processor::new("hero")), "hero (2)");
        assert_eq!(ws.add_processor(Processor::new("hero")), "hero (3)");
        assert_eq!(ws.active().unwrap().name(), "hero (3)");
    }

    #[test]
    fn test_load_sprite_failure_adds_nothing() {
        let loader = loader();
        let mut ws = Workspace::new();
        let files = [PathBuf::from("rock.png"), PathBuf::from("big.png")];
        let err = ws
            .load_sprite("bad", &files, &ParameterSet::default(), &loader)
            .unwrap_err();
        assert!(matches!(err, LitError::DimensionMismatch { .. }));
        assert!(ws.is_empty());
    }

    #[test]
    fn test_remove_processor_keeps_active_pointer() {
        let loader = loader();
        let mut ws = workspace(&loader);
        ws.select(&["rock"]).unwrap();

        ws.remove_processor("hero").unwrap();
        assert_eq!(ws.active().unwrap().name(), "rock");

        ws.remove_processor("rock").unwrap();
        assert!(ws.active().is_none());
        assert!(ws.remove_processor("rock").is_none());
    }

    #[test]
    fn test_select_sets_flags() {
        let loader = loader();
        let mut ws = workspace(&loader);

        ws.select(&["rock", "hero"]).unwrap();
        assert_eq!(ws.active().unwrap().name(), "rock");
        assert!(ws.find("rock").unwrap().is_connected());
        assert!(!ws.find("hero").unwrap().is_connected());
        assert_eq!(ws.selected().count(), 2);

        assert!(ws.select(&["ghost"]).is_err());
        assert_eq!(ws.selected().count(), 2);

        ws.select(&[]).unwrap();
        assert!(ws.active().is_none());
    }

    #[test]
    fn test_active_lights() {
        let loader = loader();
        let mut ws = workspace(&loader);
        ws.select(&["hero"]).unwrap();
        assert_eq!(ws.active_lights().len(), 1);

        ws.set_lights_per_sprite(true);
        // Empty private list falls back to the sample lights
        assert_eq!(ws.active_lights(), ws.sample_lights());

        ws.active_lights_mut().push(LightSource::at(1.0, 1.0, 5.0));
        assert_eq!(ws.active_lights().len(), 2);
        assert_eq!(ws.sample_lights().len(), 1);
        assert_eq!(ws.find("hero").unwrap().lights().len(), 2);

        // Several selected sprites share the sample lights
        ws.select(&["hero", "rock"]).unwrap();
        assert_eq!(ws.active_lights().len(), 1);
    }

    #[test]
    fn test_selection_regenerates_current_frames() {
        let loader = loader();
        let mut ws = workspace(&loader);
        ws.select(&["hero", "rock"]).unwrap();

        let selection = ws.selection();
        assert_eq!(selection.layers.len(), 2);
        assert_eq!(selection.layers[0].normal.dimensions(), (12, 12));
        assert_eq!(selection.layers[1].occlusion.dimensions(), (8, 8));
    }

    #[test]
    fn test_render_to_buffer() {
        let loader = loader();
        let mut ws = workspace(&loader);
        ws.select(&["hero"]).unwrap();
        let dir = tempdir().unwrap();

        let native = ws.render_to_buffer(ViewMode::Preview, 1, Some(dir.path())).unwrap();
        assert_eq!(native.image.dimensions(), (12, 12));
        assert_eq!(native.path, Some(dir.path().join("hero_1_v.png")));
        assert!(dir.path().join("hero_1_v.png").exists());

        let zoomed = ws.render_to_buffer(ViewMode::Preview, 3, None).unwrap();
        assert_eq!(zoomed.image.dimensions(), (36, 36));
        assert!(zoomed.path.is_none());

        // Matches the on-screen render at zoom 1
        let screen = ws.render(&Viewport::new(12, 12).with_zoom(1.0));
        assert_eq!(screen, native.image);

        ws.select(&[]).unwrap();
        assert!(ws.render_to_buffer(ViewMode::Preview, 1, None).is_err());
    }

    #[test]
    fn test_background_outside_sprites() {
        let loader = loader();
        let mut ws = workspace(&loader);
        ws.select(&["rock"]).unwrap();
        ws.set_view_mode(ViewMode::Texture);

        let img = ws.render(&Viewport::new(20, 20));
        let bg = Colour::BACKGROUND;
        assert_eq!(img.get_pixel(15, 15).0, [bg.r, bg.g, bg.b, 255]);
    }

    #[test]
    fn test_regenerate_all_cleans_everything() {
        let loader = loader();
        let mut ws = workspace(&loader);
        ws.regenerate_all();
        assert!(ws.processors().iter().all(Processor::is_clean));
    }

    #[test]
    fn test_on_source_changed() {
        let mut loader = loader();
        let mut ws = workspace(&loader);
        ws.regenerate_all();

        loader.images.insert(PathBuf::from("hero_2.png"), blob(12, 12, 10));
        let loads = loader.loads.get();
        assert_eq!(ws.on_source_changed(Path::new("hero_2.png"), &loader).unwrap(), 1);
        assert_eq!(loader.loads.get(), loads + 1);

        let hero = ws.find("hero").unwrap();
        assert!(hero.frames()[0].is_clean());
        assert!(!hero.frames()[1].is_clean());
        assert!(ws.find("rock").unwrap().is_clean());

        // Unknown, missing and empty files are ignored without decoding
        assert_eq!(ws.on_source_changed(Path::new("big.png"), &loader).unwrap(), 0);
        assert_eq!(ws.on_source_changed(Path::new("gone.png"), &loader).unwrap(), 0);
        loader.empty.push(PathBuf::from("rock.png"));
        assert_eq!(ws.on_source_changed(Path::new("rock.png"), &loader).unwrap(), 0);
        assert_eq!(loader.loads.get(), loads + 1);
    }

    #[test]
    fn test_apply_settings_to_selected() {
        let loader = loader();
        let mut ws = workspace(&loader);
        ws.select(&["rock"]).unwrap();

        let mut params = ParameterSet::default();
        params.specular.blur = 7;
        ws.apply_settings_to_selected(&params);

        assert_eq!(ws.find("rock").unwrap().settings().specular.blur, 7);
        assert_eq!(ws.find("hero").unwrap().settings().specular.blur, 1);
    }

    #[test]
    fn test_apply_tool_hits_active_sprite() {
        let loader = loader();
        let mut ws = workspace(&loader);
        ws.tools_mut()
            .register(Box::new(PixelBrush::new(Colour::WHITE, 0)))
            .unwrap();

        assert!(!ws.apply_tool(4, 4));
        ws.tools_mut().select("pixel").unwrap();
        ws.select(&["hero"]).unwrap();
        assert!(ws.apply_tool(4, 4));

        assert_eq!(ws.find("hero").unwrap().texture().unwrap().get_pixel(4, 4).0, [255; 4]);
        assert_ne!(ws.find("rock").unwrap().texture().unwrap().get_pixel(4, 4).0, [255; 4]);
    }

    #[test]
    fn test_record_round_trip_reproduces_maps() {
        let loader = loader();
        let mut ws = workspace(&loader);
        {
            let hero = ws.find_mut("hero").unwrap();
            hero.apply(Setting::NormalDepth(300));
            hero.apply(Setting::BevelDistance(3));
            hero.apply(Setting::OcclusionDistanceMode(true));
            hero.set_current_frame(1);
            hero.load_height_map("hero_h.png", loader.load(Path::new("hero_h.png")).unwrap())
                .unwrap();
            hero.set_position(Vec2::new(20.0, 4.0));
        }
        ws.shading_mut().toon = true;
        ws.set_view_mode(ViewMode::Occlusion);
        ws.regenerate_all();

        let json = ws.to_record().to_json().unwrap();
        let record = ProjectRecord::from_json(&json).unwrap();
        assert_eq!(record, ws.to_record());

        let mut restored = Workspace::new();
        assert!(restored.apply_record(&record, &loader).is_empty());
        restored.regenerate_all();

        assert_eq!(restored.to_record(), ws.to_record());
        for (a, b) in ws.processors().iter().zip(restored.processors()) {
            assert_eq!(a.frame_count(), b.frame_count());
            for (fa, fb) in a.frames().iter().zip(b.frames()) {
                for kind in MapKind::ALL {
                    assert_eq!(fa.cached(kind), fb.cached(kind), "{} {}", a.name(), kind);
                }
            }
        }
    }

    #[test]
    fn test_record_round_trip_keeps_neighbour_tiles() {
        let loader = loader().with("sky.png", blob(12, 12, 250));
        let mut ws = workspace(&loader);
        {
            let hero = ws.find_mut("hero").unwrap();
            hero.apply(Setting::Tileable(true));
            hero.apply(Setting::BevelDistance(2));
            hero.set_current_frame(1);
            hero.set_neighbour(
                0,
                1,
                NeighbourTile::tile("sky.png", loader.load(Path::new("sky.png")).unwrap()),
            );
            hero.set_neighbour(1, 0, NeighbourTile::Empty);
        }
        ws.regenerate_all();

        let record = ProjectRecord::from_json(&ws.to_record().to_json().unwrap()).unwrap();
        assert_eq!(
            record.sprites[0].frames[1].neighbours,
            vec![
                NeighbourRecord { row: 0, col: 1, file: Some(PathBuf::from("sky.png")) },
                NeighbourRecord { row: 1, col: 0, file: None },
            ]
        );
        assert!(record.sprites[0].frames[0].neighbours.is_empty());

        let mut restored = Workspace::new();
        assert!(restored.apply_record(&record, &loader).is_empty());
        restored.regenerate_all();

        let (a, b) = (ws.find("hero").unwrap(), restored.find("hero").unwrap());
        assert_eq!(b.frames()[1].neighbours().paths(), vec![PathBuf::from("sky.png")]);
        assert!(matches!(b.frames()[1].neighbours().get(1, 0), NeighbourTile::Empty));
        assert_eq!(
            a.frames()[1].cached(MapKind::Normal),
            b.frames()[1].cached(MapKind::Normal)
        );
        assert!(b.source_paths().contains(&PathBuf::from("sky.png")));
    }

    #[test]
    fn test_apply_record_reports_missing_files() {
        let loader = loader();
        let mut record = workspace(&loader).to_record();
        record.sprites[1].frames[0].file = PathBuf::from("missing.png");

        let mut ws = Workspace::new();
        let errors = ws.apply_record(&record, &loader);
        assert_eq!(errors.len(), 1);
        assert_eq!(ws.len(), 1);
        assert_eq!(ws.processors()[0].name(), "hero");
    }
}
