//! Brush tools that paint on the active sprite.
//!
//! A tool is anything implementing [`BrushTool`]; the crate ships
//! [`PixelBrush`] and hosts others through a [`ToolRegistry`]. At most one
//! tool is selected at a time. Strokes go to whichever sprite is active when
//! they land, so tools never hold on to a sprite themselves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::Rgba;
use log::{debug, warn};

use crate::error::{LitError, Result};
use crate::sprite::Processor;
use crate::types::Colour;

/// Named numeric settings of a tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolConfig {
    values: BTreeMap<String, f32>,
}

impl ToolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: f32) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<f32> {
        self.values.get(key).copied()
    }

    pub fn get_or(&self, key: &str, default: f32) -> f32 {
        self.get(key).unwrap_or(default)
    }

    pub fn set(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_string(), value);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

pub trait BrushTool {
    fn name(&self) -> &str;

    fn icon(&self) -> Option<&Path> {
        None
    }

    fn config(&self) -> &ToolConfig;

    fn config_mut(&mut self) -> &mut ToolConfig;

    fn is_selected(&self) -> bool;

    fn set_selected(&mut self, selected: bool);

    /// Stroke at texture pixel (`x`, `y`) of the sprite's current frame.
    /// Returns `true` if any pixel changed.
    fn apply(&mut self, processor: &mut Processor, x: u32, y: u32) -> bool;
}

/// Paints a solid square of `radius` around the cursor into the diffuse.
///
/// Config keys: `radius`, and the colour as `r`, `g`, `b`, `a` (0..=255).
#[derive(Debug, Clone)]
pub struct PixelBrush {
    config: ToolConfig,
    icon: Option<PathBuf>,
    selected: bool,
}

impl PixelBrush {
    pub fn new(colour: Colour, radius: u32) -> Self {
        let config = ToolConfig::new()
            .with("radius", radius as f32)
            .with("r", colour.r as f32)
            .with("g", colour.g as f32)
            .with("b", colour.b as f32)
            .with("a", colour.a as f32);
        Self {
            config,
            icon: None,
            selected: false,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<PathBuf>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Premultiplied paint colour.
    fn paint(&self) -> Rgba<u8> {
        let channel = |key: &str| self.config.get_or(key, 255.0).clamp(0.0, 255.0);
        let a = channel("a");
        let premul = |c: f32| (c * a / 255.0).round() as u8;
        Rgba([premul(channel("r")), premul(channel("g")), premul(channel("b")), a as u8])
    }
}

impl BrushTool for PixelBrush {
    fn name(&self) -> &str {
        "pixel"
    }

    fn icon(&self) -> Option<&Path> {
        self.icon.as_deref()
    }

    fn config(&self) -> &ToolConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut ToolConfig {
        &mut self.config
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn apply(&mut self, processor: &mut Processor, x: u32, y: u32) -> bool {
        let (w, h) = match processor.dimensions() {
            Some(size) => size,
            None => return false,
        };
        if x >= w || y >= h {
            return false;
        }

        let radius = self.config.get_or("radius", 0.0).max(0.0) as u32;
        let paint = self.paint();
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius).min(w - 1);
        let y1 = (y + radius).min(h - 1);

        let stroke = processor.edit_current_frame(|img| {
            for py in y0..=y1 {
                for px in x0..=x1 {
                    img.put_pixel(px, py, paint);
                }
            }
        });
        match stroke {
            Ok(()) => true,
            Err(e) => {
                warn!("{}: {}", self.name(), e);
                false
            }
        }
    }
}

/// The installed tools and which one is selected.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn BrushTool>>,
    current: Option<usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a tool. Names must be unique.
    pub fn register(&mut self, mut tool: Box<dyn BrushTool>) -> Result<()> {
        if self.tools.iter().any(|t| t.name() == tool.name()) {
            return Err(LitError::InvalidArgument {
                message: format!("A tool named '{}' is already installed", tool.name()),
                help: None,
            });
        }
        tool.set_selected(false);
        self.tools.push(tool);
        Ok(())
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Select `name`, deselecting every other tool.
    pub fn select(&mut self, name: &str) -> Result<()> {
        let index = self
            .tools
            .iter()
            .position(|t| t.name() == name)
            .ok_or_else(|| LitError::InvalidArgument {
                message: format!("No tool named '{}'", name),
                help: Some(format!("Installed tools: {}", self.names().join(", "))),
            })?;

        for (i, tool) in self.tools.iter_mut().enumerate() {
            tool.set_selected(i == index);
        }
        self.current = Some(index);
        debug!("selected tool {}", name);
        Ok(())
    }

    pub fn deselect(&mut self) {
        if let Some(tool) = self.current.take().and_then(|i| self.tools.get_mut(i)) {
            tool.set_selected(false);
        }
    }

    pub fn current(&self) -> Option<&dyn BrushTool> {
        self.current.and_then(|i| self.tools.get(i)).map(|t| t.as_ref())
    }

    pub fn current_mut(&mut self) -> Option<&mut (dyn BrushTool + 'static)> {
        match self.current {
            Some(i) => self.tools.get_mut(i).map(|t| t.as_mut()),
            None => None,
        }
    }

    /// Stroke with the selected tool. Nothing happens without a selected
    /// tool or while the sprite's animation plays.
    pub fn apply(&mut self, processor: &mut Processor, x: u32, y: u32) -> bool {
        if !processor.affordances().edit_parameters {
            return false;
        }
        match self.current_mut() {
            Some(tool) => tool.apply(processor, x, y),
            None => false,
        }
    }
}
