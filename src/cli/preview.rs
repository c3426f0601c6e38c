//! Preview command implementation.
//!
//! Renders the loaded sprites under the sample lights and saves the result
//! as a `_v` PNG.

use std::path::{Path, PathBuf};

use clap::Args;
use glam::Vec2;

use crate::error::{LitError, Result};
use crate::output::{display_path, Printer};
use crate::types::{Colour, LightSource, ViewMode};
use crate::workspace::Workspace;

use super::{discover_inputs, load_project, load_workspace};

/// Render a lit preview of one or more sprites
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Image files or directories (default: current directory)
    pub paths: Vec<PathBuf>,

    /// What to show: texture, normal, parallax, specular, occlusion or preview
    #[arg(long)]
    pub view: Option<ViewMode>,

    /// Integer upscaling of the rendered preview
    #[arg(long)]
    pub zoom: Option<u32>,

    /// Output directory (default: the project root)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Add a light as X,Y,HEIGHT[,#RRGGBB]; repeat for more lights
    #[arg(long = "light", value_name = "LIGHT")]
    pub lights: Vec<String>,

    /// Ambient light, 0 to 100
    #[arg(long)]
    pub ambient: Option<i32>,

    /// Mix between the unlit (0) and lit (100) texture
    #[arg(long)]
    pub blend: Option<i32>,

    /// Quantize the lighting into bands
    #[arg(long)]
    pub toon: bool,

    /// Show this animation frame of every sprite
    #[arg(long)]
    pub frame: Option<usize>,

    /// Load sprites, lights and shading from a project file
    #[arg(long, conflicts_with = "paths")]
    pub project: Option<PathBuf>,
}

pub fn run(args: PreviewArgs, printer: &Printer) -> Result<PathBuf> {
    let lights = args
        .lights
        .iter()
        .map(String::as_str)
        .map(parse_light)
        .collect::<Result<Vec<_>>>()?;

    let (mut workspace, zoom, out_dir) = match &args.project {
        Some(path) => {
            let workspace = load_project(path, printer)?;
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (workspace, 1, dir)
        }
        None => {
            let discovery = discover_inputs(&args.paths)?;
            let mut workspace = load_workspace(&discovery, printer);
            arrange_in_row(&mut workspace);
            centre_sample_light(&mut workspace);
            let dir = match &discovery.manifest.output {
                Some(out) => discovery.root.join(out),
                None => discovery.root.clone(),
            };
            (workspace, discovery.manifest.effective_zoom(), dir)
        }
    };

    if workspace.is_empty() {
        return Err(LitError::InvalidArgument {
            message: "No sprites to preview".to_string(),
            help: Some("Pass image files or a directory containing images".to_string()),
        });
    }

    if !lights.is_empty() {
        workspace.set_lights_per_sprite(false);
        *workspace.sample_lights_mut() = lights;
    }
    let shading = workspace.shading_mut();
    if let Some(ambient) = args.ambient {
        shading.ambient_light = ambient;
    }
    if let Some(blend) = args.blend {
        shading.blend = blend;
    }
    shading.toon |= args.toon;

    if let Some(frame) = args.frame {
        for p in workspace.processors_mut() {
            p.set_current_frame(frame as isize);
        }
    }

    let view = args.view.unwrap_or_else(|| workspace.view_mode());
    let zoom = args.zoom.unwrap_or(zoom);
    let out_dir = args.output.unwrap_or(out_dir);

    workspace.select_all();
    let rendered = workspace.render_to_buffer(view, zoom, Some(&out_dir))?;
    let (w, h) = rendered.image.dimensions();
    let path = rendered.path.unwrap_or(out_dir);

    printer.success(
        "Rendered",
        &format!("{} {}", printer.cyan(&display_path(&path)), printer.dim(&format!("({}x{})", w, h))),
    );
    Ok(path)
}

/// Parse `X,Y,HEIGHT` with an optional `,#RRGGBB` colour.
pub fn parse_light(s: &str) -> Result<LightSource> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let invalid = || LitError::Parse {
        message: format!("Invalid light '{}'", s),
        help: Some("Use X,Y,HEIGHT or X,Y,HEIGHT,#RRGGBB, for example 16,8,40".to_string()),
    };
    if !(3..=4).contains(&parts.len()) {
        return Err(invalid());
    }

    let mut coords = [0.0f32; 3];
    for (slot, part) in coords.iter_mut().zip(&parts) {
        *slot = part.parse().map_err(|_| invalid())?;
    }

    let mut light = LightSource::at(coords[0], coords[1], 0.0);
    light.set_height(coords[2]);
    if let Some(colour) = parts.get(3) {
        light.set_color(colour.parse::<Colour>()?);
    }
    Ok(light)
}

/// Place sprites left to right in load order.
fn arrange_in_row(workspace: &mut Workspace) {
    let mut x = 0.0;
    for p in workspace.processors_mut() {
        p.set_position(Vec2::new(x, 0.0));
        if let Some((w, _)) = p.dimensions() {
            x += w as f32;
        }
    }
}

/// Move the sample lights above the centre of the loaded sprites, keeping
/// their heights.
fn centre_sample_light(workspace: &mut Workspace) {
    let (mut width, mut height) = (0u32, 0u32);
    for p in workspace.processors() {
        if let Some((w, h)) = p.dimensions() {
            width += w;
            height = height.max(h);
        }
    }
    let centre = Vec2::new(width as f32, height as f32) / 2.0;
    for light in workspace.sample_lights_mut() {
        light.position.x = centre.x;
        light.position.y = centre.y;
    }
}
