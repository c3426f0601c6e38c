pub mod completions;
pub mod generate;
pub mod init;
pub mod preview;
pub mod split;
pub mod watch;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::Manifest;
use crate::discovery::{discover, discover_paths, DiscoveryResult};
use crate::error::Result;
use crate::image_io::FsImageLoader;
use crate::output::{display_path, plural, Printer};
use crate::project::ProjectRecord;
use crate::workspace::Workspace;

/// litsprite - Lighting maps and lit previews for 2D sprites
#[derive(Parser, Debug)]
#[command(name = "litsprite")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate normal, parallax, specular and occlusion maps
    Generate(generate::GenerateArgs),

    /// Render a lit preview of one or more sprites
    Preview(preview::PreviewArgs),

    /// Split a sprite sheet into numbered frame images
    Split(split::SplitArgs),

    /// Regenerate maps whenever a source image changes
    Watch(watch::WatchArgs),

    /// Initialize a litsprite project (generates litsprite.yaml)
    Init(init::InitArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Discover sprites from the command line paths.
///
/// A single directory is treated as a project root and honours its
/// `litsprite.yaml`; anything else is scanned with default options.
pub(crate) fn discover_inputs(paths: &[PathBuf]) -> Result<DiscoveryResult> {
    match paths {
        [] => discover("."),
        [dir] if dir.is_dir() => discover(dir),
        _ => discover_paths(paths, Manifest::default()),
    }
}

/// Load every discovered sprite into a fresh workspace.
///
/// Sprites that fail to load are reported and skipped.
pub(crate) fn load_workspace(discovery: &DiscoveryResult, printer: &Printer) -> Workspace {
    let manifest = &discovery.manifest;
    let mut workspace = Workspace::new();
    *workspace.shading_mut() = manifest.shading.clone();

    for source in &discovery.sprites {
        match workspace.load_sprite(&source.name, &source.files, &manifest.parameters, &FsImageLoader) {
            Ok(name) => {
                if let Some(p) = workspace.find_mut(&name) {
                    p.set_frame_interval(manifest.frame_interval());
                }
                let detail = if source.is_animation() {
                    format!(" ({})", plural(source.files.len(), "frame", "frames"))
                } else {
                    String::new()
                };
                printer.status("Loaded", &format!("{}{}", name, printer.dim(&detail)));
            }
            Err(e) => printer.warning("Skipped", &format!("{}: {}", source.name, e)),
        }
    }
    workspace
}

/// Restore a workspace from a project file.
pub(crate) fn load_project(path: &Path, printer: &Printer) -> Result<Workspace> {
    printer.status("Opening", &display_path(path));
    let record = ProjectRecord::load(path)?;
    let mut workspace = Workspace::new();
    for error in workspace.apply_record(&record, &FsImageLoader) {
        printer.warning("Skipped", &error.to_string());
    }
    Ok(workspace)
}
