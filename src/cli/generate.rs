//! Generate command implementation.
//!
//! Loads source images, generates the requested lighting maps for every
//! frame and writes them as `_n`, `_p`, `_s` and `_o` PNGs.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;

use crate::error::Result;
use crate::image_io::export_maps;
use crate::output::{display_path, plural, Printer};
use crate::types::MapKind;
use crate::workspace::Workspace;

use super::{discover_inputs, load_project, load_workspace};

/// Generate lighting maps from source images
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Image files or directories (default: current directory)
    pub paths: Vec<PathBuf>,

    /// Output directory (default: next to each source image)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Maps to write, comma separated (default: all)
    #[arg(long, value_delimiter = ',')]
    pub maps: Vec<MapKind>,

    /// Load sprites and parameters from a project file instead of scanning
    #[arg(long, conflicts_with = "paths")]
    pub project: Option<PathBuf>,

    /// Save the loaded sprites as a project file
    #[arg(long)]
    pub save_project: Option<PathBuf>,
}

pub fn run(args: GenerateArgs, printer: &Printer) -> Result<()> {
    let start = Instant::now();

    let (mut workspace, manifest_maps, manifest_output) = match &args.project {
        Some(path) => (load_project(path, printer)?, MapKind::ALL.to_vec(), None),
        None => {
            printer.status("Scanning", &scan_label(&args.paths));
            let discovery = discover_inputs(&args.paths)?;
            if !discovery.scan.skipped.is_empty() {
                printer.info(
                    "Ignored",
                    &plural(discovery.scan.skipped.len(), "generated map", "generated maps"),
                );
            }
            let output = discovery.manifest.output.as_ref().map(|o| discovery.root.join(o));
            (
                load_workspace(&discovery, printer),
                discovery.manifest.maps.clone(),
                output,
            )
        }
    };

    if workspace.is_empty() {
        printer.warning("Warning", "No source images found");
        return Ok(());
    }

    let kinds = if args.maps.is_empty() { manifest_maps } else { args.maps.clone() };
    let out_dir = args.output.clone().or(manifest_output);

    workspace.regenerate_all();
    let written = export_workspace(&mut workspace, &kinds, out_dir.as_deref(), printer)?;

    if let Some(path) = &args.save_project {
        workspace.to_record().save(path)?;
        printer.status("Saved", &display_path(path));
    }

    printer.success(
        "Finished",
        &format!(
            "{} for {} in {:.2}s",
            plural(written, "map", "maps"),
            plural(workspace.len(), "sprite", "sprites"),
            start.elapsed().as_secs_f64()
        ),
    );
    Ok(())
}

/// Write `kinds` for every sprite. Returns the number of files written.
pub(crate) fn export_workspace(
    workspace: &mut Workspace,
    kinds: &[MapKind],
    out_dir: Option<&Path>,
    printer: &Printer,
) -> Result<usize> {
    let mut total = 0;
    for processor in workspace.processors_mut() {
        let written = export_maps(processor, kinds, out_dir)?;
        for path in &written {
            printer.status("Wrote", &printer.cyan(&display_path(path)));
        }
        total += written.len();
    }
    Ok(total)
}

fn scan_label(paths: &[PathBuf]) -> String {
    match paths {
        [] => ".".to_string(),
        [one] => display_path(one),
        many => plural(many.len(), "path", "paths"),
    }
}
