//! Render command - produce the concrete manifest without touching a cluster

use std::path::PathBuf;

use super::{ResolvedInputs, render_manifest, write_manifest};
use crate::display;
use crate::error::Result;

/// Options for the render command
pub struct RenderOptions {
    pub release: String,
    pub namespace: String,
    pub output: PathBuf,
    pub show_values_path: Option<PathBuf>,
    pub dry_run: bool,
}

/// Run the render command
pub fn run(inputs: &ResolvedInputs, opts: &RenderOptions) -> Result<()> {
    if opts.dry_run {
        display::step("dry run - nothing will be written");
        println!(
            "  would render {} templates from bundle '{}'",
            inputs.bundle.templates.len(),
            inputs.bundle.metadata.name
        );
        println!("  would write the manifest to {}", opts.output.display());
        return Ok(());
    }

    let values_file = inputs
        .values
        .write_to_disk(opts.show_values_path.as_deref())?;
    if let Some(path) = &opts.show_values_path {
        display::done(&format!("wrote merged values to {}", path.display()));
    } else {
        tracing::debug!(path = %values_file.path().display(), "merged values written");
    }

    let result = render_manifest(inputs, &opts.release, &opts.namespace)?;
    write_manifest(&result, &opts.output)?;

    if opts.output.as_os_str() != "-" {
        display::done(&format!(
            "rendered {} manifests to {}",
            result.manifests.len(),
            opts.output.display()
        ));
    }

    Ok(())
}
