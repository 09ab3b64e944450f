//! Components of the `voxbake` command-line tool, which converts voxel models described
//! in JSON to MagicaVoxel `.vox` files.
//!
//! This library is not intended to be used by other programs; it exists so that the
//! binary's parts can be tested separately.

// Crate-specific lint settings. (General settings can be found in the workspace manifest.)
#![forbid(unsafe_code)]

use std::fs;
use std::path::Path;

use anyhow::Context as _;

use voxbake::{DotVoxExport, ExportOptions, Exporter, YieldProgress};

pub mod config_files;
pub mod input;
pub mod logging;

/// Reads the model in `input_path`, exports it with `options`, and writes the result
/// to `output_path`.
///
/// If `check` is true, the written file is read back and its structure verified.
pub fn bake(
    input_path: &Path,
    output_path: &Path,
    options: &ExportOptions,
    check: bool,
    progress: YieldProgress,
) -> Result<DotVoxExport, anyhow::Error> {
    let mesh = input::read_mesh(input_path)?;
    log::debug!(
        "Read {count} voxels from {path}",
        count = mesh.len(),
        path = input_path.to_string_lossy()
    );

    let export = Exporter::new()
        .export(Some(&mesh), options, progress)
        .context("export failed")?;
    if !export.flaws.is_empty() {
        log::info!("Export is imperfect: {flaws}", flaws = export.flaws);
    }

    fs::write(output_path, &export.bytes).with_context(|| {
        format!(
            "failed to write {path}",
            path = output_path.to_string_lossy()
        )
    })?;

    if check {
        let written = fs::read(output_path).with_context(|| {
            format!(
                "failed to read back {path}",
                path = output_path.to_string_lossy()
            )
        })?;
        let summary = voxbake::chunk::verify(&written).with_context(|| {
            format!(
                "written file {path} is malformed",
                path = output_path.to_string_lossy()
            )
        })?;
        log::info!(
            "Checked {path}: version {version}, size {x}×{y}×{z}, {count} voxels",
            path = output_path.to_string_lossy(),
            version = summary.version,
            x = summary.size[0],
            y = summary.size[1],
            z = summary.size[2],
            count = summary.voxel_count,
        );
    }

    Ok(export)
}

/// Creates a [`YieldProgress`] which displays its progress in a new progress bar.
///
/// The caller should finish the returned bar when done.
pub fn yield_progress_with_bar() -> (YieldProgress, indicatif::ProgressBar) {
    let progress_bar = logging::new_progress_bar(100).with_prefix("Baking");
    progress_bar.set_position(0);
    let yield_progress = {
        let progress_bar = progress_bar.clone();
        yield_progress::Builder::new()
            .progress_using(move |info| {
                progress_bar.set_position((info.fraction() * 100.0) as u64);
                progress_bar.set_message(String::from(info.label_str()));
            })
            .build()
    };
    (yield_progress, progress_bar)
}
