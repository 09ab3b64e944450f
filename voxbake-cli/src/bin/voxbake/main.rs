//! Binary for the `voxbake` command-line tool.

// Crate-specific lint settings. (General settings can be found in the workspace manifest.)
#![forbid(unsafe_code)]

use std::time::Instant;

use clap::Parser as _;

use voxbake_cli::logging;

mod command_options;
use command_options::VoxbakeArgs;

fn main() -> Result<(), anyhow::Error> {
    let options = VoxbakeArgs::parse();
    logging::install(&options.logging)?;

    let export_options = options.export_options()?;
    // Destructure as a check that we're using/skipping all the args
    let VoxbakeArgs {
        input_file,
        output_file,
        palette: _,
        quantizer: _,
        key_colors: _,
        no_shading: _,
        max_voxels: _,
        check,
        config: _,
        logging: _,
    } = options;

    let start_time = Instant::now();
    let (progress, progress_bar) = voxbake_cli::yield_progress_with_bar();
    let result = voxbake_cli::bake(&input_file, &output_file, &export_options, check, progress);
    progress_bar.finish_and_clear();
    let export = result?;

    log::info!(
        "Wrote {count} voxels with {colors} palette colors to {path} ({time:.3} s)",
        count = export.voxels_written,
        colors = export.palette.len(),
        path = output_file.to_string_lossy(),
        time = start_time.elapsed().as_secs_f32(),
    );
    Ok(())
}
