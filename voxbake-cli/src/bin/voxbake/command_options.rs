//! Command line option parsing.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use clap::builder::{PossibleValuesParser, TypedValueParser};
use strum::IntoEnumIterator as _;

use voxbake::{ExportOptions, FILE_EXTENSION, PaletteMode, QuantizerKind};
use voxbake_cli::config_files::ConfigArgs;
use voxbake_cli::logging::LoggingArgs;

#[derive(Clone, Debug, Parser)]
#[command(
    name = "voxbake", author, about, version,
    help_template = "\
{name} {version}
{about-with-newline}
{usage-heading}
    {usage}

{all-args}{after-help}",
)]
pub(crate) struct VoxbakeArgs {
    /// JSON file describing the model to export.
    #[arg(value_name = "INPUT")]
    pub(crate) input_file: PathBuf,

    /// Output file name, which must have the extension “.vox”.
    #[arg(
        long = "output",
        short = 'o',
        value_name = "FILE",
        value_parser = clap::builder::PathBufValueParser::new().try_map(|value| {
            check_output_extension(&value)?;
            Ok::<PathBuf, &str>(value)
        }),
    )]
    pub(crate) output_file: PathBuf,

    /// How to choose the palette.
    ///
    /// “preset” uses a fixed general-purpose palette; “adaptive” builds one from the
    /// model's own colors.
    #[arg(
        long = "palette",
        value_name = "MODE",
        value_parser = PossibleValuesParser::new(
            PaletteMode::iter().map(<&'static str>::from)
        ).try_map(|string| PaletteMode::from_str(&string)),
    )]
    pub(crate) palette: Option<PaletteMode>,

    /// How to reduce an adaptive palette when the model has more than 255 colors.
    #[arg(
        long = "quantizer",
        value_name = "KIND",
        value_parser = PossibleValuesParser::new(
            QuantizerKind::iter().map(<&'static str>::from)
        ).try_map(|string| QuantizerKind::from_str(&string)),
    )]
    pub(crate) quantizer: Option<QuantizerKind>,

    /// Reserve adaptive palette entries for common architectural colors.
    #[arg(long = "key-colors")]
    pub(crate) key_colors: bool,

    /// Use voxel colors exactly as given, without lighting or material adjustments.
    #[arg(long = "no-shading")]
    pub(crate) no_shading: bool,

    /// Refuse models with more than this many voxels.
    #[arg(long = "max-voxels", value_name = "COUNT")]
    pub(crate) max_voxels: Option<usize>,

    /// After writing, read the file back and verify its structure.
    #[arg(long = "check")]
    pub(crate) check: bool,

    #[command(flatten)]
    pub(crate) config: ConfigArgs,

    #[command(flatten)]
    pub(crate) logging: LoggingArgs,
}

impl VoxbakeArgs {
    /// Combines the configuration file (if any) with the options given on the command line.
    pub(crate) fn export_options(&self) -> Result<ExportOptions, anyhow::Error> {
        let mut options = self.config.base_options()?;
        self.apply_to(&mut options);
        Ok(options)
    }

    /// Overrides the fields of `options` which were specified on the command line.
    fn apply_to(&self, options: &mut ExportOptions) {
        if let Some(mode) = self.palette {
            options.palette_mode = mode;
        }
        if let Some(quantizer) = self.quantizer {
            options.quantizer = quantizer;
        }
        if self.key_colors {
            options.key_colors = true;
        }
        if self.no_shading {
            options.shading = false;
        }
        if let Some(max_voxels) = self.max_voxels {
            options.max_voxels = max_voxels;
        }
    }
}

fn check_output_extension(path: &std::path::Path) -> Result<(), &'static str> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(extension) if extension.eq_ignore_ascii_case(FILE_EXTENSION) => Ok(()),
        _ => Err("output file name must have the extension '.vox'"),
    }
}
