//! Default export options stored in the user's configuration directory.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use directories_next::ProjectDirs;
use serde::de::DeserializeOwned;

use voxbake::ExportOptions;

/// Name of the file, in the platform configuration directory, holding default
/// [`ExportOptions`].
pub const CONFIG_FILE_NAME: &str = "voxbake.json";

// -------------------------------------------------------------------------------------------------

/// Returns the path of the user's configuration file, whether or not it exists.
pub fn config_file_path() -> Result<PathBuf, anyhow::Error> {
    let project_dirs = ProjectDirs::from("org", "", "voxbake")
        .ok_or_else(|| anyhow::anyhow!("could not find configuration directory"))?;
    Ok(project_dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Loads [`ExportOptions`] from the user's configuration file, if there is one.
///
/// The file is never created; its absence means default options.
/// This does not respect command-line options. Use [`ConfigArgs`] for that.
pub fn load_config() -> Result<ExportOptions, anyhow::Error> {
    if std::env::var("VOXBAKE_DO_NOT_USE_CONFIG_FILES_IN_TESTS").is_ok() {
        panic!(
            "tests should be hermetic and not touch user config files \
            (environment variable VOXBAKE_DO_NOT_USE_CONFIG_FILES_IN_TESTS set, \
            but --no-config-files not passed)"
        );
    }

    let path = config_file_path()?;
    if !path.exists() {
        log::trace!(
            "No configuration file at {path}; using defaults",
            path = path.to_string_lossy()
        );
        return Ok(ExportOptions::default());
    }
    read_json_file("export options", &path)
}

// -------------------------------------------------------------------------------------------------

/// [`clap::Args`] argument group struct for args that affect where base options come from.
///
/// Individual command-line flags are applied on top of the options these produce.
#[derive(Clone, Debug, Default, clap::Args)]
pub struct ConfigArgs {
    /// Read export options from this JSON file instead of the user configuration file.
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Ignore all configuration files, using only defaults and command-line options.
    #[arg(long = "no-config-files", conflicts_with = "config_file")]
    pub no_config_files: bool,
}

impl ConfigArgs {
    /// Loads the [`ExportOptions`] that command-line flags will be applied to.
    pub fn base_options(&self) -> Result<ExportOptions, anyhow::Error> {
        let Self {
            config_file,
            no_config_files,
        } = self;

        if let Some(path) = config_file {
            read_json_file("export options", path)
        } else if *no_config_files {
            Ok(ExportOptions::default())
        } else {
            load_config().context("Error loading configuration files")
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Reads and parses a JSON file, with errors naming `description` and `path`.
pub fn read_json_file<V: DeserializeOwned>(
    description: &str,
    path: &Path,
) -> Result<V, anyhow::Error> {
    let file = File::open(path).with_context(|| {
        format!(
            "failed to open {description} file {path}",
            path = path.to_string_lossy()
        )
    })?;
    let value = serde_json::from_reader(BufReader::new(file)).with_context(|| {
        format!(
            "syntax error in {description} file {path}",
            path = path.to_string_lossy()
        )
    })?;
    log::trace!(
        "Loaded {description} from {path}",
        path = path.to_string_lossy()
    );
    Ok(value)
}
