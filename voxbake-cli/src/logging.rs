//! Logging. And terminal progress bars. And their cooperation.

use std::sync::LazyLock;

use anyhow::Context as _;

/// A [`clap::Args`] struct for options controlling log output to stderr.
#[derive(Clone, Debug, Default, clap::Args)]
#[expect(clippy::module_name_repetitions)]
pub struct LoggingArgs {
    /// Additional logging to stderr.
    #[arg(long = "verbose", short = 'v')]
    pub verbose: bool,

    /// Remove timestamps from logs so that they are deterministic.
    ///
    /// This option is intended for internal tests only.
    #[arg(long = "simplify-log-format", hide = true)]
    pub simplify_log_format: bool,
}

/// Install a [`log`] global logger based on user-provided `options`.
///
/// Fails if a logger was already installed in this process.
pub fn install(options: &LoggingArgs) -> Result<(), anyhow::Error> {
    use log::LevelFilter::{Error, Info, Off, Trace};

    let &LoggingArgs {
        verbose,
        simplify_log_format,
    } = options;

    let stderr_logger = *simplelog::WriteLogger::new(
        if verbose { Trace } else { Info },
        simplelog::ConfigBuilder::new()
            .set_target_level(Off)
            .set_location_level(Off)
            .set_time_level(if simplify_log_format { Off } else { Error })
            .build(),
        std::io::stderr(),
    );
    let max_level = simplelog::SharedLogger::level(&stderr_logger);

    log::set_boxed_logger(Box::new(VoxbakeLogger { stderr_logger }))
        .context("failed to initialize logging")?;
    log::set_max_level(max_level);
    Ok(())
}

/// [`log::Log`] implementation that [`install()`] registers globally.
struct VoxbakeLogger {
    stderr_logger: simplelog::WriteLogger<std::io::Stderr>,
}

impl log::Log for VoxbakeLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        self.stderr_logger.enabled(metadata)
    }

    fn log(&self, record: &log::Record<'_>) {
        suspend_indicatif_in(|| self.stderr_logger.log(record));
    }

    fn flush(&self) {
        suspend_indicatif_in(|| self.stderr_logger.flush());
    }
}

fn suspend_indicatif_in<R>(f: impl FnOnce() -> R) -> R {
    COOPERATIVE_PROGRESS.suspend(f)
}

static COOPERATIVE_PROGRESS: LazyLock<indicatif::MultiProgress> =
    LazyLock::new(indicatif::MultiProgress::new);

/// Constructs a progress bar which cooperates with logging to share stderr cleanly.
///
/// As opposed to the defaults, it:
///
/// * will have been added to a shared [`indicatif::MultiProgress`], and
/// * has the style [`common_progress_style()`].
pub fn new_progress_bar(len: u64) -> indicatif::ProgressBar {
    let pb = indicatif::ProgressBar::new(len).with_style(common_progress_style());
    COOPERATIVE_PROGRESS.add(pb)
}

/// [`indicatif::ProgressStyle`] for progress bars we display.
pub fn common_progress_style() -> indicatif::ProgressStyle {
    #![allow(clippy::literal_string_with_formatting_args)]
    indicatif::ProgressStyle::default_bar()
        .template("{prefix:8} [{elapsed}] {wide_bar} {pos:>6}% {msg:20}")
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_style_template_is_valid() {
        #![allow(clippy::literal_string_with_formatting_args)]
        indicatif::ProgressStyle::default_bar()
            .template("{prefix:8} [{elapsed}] {wide_bar} {pos:>6}% {msg:20}")
            .unwrap();
        let _ = common_progress_style();
    }
}
