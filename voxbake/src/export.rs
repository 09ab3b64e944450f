//! The export entry point, its options, and its results.

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use yield_progress::YieldProgress;

use crate::adjacency::Occupancy;
use crate::chunk::{self, ChunkError, MAX_DIMENSION};
use crate::math::{GridSize, Rgba8};
use crate::matcher::ColorMatcher;
use crate::mesh::VoxelMesh;
use crate::palette::{self, Palette, PaletteMode, PaletteStats, QuantizerKind};
use crate::shading::{shade_mesh, unshaded_mesh};
use crate::util::maybe_parallel_map;

/// File name extension of exported files, without the leading dot.
pub const FILE_EXTENSION: &str = "vox";

/// Default value of [`ExportOptions::max_voxels`]: enough to fill the largest model
/// the format can hold.
pub const DEFAULT_MAX_VOXELS: usize = 256 * 256 * 256;

/// Settings for an export.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
#[non_exhaustive]
pub struct ExportOptions {
    /// How the palette is chosen.
    pub palette_mode: PaletteMode,
    /// How an adaptive palette is reduced when the model has too many colors.
    pub quantizer: QuantizerKind,
    /// Whether to add [`palette::KEY_COLORS`] to adaptive palettes.
    pub key_colors: bool,
    /// Whether to apply the lighting and material adjustments to colors.
    /// If false, voxel colors are used exactly as given.
    pub shading: bool,
    /// Models with more voxels than this are rejected before any processing.
    pub max_voxels: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            palette_mode: PaletteMode::default(),
            quantizer: QuantizerKind::default(),
            key_colors: false,
            shading: true,
            max_voxels: DEFAULT_MAX_VOXELS,
        }
    }
}

bitflags::bitflags! {
    /// Ways in which an export is not a perfect copy of its input.
    ///
    /// None of these stop an export; they are reported alongside the result.
    /// The [empty](Self::empty) set means no flaws are present.
    #[derive(Clone, Copy, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
    pub struct ExportFlaws: u8 {
        /// Some voxels were outside the exportable volume and were left out.
        const DROPPED_OUT_OF_RANGE = 1 << 0;

        /// Some voxels were too transparent to be represented and were left out.
        const DROPPED_TRANSPARENT = 1 << 1;

        /// The model had more colors than the palette could hold, so some colors were merged.
        const PALETTE_QUANTIZED = 1 << 2;

        /// Some voxels were given the nearest palette color rather than their own color.
        const APPROXIMATED_COLORS = 1 << 3;
    }
}

impl Default for ExportFlaws {
    /// Equivalent to [`Self::empty()`].
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for ExportFlaws {
    /// Displays the flags as text like “`PALETTE_QUANTIZED | APPROXIMATED_COLORS`".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Fatal errors that may be encountered during an export.
///
/// Conditions which do not stop the export are reported as [`ExportFlaws`] instead.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExportError {
    /// There was no model to export.
    #[error("no model to export")]
    MissingMesh,

    /// The model's bounds exceed what the format can represent.
    #[non_exhaustive]
    #[error(
        "model is too large to export: {}×{}×{} exceeds 256 along some axis",
        .size.width, .size.height, .size.depth
    )]
    SizeLimitExceeded {
        /// Size of the model's bounds.
        size: GridSize,
    },

    /// The model has more voxels than [`ExportOptions::max_voxels`].
    #[non_exhaustive]
    #[error("model has {count} voxels, more than the limit of {limit}")]
    VoxelCountExceeded {
        /// Number of voxels in the model.
        count: usize,
        /// The limit that was exceeded.
        limit: usize,
    },

    /// Another export using the same [`Exporter`] has not finished.
    #[error("an export is already in progress")]
    ExportAlreadyInProgress,

    /// Something went wrong which should not have.
    #[error("internal error while exporting")]
    Internal(#[source] InternalError),
}

/// Details of an [`ExportError::Internal`]. These are not meant to be acted on, only reported.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct InternalError(ChunkError);

impl From<ChunkError> for ExportError {
    fn from(error: ChunkError) -> Self {
        ExportError::Internal(InternalError(error))
    }
}

/// Successful result of an export.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct DotVoxExport {
    /// Contents of the `.vox` file.
    pub bytes: Vec<u8>,
    /// The palette the voxels refer to.
    pub palette: Palette,
    /// Statistics from building the palette.
    pub palette_stats: PaletteStats,
    /// Number of voxels in the file.
    pub voxels_written: usize,
    /// Ways in which the file differs from the input.
    pub flaws: ExportFlaws,
}

/// Runs exports one at a time.
///
/// An export started while another is running on the same [`Exporter`] fails with
/// [`ExportError::ExportAlreadyInProgress`], leaving the running one undisturbed.
#[derive(Debug, Default)]
pub struct Exporter {
    in_progress: AtomicBool,
}

impl Exporter {
    /// Constructs an idle [`Exporter`].
    pub const fn new() -> Self {
        Self {
            in_progress: AtomicBool::new(false),
        }
    }

    /// Whether an export is currently running.
    pub fn is_exporting(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Performs [`export_dot_vox()`] unless another export is in progress.
    pub fn export(
        &self,
        mesh: Option<&VoxelMesh>,
        options: &ExportOptions,
        progress: YieldProgress,
    ) -> Result<DotVoxExport, ExportError> {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ExportError::ExportAlreadyInProgress);
        }
        let _guard = scopeguard::guard((), |()| self.in_progress.store(false, Ordering::Release));
        export_dot_vox(mesh, options, progress)
    }
}

/// Converts `mesh` to the contents of a `.vox` file.
///
/// The model is checked against the size and voxel count limits before anything else is
/// done. The result is deterministic: the same mesh and options always produce the same bytes.
pub fn export_dot_vox(
    mesh: Option<&VoxelMesh>,
    options: &ExportOptions,
    mut progress: YieldProgress,
) -> Result<DotVoxExport, ExportError> {
    let mesh = mesh.ok_or(ExportError::MissingMesh)?;
    if mesh.len() > options.max_voxels {
        return Err(ExportError::VoxelCountExceeded {
            count: mesh.len(),
            limit: options.max_voxels,
        });
    }
    let bounds = mesh.bounds();
    let size = bounds.size();
    if size.width > MAX_DIMENSION || size.height > MAX_DIMENSION || size.depth > MAX_DIMENSION {
        return Err(ExportError::SizeLimitExceeded { size });
    }

    progress.set_label("Shading voxels");
    progress.progress_without_yield(0.0);
    let occupancy = Occupancy::new(mesh);
    let lit = if options.shading {
        shade_mesh(mesh, &occupancy)
    } else {
        unshaded_mesh(mesh, &occupancy)
    };
    let colors: Vec<Rgba8> = lit.iter().map(|v| v.color.to_rgba8()).collect();

    progress.set_label("Building palette");
    progress.progress_without_yield(0.4);
    let (palette, palette_stats) = palette::synthesize(
        options.palette_mode,
        options.quantizer,
        options.key_colors,
        colors.iter().copied(),
    );
    log::debug!(
        "{mode} palette: {unique} unique colors, {used} entries used",
        mode = options.palette_mode,
        unique = palette_stats.unique_colors,
        used = palette_stats.used_entries,
    );

    progress.set_label("Matching colors");
    progress.progress_without_yield(0.6);
    let matcher = ColorMatcher::new(&palette, options.palette_mode);
    let indices: Vec<u8> = maybe_parallel_map(&colors, |&color| matcher.find_index(color));

    progress.set_label("Writing file");
    progress.progress_without_yield(0.9);
    let written = chunk::write_vox(
        bounds,
        mesh.voxels()
            .iter()
            .map(|v| v.position)
            .zip(indices.iter().copied()),
        palette.entries(),
    )?;

    let mut flaws = ExportFlaws::empty();
    if written.dropped_out_of_range > 0 {
        flaws |= ExportFlaws::DROPPED_OUT_OF_RANGE;
        log::warn!(
            "{n} voxels were outside the exportable volume and were left out",
            n = written.dropped_out_of_range
        );
    }
    if written.dropped_transparent > 0 {
        flaws |= ExportFlaws::DROPPED_TRANSPARENT;
        log::warn!(
            "{n} voxels were too transparent to export and were left out",
            n = written.dropped_transparent
        );
    }
    if palette_stats.quantized {
        flaws |= ExportFlaws::PALETTE_QUANTIZED;
        log::warn!(
            "model has {unique} colors; reduced to a {used}-color palette",
            unique = palette_stats.unique_colors,
            used = palette_stats.used_entries,
        );
    }
    if palette_stats.overflowed > 0 {
        log::warn!(
            "{n} palette colors did not fit and were discarded",
            n = palette_stats.overflowed
        );
    }
    let approximated = colors
        .iter()
        .zip(&indices)
        .filter(|&(&color, &index)| index != 0 && palette.get(index) != color)
        .count();
    if approximated > 0 {
        flaws |= ExportFlaws::APPROXIMATED_COLORS;
        log::debug!("{approximated} voxels were given an approximate color");
    }

    log::info!(
        "exported {written} of {total} voxels ({x}×{y}×{z}) with {used} palette entries",
        written = written.voxels_written,
        total = mesh.len(),
        x = size.width,
        y = size.height,
        z = size.depth,
        used = palette.len(),
    );
    progress.set_label("Done");
    progress.progress_without_yield(1.0);

    Ok(DotVoxExport {
        bytes: written.bytes,
        palette,
        palette_stats,
        voxels_written: written.voxels_written,
        flaws,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{GridBox, Rgba};
    use crate::mesh::Voxel;
    use pretty_assertions::assert_eq;

    fn one_voxel() -> VoxelMesh {
        VoxelMesh::new(vec![Voxel::new([0, 0, 0], Rgba::new(1.0, 0.0, 0.0, 1.0))])
    }

    #[test]
    fn missing_mesh() {
        let result = export_dot_vox(None, &ExportOptions::default(), YieldProgress::noop());
        assert!(matches!(result, Err(ExportError::MissingMesh)));
    }

    #[test]
    fn size_limit() {
        let mesh = VoxelMesh::new(vec![
            Voxel::new([0, 0, 0], Rgba::WHITE),
            Voxel::new([0, 256, 0], Rgba::WHITE),
        ]);
        let error =
            export_dot_vox(Some(&mesh), &ExportOptions::default(), YieldProgress::noop())
                .unwrap_err();
        assert!(
            matches!(error, ExportError::SizeLimitExceeded { size } if size.height == 257),
            "{error:?}"
        );
        assert_eq!(
            error.to_string(),
            "model is too large to export: 1×257×1 exceeds 256 along some axis"
        );
    }

    #[test]
    fn size_limit_from_supplied_bounds() {
        let bounds = GridBox::from_min_max([0, 0, 0], [0, 0, 999]).unwrap();
        let mesh = VoxelMesh::with_bounds(vec![Voxel::new([0, 0, 0], Rgba::WHITE)], bounds);
        assert!(matches!(
            export_dot_vox(Some(&mesh), &ExportOptions::default(), YieldProgress::noop()),
            Err(ExportError::SizeLimitExceeded { .. })
        ));
    }

    #[test]
    fn voxel_count_limit() {
        let options = ExportOptions {
            max_voxels: 0,
            ..ExportOptions::default()
        };
        let error = export_dot_vox(Some(&one_voxel()), &options, YieldProgress::noop()).unwrap_err();
        assert!(matches!(
            error,
            ExportError::VoxelCountExceeded { count: 1, limit: 0 }
        ));
    }

    #[test]
    fn guard_rejects_reentry_and_is_released() {
        let exporter = Exporter::new();
        exporter.in_progress.store(true, Ordering::Release);
        assert!(matches!(
            exporter.export(Some(&one_voxel()), &ExportOptions::default(), YieldProgress::noop()),
            Err(ExportError::ExportAlreadyInProgress)
        ));
        // The rejected call must not release the running export's claim.
        assert!(exporter.is_exporting());

        exporter.in_progress.store(false, Ordering::Release);
        exporter
            .export(Some(&one_voxel()), &ExportOptions::default(), YieldProgress::noop())
            .unwrap();
        assert!(!exporter.is_exporting());

        // Released on failure too.
        assert!(exporter.export(None, &ExportOptions::default(), YieldProgress::noop()).is_err());
        assert!(!exporter.is_exporting());
    }

    #[test]
    fn flaws_display() {
        assert_eq!(ExportFlaws::default().to_string(), "");
        assert_eq!(
            (ExportFlaws::PALETTE_QUANTIZED | ExportFlaws::APPROXIMATED_COLORS).to_string(),
            "PALETTE_QUANTIZED | APPROXIMATED_COLORS"
        );
    }

    #[test]
    fn internal_error_is_generic() {
        let error = ExportError::from(ChunkError::LengthOverflow(usize::MAX));
        assert_eq!(error.to_string(), "internal error while exporting");
        let source = std::error::Error::source(&error).unwrap();
        assert!(source.to_string().contains("32 bits"), "{source}");
    }

    #[test]
    fn exact_colors_not_flawed() {
        let options = ExportOptions {
            shading: false,
            ..ExportOptions::default()
        };
        let export = export_dot_vox(Some(&one_voxel()), &options, YieldProgress::noop()).unwrap();
        assert_eq!(export.flaws, ExportFlaws::empty());
        assert_eq!(export.voxels_written, 1);
    }
}
