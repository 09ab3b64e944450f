//! Export of colored voxel models to MagicaVoxel `.vox` files.
//!
//! The `.vox` format stores at most 256 voxels along each axis and at most 255 distinct
//! colors, so exporting a model involves more than serialization:
//!
//! 1. Each voxel's color is adjusted by a simple lighting model, using a surface normal
//!    estimated from which of its neighbors are empty and a material guessed from its
//!    height and color ([`shading`]).
//! 2. A palette is chosen ([`palette`]): either a fixed [preset](PaletteMode::Preset), or
//!    an [adaptive](PaletteMode::Adaptive) one built from the model's colors, reduced by a
//!    [`palette::PaletteStrategy`] if there are too many.
//! 3. Each voxel is assigned the index of the best palette entry ([`matcher`]).
//! 4. The model and palette are written in the chunked container format ([`chunk`]).
//!
//! The entry points are [`export_dot_vox()`] and [`Exporter`].
//!
//! ```
//! use voxbake::math::Rgba;
//! use voxbake::{ExportOptions, Voxel, VoxelMesh, YieldProgress, export_dot_vox};
//!
//! let mesh = VoxelMesh::new(vec![
//!     Voxel::new([0, 0, 0], Rgba::new(1.0, 0.0, 0.0, 1.0)),
//!     Voxel::new([0, 1, 0], Rgba::new(0.2, 0.4, 0.9, 1.0)),
//! ]);
//! let export = export_dot_vox(Some(&mesh), &ExportOptions::default(), YieldProgress::noop())?;
//! assert_eq!(&export.bytes[..4], b"VOX ");
//! assert_eq!(export.voxels_written, 2);
//! # Ok::<(), voxbake::ExportError>(())
//! ```
//!
//! ## Package features
//!
//! This package defines the following feature flags:
//!
//! * `"auto-threads"`:
//!   Enables implicit use of threads for per-voxel work,
//!   including via [`rayon`]’s global thread pool.
//!   The output is identical with or without it.
//! * `"serde"`:
//!   Enables serialization of [`ExportOptions`] and the input types with [`serde`].

// Crate-specific lint settings. (General settings can be found in the workspace manifest.)
#![forbid(unsafe_code)]

pub mod adjacency;
pub mod chunk;
pub mod matcher;
pub mod math;
pub mod mesh;
pub mod palette;
pub mod shading;

mod export;
pub use export::*;

mod util;


pub use mesh::{Voxel, VoxelMesh};
pub use palette::{Palette, PaletteMode, QuantizerKind};
pub use yield_progress::YieldProgress;
