//! Reading models from JSON documents.
//!
//! The document format is
//!
//! ```json
//! {
//!     "voxels": [
//!         { "position": [0, 0, 0], "color": [1.0, 0.0, 0.0, 1.0] }
//!     ],
//!     "min": [0, 0, 0],
//!     "max": [15, 15, 15]
//! }
//! ```
//!
//! where `min` and `max` are optional inclusive bounds; a missing corner is computed
//! from the voxels.

use std::path::Path;

use anyhow::Context as _;

use voxbake::math::{GridBox, GridPoint};
use voxbake::{Voxel, VoxelMesh};

use crate::config_files::read_json_file;

/// The contents of an input file.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputDocument {
    /// The voxels of the model.
    pub voxels: Vec<Voxel>,
    /// Lower corner of the bounds, if specified.
    #[serde(default)]
    pub min: Option<[i32; 3]>,
    /// Upper corner of the bounds, if specified.
    #[serde(default)]
    pub max: Option<[i32; 3]>,
}

impl InputDocument {
    /// Converts the document to a [`VoxelMesh`], filling in missing bounds.
    pub fn into_mesh(self) -> Result<VoxelMesh, anyhow::Error> {
        let Self { voxels, min, max } = self;
        if min.is_none() && max.is_none() {
            return Ok(VoxelMesh::new(voxels));
        }

        let computed =
            GridBox::enclosing(voxels.iter().map(|v| v.position)).unwrap_or(GridBox::ORIGIN_CELL);
        let min = min.map_or(computed.min(), GridPoint::from);
        let max = max.map_or(computed.max(), GridPoint::from);
        let bounds = GridBox::from_min_max(min, max).with_context(|| {
            format!(
                "bounds minimum {:?} exceeds maximum {:?}",
                min.to_array(),
                max.to_array()
            )
        })?;
        Ok(VoxelMesh::with_bounds(voxels, bounds))
    }
}

/// Reads an [`InputDocument`] from `path` and converts it to a [`VoxelMesh`].
pub fn read_mesh(path: &Path) -> Result<VoxelMesh, anyhow::Error> {
    let document: InputDocument = read_json_file("model", path)?;
    document
        .into_mesh()
        .with_context(|| format!("invalid model in {path}", path = path.to_string_lossy()))
}
