//! Input data: [`Voxel`] and [`VoxelMesh`].

use crate::math::{GridBox, GridPoint, Rgba};

/// A colored unit cube at an integer lattice position.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[expect(clippy::exhaustive_structs)]
pub struct Voxel {
    /// Position of the voxel's lower corner.
    #[cfg_attr(feature = "serde", serde(with = "point_as_array"))]
    pub position: GridPoint,
    /// Color, with components nominally in `0.0..=1.0`.
    pub color: Rgba,
}

impl Voxel {
    /// Constructs a [`Voxel`].
    pub fn new(position: impl Into<GridPoint>, color: Rgba) -> Self {
        Self {
            position: position.into(),
            color,
        }
    }
}

/// Read-only collection of [`Voxel`]s together with their bounding corners.
///
/// The bounds are normally computed from the voxels, but may also be supplied by whatever
/// produced the voxels; in that case, voxels outside the bounds are permitted, and are
/// dropped at export time if they do not fit in the exported volume.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelMesh {
    voxels: Vec<Voxel>,
    bounds: GridBox,
}

impl VoxelMesh {
    /// Constructs a mesh whose bounds enclose exactly the given voxels.
    ///
    /// A mesh with no voxels is given the bounds [`GridBox::ORIGIN_CELL`].
    pub fn new(voxels: Vec<Voxel>) -> Self {
        let bounds = GridBox::enclosing(voxels.iter().map(|v| v.position))
            .unwrap_or(GridBox::ORIGIN_CELL);
        Self { voxels, bounds }
    }

    /// Constructs a mesh with precomputed bounds.
    pub fn with_bounds(voxels: Vec<Voxel>, bounds: GridBox) -> Self {
        Self { voxels, bounds }
    }

    /// The voxels, in their original order.
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    /// The bounding corners of the model.
    pub fn bounds(&self) -> GridBox {
        self.bounds
    }

    /// Number of voxels.
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Whether there are no voxels.
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }
}

impl FromIterator<Voxel> for VoxelMesh {
    fn from_iter<T: IntoIterator<Item = Voxel>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(feature = "serde")]
mod point_as_array {
    use serde::{Deserialize as _, Deserializer, Serialize as _, Serializer};

    use crate::math::GridPoint;

    pub(super) fn serialize<S: Serializer>(point: &GridPoint, s: S) -> Result<S::Ok, S::Error> {
        point.to_array().serialize(s)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<GridPoint, D::Error> {
        <[i32; 3]>::deserialize(d).map(GridPoint::from)
    }
}
