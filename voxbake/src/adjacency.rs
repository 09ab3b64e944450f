//! Constant-time voxel occupancy queries.

use hashbrown::HashSet;

use crate::math::{Face6, GridBox, GridPoint};
use crate::mesh::VoxelMesh;

/// Set of occupied lattice positions of a [`VoxelMesh`], plus its bounds.
///
/// Built once per export and never modified afterward, so it may be shared freely
/// between threads doing per-voxel work.
#[derive(Clone, Debug)]
pub struct Occupancy {
    bounds: GridBox,
    occupied: HashSet<GridPoint>,
}

impl Occupancy {
    /// Indexes the positions of all voxels in `mesh`.
    pub fn new(mesh: &VoxelMesh) -> Self {
        Self {
            bounds: mesh.bounds(),
            occupied: mesh.voxels().iter().map(|v| v.position).collect(),
        }
    }

    /// Bounds of the indexed mesh.
    pub fn bounds(&self) -> GridBox {
        self.bounds
    }

    /// Whether there is a voxel at `position`.
    #[inline]
    pub fn contains(&self, position: GridPoint) -> bool {
        self.occupied.contains(&position)
    }

    /// Whether the cell adjacent to `position` across `face` holds a voxel.
    #[inline]
    pub fn neighbor(&self, position: GridPoint, face: Face6) -> bool {
        let step = face.normal_vector();
        match (
            position.x.checked_add(step.x),
            position.y.checked_add(step.y),
            position.z.checked_add(step.z),
        ) {
            (Some(x), Some(y), Some(z)) => self.contains(GridPoint::new(x, y, z)),
            // Off the edge of the coordinate space, so certainly empty.
            _ => false,
        }
    }

    /// Number of distinct occupied positions.
    pub fn len(&self) -> usize {
        self.occupied.len()
    }

    /// Whether no positions are occupied.
    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }
}
