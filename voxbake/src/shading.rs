//! Per-voxel normal estimation, material classification, and color enhancement.

use crate::adjacency::Occupancy;
use crate::math::{FreeVector, Rgba};
use crate::mesh::{Voxel, VoxelMesh};
use crate::util::maybe_parallel_map;

pub mod lighting;
pub mod material;
pub mod normal;

pub use material::MaterialTag;

/// A [`Voxel`] together with everything derived from it during shading.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct LitVoxel {
    /// The unmodified input voxel.
    pub voxel: Voxel,
    /// Estimated unit surface normal.
    pub normal: FreeVector,
    /// Light level in `lighting::MIN_LEVEL..=lighting::MAX_LEVEL`.
    pub light_level: f32,
    /// Heuristic material category.
    pub material: MaterialTag,
    /// The color after lighting; this is what palette synthesis sees.
    pub color: Rgba,
}

/// Derives the [`LitVoxel`] for one voxel of the mesh indexed by `occupancy`.
pub fn shade_voxel(occupancy: &Occupancy, voxel: &Voxel) -> LitVoxel {
    let normal = normal::estimate_normal(occupancy, voxel.position);
    let light_level = lighting::light_level(normal);
    let material = material::classify_voxel(occupancy.bounds(), voxel);
    LitVoxel {
        voxel: *voxel,
        normal,
        light_level,
        material,
        color: lighting::enhance(voxel.color, light_level, material),
    }
}

/// Shades every voxel of `mesh`, in order.
///
/// Each voxel depends only on `occupancy` and its own data, so this may use multiple
/// threads (see the `auto-threads` feature); the result is the same either way.
pub fn shade_mesh(mesh: &VoxelMesh, occupancy: &Occupancy) -> Vec<LitVoxel> {
    maybe_parallel_map(mesh.voxels(), |voxel| shade_voxel(occupancy, voxel))
}

/// Like [`shade_mesh()`], but leaves colors as they are.
///
/// Normals and materials are still computed so that the output is equally informative.
pub fn unshaded_mesh(mesh: &VoxelMesh, occupancy: &Occupancy) -> Vec<LitVoxel> {
    maybe_parallel_map(mesh.voxels(), |voxel| LitVoxel {
        color: voxel.color,
        ..shade_voxel(occupancy, voxel)
    })
}
