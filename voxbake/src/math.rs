//! Mathematical utilities and data types: lattice coordinates, boxes, faces, and colors.

mod color;
pub use color::*;
mod face;
pub use face::*;
mod grid_box;
pub use grid_box::*;

/// Unit-of-measure type for [`euclid`] quantities measured in voxel lattice cells.
#[expect(clippy::exhaustive_enums)]
#[derive(Debug, Eq, PartialEq)]
pub enum Cell {}

/// Coordinates that are locked to the voxel lattice.
pub type GridCoordinate = i32;

/// Position of a voxel in the lattice.
pub type GridPoint = euclid::Point3D<GridCoordinate, Cell>;

/// Integer displacement between lattice positions.
pub type GridVector = euclid::Vector3D<GridCoordinate, Cell>;

/// Extent of a [`GridBox`], in cells per axis.
pub type GridSize = euclid::Size3D<u32, Cell>;

/// Continuous direction or displacement, such as a surface normal.
pub type FreeVector = euclid::Vector3D<f32, Cell>;
