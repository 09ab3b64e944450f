//! Axis-aligned unit vectors: the [`Face6`] type.
//! This module is private but reexported by its parent.

use euclid::vec3;

use crate::math::{FreeVector, GridVector};

/// Identifies a face of a cube or an orthogonal unit vector.
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, strum::EnumIter)]
#[repr(u8)]
pub enum Face6 {
    /// Negative X; the face whose normal vector is `(-1, 0, 0)`.
    NX = 1,
    /// Negative Y; the face whose normal vector is `(0, -1, 0)`; downward.
    NY = 2,
    /// Negative Z; the face whose normal vector is `(0, 0, -1)`.
    NZ = 3,
    /// Positive X; the face whose normal vector is `(1, 0, 0)`.
    PX = 4,
    /// Positive Y; the face whose normal vector is `(0, 1, 0)`; upward.
    PY = 5,
    /// Positive Z; the face whose normal vector is `(0, 0, 1)`.
    PZ = 6,
}

impl Face6 {
    /// All the values of [`Face6`].
    pub const ALL: [Face6; 6] = [
        Face6::NX,
        Face6::NY,
        Face6::NZ,
        Face6::PX,
        Face6::PY,
        Face6::PZ,
    ];

    /// Returns the opposite face (maps [`PX`](Self::PX) to [`NX`](Self::NX) and so on).
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Face6 {
        match self {
            Face6::NX => Face6::PX,
            Face6::NY => Face6::PY,
            Face6::NZ => Face6::PZ,
            Face6::PX => Face6::NX,
            Face6::PY => Face6::NY,
            Face6::PZ => Face6::NZ,
        }
    }

    /// Returns the vector normal to this face, pointing out of the cube.
    #[inline]
    pub const fn normal_vector(self) -> GridVector {
        match self {
            Face6::NX => vec3(-1, 0, 0),
            Face6::NY => vec3(0, -1, 0),
            Face6::NZ => vec3(0, 0, -1),
            Face6::PX => vec3(1, 0, 0),
            Face6::PY => vec3(0, 1, 0),
            Face6::PZ => vec3(0, 0, 1),
        }
    }

    /// [`Self::normal_vector()`] as a floating-point vector.
    #[inline]
    pub fn free_normal_vector(self) -> FreeVector {
        self.normal_vector().cast()
    }
}
