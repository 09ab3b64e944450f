//! Estimation of per-voxel surface normals from neighbor occupancy.

use euclid::vec3;

use crate::adjacency::Occupancy;
use crate::math::{Face6, FreeVector, GridPoint};

/// Direction *toward* the light source, before normalization.
const LIGHT_DIRECTION_RAW: FreeVector = FreeVector::new(0.3, 0.8, 0.5);

/// Fraction of the final normal taken from [`light_direction()`] rather than geometry.
pub const LIGHT_BIAS: f32 = 0.4;

/// Unit vector pointing toward the (single, fixed, directional) light.
pub fn light_direction() -> FreeVector {
    LIGHT_DIRECTION_RAW.normalize()
}

/// Sum of the outward directions of every face of the voxel at `position` whose neighbor
/// is empty, normalized.
///
/// If the empty faces are symmetric (including the cases of all or none being empty),
/// the sum is zero and the result is straight up.
pub fn geometric_normal(occupancy: &Occupancy, position: GridPoint) -> FreeVector {
    let sum = Face6::ALL
        .into_iter()
        .filter(|&face| !occupancy.neighbor(position, face))
        .fold(FreeVector::zero(), |sum, face| sum + face.free_normal_vector());
    if sum.square_length() < 1e-12 {
        vec3(0.0, 1.0, 0.0)
    } else {
        sum.normalize()
    }
}

/// The normal used for lighting: the [`geometric_normal()`] tilted toward the light by
/// [`LIGHT_BIAS`].
///
/// This is deliberately not a physically correct normal. Tilting every surface toward the
/// light keeps faces that point away from it from going dark, which brightens the model
/// as a whole.
pub fn estimate_normal(occupancy: &Occupancy, position: GridPoint) -> FreeVector {
    let geometric = geometric_normal(occupancy, position);
    // Cannot be zero: both inputs are unit vectors and the weights differ.
    (geometric * (1.0 - LIGHT_BIAS) + light_direction() * LIGHT_BIAS).normalize()
}
