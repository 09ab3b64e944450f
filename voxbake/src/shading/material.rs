//! Heuristic material classification of voxels.

use crate::math::{GridBox, Rgba};
use crate::mesh::Voxel;

/// Coarse category of surface material, guessed from a voxel's position and color.
///
/// The categories are tuned for architectural models.
#[expect(clippy::exhaustive_enums)]
#[derive(
    Clone, Copy, Debug, Eq, Hash, PartialEq, strum::EnumIter, strum::IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum MaterialTag {
    #[allow(missing_docs)]
    Stone,
    #[allow(missing_docs)]
    Wood,
    #[allow(missing_docs)]
    Metal,
    #[allow(missing_docs)]
    Window,
    #[allow(missing_docs)]
    Roof,
    #[allow(missing_docs)]
    Ground,
    /// None of the other categories matched.
    Unknown,
}

/// Derived per-voxel quantities which [`classify()`] examines.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct MaterialFeatures {
    /// Height of the voxel within the model, from 0 at the bottom layer toward 1 at the top.
    pub height_percentile: f32,
    /// Horizontal (XZ-plane) distance from the voxel's center to the model's vertical
    /// center line.
    pub axis_distance: f32,
    /// Rec. 601 luma of the raw color.
    pub luma: f32,
    /// Red, green, and blue are all within 0.1 of each other.
    pub grayscale: bool,
    /// Red exceeds both green and blue by more than 20%.
    pub red_dominant: bool,
    /// Blue exceeds both red and green by more than 20%.
    pub blue_dominant: bool,
}

impl MaterialFeatures {
    /// Computes the features of `voxel` as part of a model with the given bounds.
    pub fn new(bounds: GridBox, voxel: &Voxel) -> Self {
        let Rgba { r, g, b, a: _ } = voxel.color;
        let min = bounds.min();
        let max = bounds.max();
        let model_height = bounds.size().height as f32;

        let center_x = (min.x as f32 + max.x as f32 + 1.0) / 2.0;
        let center_z = (min.z as f32 + max.z as f32 + 1.0) / 2.0;
        let dx = voxel.position.x as f32 + 0.5 - center_x;
        let dz = voxel.position.z as f32 + 0.5 - center_z;

        Self {
            height_percentile: (voxel.position.y as f32 - min.y as f32) / model_height,
            axis_distance: dx.hypot(dz),
            luma: voxel.color.luma(),
            grayscale: (r - g).abs() < 0.1 && (r - b).abs() < 0.1,
            red_dominant: r > 1.2 * g && r > 1.2 * b,
            blue_dominant: b > 1.2 * r && b > 1.2 * g,
        }
    }
}

/// Chooses a [`MaterialTag`] from the given features.
///
/// The rules overlap, so their order matters; the first matching rule wins.
pub fn classify(f: &MaterialFeatures) -> MaterialTag {
    let hp = f.height_percentile;
    if hp < 0.2 && (f.blue_dominant || f.luma > 0.7) {
        MaterialTag::Ground
    } else if hp > 0.3 && hp < 0.8 && f.luma > 0.6 {
        MaterialTag::Window
    } else if hp > 0.75 && f.red_dominant {
        MaterialTag::Roof
    } else if f.luma > 0.7 && f.grayscale {
        MaterialTag::Metal
    } else if f.luma > 0.3 && f.luma < 0.7 && f.red_dominant {
        MaterialTag::Wood
    } else if f.grayscale || (f.luma < 0.5 && !f.red_dominant && !f.blue_dominant) {
        MaterialTag::Stone
    } else {
        MaterialTag::Unknown
    }
}

/// Classifies `voxel` as part of a model with the given bounds.
pub fn classify_voxel(bounds: GridBox, voxel: &Voxel) -> MaterialTag {
    classify(&MaterialFeatures::new(bounds, voxel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// A 10-tall model, so that `y / 10` is the height percentile.
    fn tower() -> GridBox {
        GridBox::from_min_max([0, 0, 0], [4, 9, 4]).unwrap()
    }

    #[rstest]
    #[case::blue_ground([2, 0, 2], [0.1, 0.2, 0.6], MaterialTag::Ground)]
    #[case::bright_ground([2, 1, 2], [0.9, 0.9, 0.8], MaterialTag::Ground)]
    #[case::window([2, 5, 2], [0.7, 0.8, 0.9], MaterialTag::Window)]
    #[case::roof([2, 9, 2], [0.6, 0.1, 0.1], MaterialTag::Roof)]
    #[case::metal([2, 9, 2], [0.85, 0.85, 0.85], MaterialTag::Metal)]
    #[case::wood([2, 5, 2], [0.7, 0.4, 0.2], MaterialTag::Wood)]
    #[case::stone_gray([2, 5, 2], [0.4, 0.4, 0.4], MaterialTag::Stone)]
    #[case::stone_dark([2, 5, 2], [0.2, 0.3, 0.1], MaterialTag::Stone)]
    #[case::unknown([2, 5, 2], [0.1, 0.9, 0.1], MaterialTag::Unknown)]
    fn rules(#[case] position: [i32; 3], #[case] rgb: [f32; 3], #[case] expected: MaterialTag) {
        let [r, g, b] = rgb;
        let voxel = Voxel::new(position, Rgba::new(r, g, b, 1.0));
        assert_eq!(classify_voxel(tower(), &voxel), expected);
    }

    /// A bright red voxel near the top is both `Window`-bright and `Roof`-red;
    /// the earlier rule must win where the height ranges overlap.
    #[test]
    fn first_match_wins() {
        let tall = GridBox::from_min_max([0, 0, 0], [4, 99, 4]).unwrap();
        let voxel = Voxel::new([2, 78, 2], Rgba::new(1.0, 0.5, 0.5, 1.0));
        let features = MaterialFeatures::new(tall, &voxel);
        assert!(features.height_percentile > 0.75 && features.height_percentile < 0.8);
        assert!(features.red_dominant && features.luma > 0.6);
        assert_eq!(classify(&features), MaterialTag::Window);
    }

    #[test]
    fn axis_distance() {
        let features = MaterialFeatures::new(tower(), &Voxel::new([2, 0, 2], Rgba::WHITE));
        assert_eq!(features.axis_distance, 0.0);
        let features = MaterialFeatures::new(tower(), &Voxel::new([0, 0, 2], Rgba::WHITE));
        assert_eq!(features.axis_distance, 2.0);
    }

    #[test]
    fn single_layer_model() {
        // Height percentile must be defined even when the model is flat.
        let bounds = GridBox::single_cell([0, 0, 0]);
        let features = MaterialFeatures::new(bounds, &Voxel::new([0, 0, 0], Rgba::WHITE));
        assert_eq!(features.height_percentile, 0.0);
    }
}
