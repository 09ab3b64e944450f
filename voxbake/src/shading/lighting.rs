//! Per-material brightness and saturation adjustment.
//!
//! This is a global brightening pass, not a physically based lighting model.

use crate::math::{FreeVector, Hsl, Rgba};
use crate::shading::material::MaterialTag;
use crate::shading::normal::light_direction;

/// Light level of a surface facing directly away from (or perpendicular to) the light.
/// Nonzero so that lighting alone never makes a voxel black.
pub const MIN_LEVEL: f32 = 0.35;
/// Light level of a surface facing directly toward the light.
pub const MAX_LEVEL: f32 = 1.0;
/// Fraction of the final light which does not depend on the normal.
pub const AMBIENT: f32 = 0.3;

/// How a [`MaterialTag`] responds to light.
#[derive(Clone, Copy, Debug, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct MaterialResponse {
    /// Multiplier on the directional part of the light.
    pub light_boost: f32,
    /// Multiplier on HSL saturation.
    pub saturation_multiplier: f32,
    /// Added to HSL lightness after lighting.
    pub brightness_shift: f32,
}

impl MaterialResponse {
    const fn new(light_boost: f32, saturation_multiplier: f32, brightness_shift: f32) -> Self {
        Self {
            light_boost,
            saturation_multiplier,
            brightness_shift,
        }
    }
}

impl MaterialTag {
    /// Looks up the lighting response of this material.
    pub const fn response(self) -> MaterialResponse {
        match self {
            MaterialTag::Stone => MaterialResponse::new(1.00, 1.05, 0.02),
            MaterialTag::Wood => MaterialResponse::new(1.05, 1.15, 0.03),
            MaterialTag::Metal => MaterialResponse::new(1.15, 0.90, 0.05),
            MaterialTag::Window => MaterialResponse::new(1.20, 1.10, 0.08),
            MaterialTag::Roof => MaterialResponse::new(1.10, 1.20, 0.02),
            MaterialTag::Ground => MaterialResponse::new(0.95, 1.10, 0.00),
            MaterialTag::Unknown => MaterialResponse::new(1.00, 1.10, 0.03),
        }
    }
}

/// Light level, in `MIN_LEVEL..=MAX_LEVEL`, of a surface with the given unit normal.
///
/// Uses the absolute value of the cosine, so back faces are lit like front faces.
pub fn light_level(normal: FreeVector) -> f32 {
    let cosine = normal.dot(light_direction()).abs().min(1.0);
    MIN_LEVEL + (MAX_LEVEL - MIN_LEVEL) * cosine
}

/// Applies `level` and the response of `material` to `color`, via HSL. Alpha is unchanged.
pub fn enhance(color: Rgba, level: f32, material: MaterialTag) -> Rgba {
    let MaterialResponse {
        light_boost,
        saturation_multiplier,
        brightness_shift,
    } = material.response();
    let Hsl { h, s, l } = color.to_hsl();
    let final_light = AMBIENT + level * (1.0 - AMBIENT) * light_boost;
    Rgba::from_hsl(
        Hsl {
            h,
            s: (s * saturation_multiplier).min(1.0),
            l: (l * final_light + brightness_shift).min(1.0),
        },
        color.a,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use euclid::vec3;
    use strum::IntoEnumIterator as _;

    #[test]
    fn level_range() {
        assert!((light_level(light_direction()) - MAX_LEVEL).abs() < 1e-5);
        assert!((light_level(-light_direction()) - MAX_LEVEL).abs() < 1e-5);

        // Perpendicular to the light direction (0.3, 0.8, 0.5).
        let perpendicular = vec3(0.8, -0.3, 0.0).normalize();
        assert!((light_level(perpendicular) - MIN_LEVEL).abs() < 1e-5);
    }

    #[test]
    fn alpha_untouched() {
        let color = Rgba::new(0.2, 0.5, 0.7, 0.6);
        for material in MaterialTag::iter() {
            assert_eq!(enhance(color, 0.5, material).a, 0.6);
        }
    }

    #[test]
    fn never_black_from_lighting() {
        // Even the dimmest light leaves a mid-gray visibly non-black.
        let lit = enhance(Rgba::new(0.5, 0.5, 0.5, 1.0), MIN_LEVEL, MaterialTag::Ground);
        assert!(lit.to_rgba8().r > 40, "{lit:?}");
    }

    #[test]
    fn full_light_brightens() {
        let color = Rgba::new(0.5, 0.3, 0.2, 1.0);
        let lit = enhance(color, MAX_LEVEL, MaterialTag::Wood);
        assert!(lit.to_hsl().l > color.to_hsl().l);
        assert!(lit.to_hsl().s >= color.to_hsl().s);
    }

    #[test]
    fn lightness_capped() {
        let lit = enhance(Rgba::WHITE, MAX_LEVEL, MaterialTag::Window);
        assert_eq!(lit.to_rgba8(), Rgba::WHITE.to_rgba8());
    }

    #[test]
    fn pure_red_stays_red() {
        let lit = enhance(Rgba::new(1.0, 0.0, 0.0, 1.0), 0.95, MaterialTag::Unknown);
        let lit8 = lit.to_rgba8();
        assert_eq!(lit8.r, 255);
        assert!(lit8.g < 20 && lit8.b < 20, "{lit8}");
    }
}
