//! Colors placed in adaptive palettes ahead of the model's own colors.

use crate::math::Rgba8;

const fn opaque(r: u8, g: u8, b: u8) -> Rgba8 {
    Rgba8::new(r, g, b, 255)
}

/// Primaries and grays which every adaptive palette contains, so that common colors
/// always have an exact match.
pub const BASE_COLORS: [Rgba8; 8] = [
    opaque(0, 0, 0),
    opaque(255, 255, 255),
    opaque(255, 0, 0),
    opaque(0, 255, 0),
    opaque(0, 0, 255),
    opaque(64, 64, 64),
    opaque(128, 128, 128),
    opaque(191, 191, 191),
];

/// Colors which are common in buildings, injected when
/// [`ExportOptions::key_colors`](crate::ExportOptions::key_colors) is enabled.
///
/// Overlaps with [`BASE_COLORS`] are harmless; palettes never contain duplicates.
pub const KEY_COLORS: [Rgba8; 12] = [
    opaque(255, 0, 0),
    opaque(0, 255, 0),
    opaque(0, 0, 255),
    opaque(255, 255, 255),
    opaque(0, 0, 0),
    opaque(128, 128, 128),
    // roof slate blue
    opaque(64, 96, 192),
    // brick
    opaque(139, 58, 42),
    // wood
    opaque(139, 90, 43),
    // stone
    opaque(154, 154, 144),
    // glass
    opaque(160, 200, 232),
    // grass
    opaque(76, 140, 44),
];
