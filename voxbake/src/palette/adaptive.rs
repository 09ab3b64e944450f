use itertools::Itertools as _;

use crate::math::{Hsv, Rgba8};
use crate::palette::{
    BASE_COLORS, ColorCount, KEY_COLORS, Palette, PaletteStats, PaletteStrategy,
};

/// Maximum number of entries given to translucent colors when the palette is quantized.
pub(crate) const TRANSLUCENT_RESERVE: usize = 25;

/// Saturation and value steps of the generated colors which fill otherwise unused entries.
const FILL_LEVELS: [f32; 3] = [0.3, 0.65, 1.0];

/// Builds a palette from the model's own colors, reducing them with `strategy` if they do
/// not fit.
pub(crate) fn adaptive_palette(
    colors: &[ColorCount],
    strategy: &dyn PaletteStrategy,
    key_colors: bool,
) -> (Palette, PaletteStats) {
    let mut palette = Palette::new();
    let key_colors: &[Rgba8] = if key_colors { &KEY_COLORS } else { &[] };
    for &color in key_colors.iter().chain(&BASE_COLORS) {
        palette.insert(color);
    }
    let budget = Palette::CAPACITY - palette.len();

    // Colors which already have an exact entry cost nothing.
    let novel: Vec<ColorCount> = colors
        .iter()
        .filter(|c| palette.index_of(c.color).is_none())
        .copied()
        .collect();

    let quantized = novel.len() > budget;
    let chosen: Vec<Rgba8> = if quantized {
        reduce(&novel, strategy, budget)
    } else {
        novel.iter().map(|c| c.color).collect()
    };

    let mut overflowed = 0;
    for color in chosen {
        if palette.insert(color).is_none() {
            overflowed += 1;
        }
    }
    if quantized {
        generative_fill(&mut palette);
    }

    let stats = PaletteStats {
        unique_colors: colors.len(),
        used_entries: palette.len(),
        quantized,
        overflowed,
    };
    (palette, stats)
}

/// Chooses `budget` colors out of `colors`, keeping some translucent colors.
fn reduce(colors: &[ColorCount], strategy: &dyn PaletteStrategy, budget: usize) -> Vec<Rgba8> {
    let (translucent, opaque): (Vec<ColorCount>, Vec<ColorCount>) =
        colors.iter().partition(|c| c.color.is_translucent());

    // Most common first; stable, so ties stay in first-seen order.
    let translucent: Vec<Rgba8> = translucent
        .iter()
        .sorted_by_key(|c| core::cmp::Reverse(c.count))
        .take(TRANSLUCENT_RESERVE.min(budget))
        .map(|c| c.color)
        .collect();

    let mut chosen = strategy.reduce(&opaque, budget - translucent.len());
    chosen.extend(translucent);
    chosen
}

/// Adds opaque colors evenly spread over hue, saturation, and value until the palette is
/// full or the sweep is done.
fn generative_fill(palette: &mut Palette) {
    let sweep = (0..6)
        .map(|step| step as f32 * 60.0)
        .cartesian_product(FILL_LEVELS)
        .cartesian_product(FILL_LEVELS);
    for ((h, s), v) in sweep {
        if palette.is_full() {
            return;
        }
        palette.insert(Rgba8::from_hsv(Hsv { h, s, v }, 255));
    }
}
