//! Assignment of palette indices to voxel colors.

use crate::math::{Hsv, Rgba8};
use crate::palette::{Palette, PaletteMode};

/// Colors with alpha below this are treated as empty space and get index 0.
pub const OPACITY_THRESHOLD: u8 = 128;

/// Colors with alpha at or above this are considered opaque for matching purposes.
const OPAQUE_THRESHOLD: u8 = 250;

/// Index used when there is nothing to compare against.
const FALLBACK_INDEX: u8 = 1;

/// Finds the palette entry best representing a given color.
///
/// Precomputes what it needs from the palette, so one matcher should be used for all voxels
/// of an export. It is [`Sync`] and may be used from multiple threads.
#[derive(Clone, Debug)]
pub struct ColorMatcher<'p> {
    palette: &'p Palette,
    mode: PaletteMode,
    /// HSV of each used entry, starting from index 1.
    hsv: Vec<Hsv>,
}

/// A special-case search applied before the general one.
struct Pass {
    /// Whether the pass applies to a target color.
    target: fn(Hsv) -> bool,
    /// Whether a palette entry is a candidate.
    candidate: fn(Hsv) -> bool,
    /// Distance between target and candidate.
    distance: fn(Hsv, Hsv) -> f32,
    /// The best candidate is accepted only if its distance is below this.
    threshold: f32,
}

const PASSES: [Pass; 3] = [
    // Blue roofs.
    Pass {
        target: |t| in_hue_range(t, 200.0, 250.0) && t.s > 0.5 && t.v > 0.5,
        candidate: |c| in_hue_range(c, 200.0, 250.0) && c.s > 0.4,
        distance: weighted_distance,
        threshold: 0.4,
    },
    // Grays.
    Pass {
        target: |t| t.s < 0.15,
        candidate: |c| c.s < 0.15,
        distance: |t, c| (t.v - c.v).abs(),
        threshold: 0.15,
    },
    // Wood and brick.
    Pass {
        target: |t| {
            in_hue_range(t, 10.0, 50.0) && t.s > 0.2 && t.s < 0.8 && t.v > 0.2 && t.v < 0.8
        },
        candidate: |c| in_hue_range(c, 10.0, 50.0),
        distance: weighted_distance,
        threshold: 0.3,
    },
];

impl<'p> ColorMatcher<'p> {
    /// Prepares to match colors against `palette`, using the metric appropriate to `mode`.
    pub fn new(palette: &'p Palette, mode: PaletteMode) -> Self {
        Self {
            palette,
            mode,
            hsv: palette.used().iter().map(|c| c.to_hsv()).collect(),
        }
    }

    /// Returns the palette index for `color`.
    ///
    /// * Colors with alpha below [`OPACITY_THRESHOLD`] get index 0.
    /// * Colors present in the palette get their exact index.
    /// * Other colors get the nearest entry. For [`PaletteMode::Preset`], this is the
    ///   nearest in RGB; otherwise it is determined by a perceptually weighted HSV distance,
    ///   with special cases for blues, grays, and wood tones, and entries are only considered
    ///   if they are of the same translucency as `color` (unless there are none such).
    ///
    /// Entries with alpha below [`OPACITY_THRESHOLD`] are never chosen.
    /// Ties go to the lowest index. The result is never 0 for colors above the threshold.
    pub fn find_index(&self, color: Rgba8) -> u8 {
        if color.a < OPACITY_THRESHOLD {
            return 0;
        }
        if let Some(index) = self.palette.index_of(color) {
            return index;
        }
        if self.palette.is_empty() {
            return FALLBACK_INDEX;
        }
        match self.mode {
            PaletteMode::Preset => self.nearest_rgb(color),
            PaletteMode::Adaptive => self.nearest_perceptual(color),
        }
    }

    /// Entries in use, with their indices and HSV, except those too transparent to be
    /// the result for any color.
    fn candidates(&self) -> impl Iterator<Item = (u8, Rgba8, Hsv)> + '_ {
        (1..=255u8)
            .zip(self.palette.used())
            .zip(&self.hsv)
            .map(|((index, &color), &hsv)| (index, color, hsv))
            .filter(|&(_, color, _)| color.a >= OPACITY_THRESHOLD)
    }

    fn nearest_rgb(&self, color: Rgba8) -> u8 {
        // min_by_key returns the first of equal elements, which is the lowest index.
        self.candidates()
            .min_by_key(|&(_, entry, _)| color.rgb_distance_squared(entry))
            .map_or(FALLBACK_INDEX, |(index, _, _)| index)
    }

    fn nearest_perceptual(&self, color: Rgba8) -> u8 {
        let target = color.to_hsv();

        for pass in &PASSES {
            if !(pass.target)(target) {
                continue;
            }
            let best = nearest_by(
                self.candidates().filter(|&(_, _, hsv)| (pass.candidate)(hsv)),
                |hsv| (pass.distance)(target, hsv),
            );
            if let Some((index, distance)) = best
                && distance < pass.threshold
            {
                return index;
            }
        }

        let translucent = is_semi_transparent(color);
        let same_class = nearest_by(
            self.candidates()
                .filter(|&(_, entry, _)| is_semi_transparent(entry) == translucent),
            |hsv| weighted_distance(target, hsv),
        );
        let best = same_class
            .or_else(|| nearest_by(self.candidates(), |hsv| weighted_distance(target, hsv)));
        best.map_or(FALLBACK_INDEX, |(index, _)| index)
    }
}

/// Returns the index and distance of the first candidate with the least distance.
fn nearest_by(
    candidates: impl Iterator<Item = (u8, Rgba8, Hsv)>,
    distance: impl Fn(Hsv) -> f32,
) -> Option<(u8, f32)> {
    let mut best: Option<(u8, f32)> = None;
    for (index, _, hsv) in candidates {
        let d = distance(hsv);
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((index, d));
        }
    }
    best
}

fn is_semi_transparent(color: Rgba8) -> bool {
    color.a >= OPACITY_THRESHOLD && color.a < OPAQUE_THRESHOLD
}

fn in_hue_range(hsv: Hsv, low: f32, high: f32) -> bool {
    hsv.h >= low && hsv.h <= high
}

/// Perceptually weighted distance between two colors.
///
/// The weights of the hue, saturation, and value differences shift depending on the colors:
/// hue matters little for grayish colors, more for vivid ones, and value dominates for dark
/// ones. Hue difference is circular and normalized so that opposite hues differ by 1.
pub fn weighted_distance(a: Hsv, b: Hsv) -> f32 {
    let (mut hue_weight, mut sat_weight, mut val_weight) = (1.0, 1.0, 1.2);
    if a.s < 0.2 || b.s < 0.2 {
        hue_weight = 0.3;
        val_weight = 1.8;
    }
    if a.s > 0.7 && b.s > 0.7 {
        hue_weight = 1.5;
        sat_weight = 0.8;
    }
    if a.v < 0.2 || b.v < 0.2 {
        sat_weight = 0.5;
        val_weight = 1.8;
    }

    let dh = (a.h - b.h).abs() % 360.0;
    let hue_diff = dh.min(360.0 - dh) / 180.0;
    hue_weight * hue_diff + sat_weight * (a.s - b.s).abs() + val_weight * (a.v - b.v).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn palette_of(colors: &[Rgba8]) -> Palette {
        let mut palette = Palette::new();
        for &color in colors {
            palette.insert(color);
        }
        palette
    }

    fn opaque(r: u8, g: u8, b: u8) -> Rgba8 {
        Rgba8::new(r, g, b, 255)
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn is_send_sync() {
        assert_send_sync::<ColorMatcher<'static>>();
    }

    #[rstest]
    fn below_threshold_is_transparent(
        #[values(0, 1, 64, 127)] alpha: u8,
        #[values(PaletteMode::Preset, PaletteMode::Adaptive)] mode: PaletteMode,
    ) {
        let palette = palette_of(&[opaque(255, 0, 0), Rgba8::new(255, 0, 0, alpha)]);
        let matcher = ColorMatcher::new(&palette, mode);
        assert_eq!(matcher.find_index(Rgba8::new(255, 0, 0, alpha)), 0);
        assert_eq!(matcher.find_index(Rgba8::new(17, 99, 200, alpha)), 0);
    }

    #[test]
    fn exact_hit() {
        let palette = Palette::preset();
        let matcher = ColorMatcher::new(&palette, PaletteMode::Preset);
        let red = opaque(255, 0, 0);
        let index = matcher.find_index(red);
        assert_eq!(palette.get(index), red);
    }

    #[test]
    fn preset_nearest() {
        let palette = Palette::preset();
        let matcher = ColorMatcher::new(&palette, PaletteMode::Preset);
        let index = matcher.find_index(opaque(255, 7, 7));
        assert_eq!(palette.get(index), opaque(255, 0, 0));
    }

    #[test]
    fn preset_tie_goes_to_lowest_index() {
        let palette = palette_of(&[opaque(10, 0, 0), opaque(30, 0, 0)]);
        let matcher = ColorMatcher::new(&palette, PaletteMode::Preset);
        assert_eq!(matcher.find_index(opaque(20, 0, 0)), 1);
    }

    #[test]
    fn empty_palette() {
        let palette = Palette::new();
        let matcher = ColorMatcher::new(&palette, PaletteMode::Adaptive);
        assert_eq!(matcher.find_index(opaque(20, 0, 0)), FALLBACK_INDEX);
    }

    #[test]
    fn gray_pass_prefers_gray() {
        // The bluish gray is too saturated to be a candidate for the gray pass.
        let palette = palette_of(&[opaque(160, 160, 190), opaque(80, 80, 80)]);
        let matcher = ColorMatcher::new(&palette, PaletteMode::Adaptive);
        assert_eq!(matcher.find_index(opaque(100, 100, 100)), 2);
    }

    #[test]
    fn blue_roof_pass() {
        let palette = palette_of(&[opaque(60, 60, 60), opaque(40, 70, 200)]);
        let matcher = ColorMatcher::new(&palette, PaletteMode::Adaptive);
        assert_eq!(matcher.find_index(opaque(50, 90, 230)), 2);
    }

    #[test]
    fn wood_pass() {
        let palette = palette_of(&[opaque(200, 60, 60), opaque(140, 90, 40)]);
        let matcher = ColorMatcher::new(&palette, PaletteMode::Adaptive);
        assert_eq!(matcher.find_index(opaque(150, 100, 50)), 2);
    }

    #[test]
    fn translucency_class_respected() {
        let red = opaque(255, 0, 0);
        let glassy_red = Rgba8::new(200, 0, 0, 180);
        let palette = palette_of(&[red, glassy_red]);
        let matcher = ColorMatcher::new(&palette, PaletteMode::Adaptive);
        assert_eq!(matcher.find_index(Rgba8::new(255, 0, 0, 200)), 2);
        assert_eq!(matcher.find_index(opaque(210, 0, 0)), 1);
    }

    #[test]
    fn translucency_class_fallback() {
        let palette = palette_of(&[opaque(0, 0, 255), opaque(255, 0, 0)]);
        let matcher = ColorMatcher::new(&palette, PaletteMode::Adaptive);
        assert_eq!(matcher.find_index(Rgba8::new(250, 10, 0, 200)), 2);
    }

    #[rstest]
    fn faint_entries_never_chosen(
        #[values(PaletteMode::Preset, PaletteMode::Adaptive)] mode: PaletteMode,
    ) {
        let palette = palette_of(&[opaque(255, 0, 0), Rgba8::new(250, 5, 5, 51)]);
        let matcher = ColorMatcher::new(&palette, mode);
        assert_eq!(matcher.find_index(opaque(249, 6, 6)), 1);
        assert_eq!(matcher.find_index(Rgba8::new(249, 6, 6, 200)), 1);
    }

    #[test]
    fn hue_distance_wraps() {
        let a = Hsv { h: 350.0, s: 0.5, v: 0.5 };
        let b = Hsv { h: 10.0, s: 0.5, v: 0.5 };
        assert!((weighted_distance(a, b) - 20.0 / 180.0).abs() < 1e-6);
        assert_eq!(weighted_distance(a, b), weighted_distance(b, a));
    }

    #[test]
    fn same_color_same_index() {
        let palette = Palette::preset();
        let matcher = ColorMatcher::new(&palette, PaletteMode::Adaptive);
        let color = opaque(123, 45, 67);
        assert_eq!(matcher.find_index(color), matcher.find_index(color));
        assert_ne!(matcher.find_index(color), 0);
    }
}
