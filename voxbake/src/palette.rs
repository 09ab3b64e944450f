//! Construction of the ≤ 256-entry indexed color table of an exported model.

use core::fmt;

use hashbrown::HashMap;

use crate::math::{ColorKey, Rgba8};
use crate::matcher::OPACITY_THRESHOLD;

mod adaptive;
mod hue_buckets;
mod key_colors;
mod median_cut;
mod preset;

pub use hue_buckets::HueBuckets;
pub use key_colors::{BASE_COLORS, KEY_COLORS};
pub use median_cut::MedianCut;
pub use preset::PRESET_ARGB;

/// How the palette of an export is chosen.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
#[strum(serialize_all = "kebab-case")]
#[non_exhaustive]
pub enum PaletteMode {
    /// Use the fixed [`PRESET_ARGB`] table; every voxel gets its nearest preset color.
    Preset,
    /// Build a palette from the colors actually present in the model.
    #[default]
    Adaptive,
}

/// Which [`PaletteStrategy`] [`PaletteMode::Adaptive`] uses when there are too many colors.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
#[strum(serialize_all = "kebab-case")]
#[non_exhaustive]
pub enum QuantizerKind {
    /// [`HueBuckets`].
    #[default]
    HueBuckets,
    /// [`MedianCut`].
    MedianCut,
}

impl QuantizerKind {
    /// Returns the strategy implementing this kind.
    pub fn strategy(self) -> &'static dyn PaletteStrategy {
        match self {
            QuantizerKind::HueBuckets => &HueBuckets,
            QuantizerKind::MedianCut => &MedianCut,
        }
    }
}

impl fmt::Display for PaletteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(<&'static str>::from(*self))
    }
}

impl fmt::Display for QuantizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(<&'static str>::from(*self))
    }
}

/// A distinct color and the number of voxels which have it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct ColorCount {
    #[allow(missing_docs)]
    pub color: Rgba8,
    #[allow(missing_docs)]
    pub count: usize,
}

/// An algorithm for choosing a limited number of representative colors.
///
/// Implementations must be deterministic: the same input must always produce the same
/// output, in the same order.
pub trait PaletteStrategy: fmt::Debug + Send + Sync {
    /// Chooses at most `budget` colors to represent `colors`.
    ///
    /// `colors` contains no duplicates, and is in order of first appearance in the model.
    fn reduce(&self, colors: &[ColorCount], budget: usize) -> Vec<Rgba8>;
}

/// An indexed color table of 256 entries, of which entry 0 is always transparent.
///
/// Entries `1..=len()` are in use; the rest are transparent padding.
#[derive(Clone, Eq, PartialEq)]
pub struct Palette {
    entries: [Rgba8; 256],
    len: usize,
    /// Maps each color present to the lowest index holding it. Never contains index 0.
    color_map: HashMap<ColorKey, u8>,
}

impl Palette {
    /// Maximum number of entries in use, not counting the transparent entry 0.
    pub const CAPACITY: usize = 255;

    /// Constructs a palette with no entries in use.
    pub fn new() -> Self {
        Self {
            entries: [Rgba8::TRANSPARENT; 256],
            len: 0,
            color_map: HashMap::new(),
        }
    }

    /// Constructs a full palette from packed `0xAARRGGBB` words.
    ///
    /// Whatever `words[0]` is, entry 0 is transparent.
    pub fn from_argb_words(words: &[u32; 256]) -> Self {
        let mut palette = Self::new();
        for (index, &word) in (1..=255u8).zip(&words[1..]) {
            let color = Rgba8::from_argb(word);
            palette.entries[usize::from(index)] = color;
            if !color.is_fully_transparent() {
                palette.color_map.entry(color).or_insert(index);
            }
        }
        palette.len = Self::CAPACITY;
        palette
    }

    /// The [`PRESET_ARGB`] palette.
    pub fn preset() -> Self {
        Self::from_argb_words(&PRESET_ARGB)
    }

    /// Adds `color` if it is not already present, and returns its index.
    ///
    /// Returns `Some(0)` for fully transparent colors, and [`None`] if the palette is full.
    pub fn insert(&mut self, color: Rgba8) -> Option<u8> {
        if color.is_fully_transparent() {
            return Some(0);
        }
        if let Some(&index) = self.color_map.get(&color) {
            return Some(index);
        }
        if self.is_full() {
            return None;
        }
        let index = u8::try_from(self.len + 1).ok()?;
        self.len += 1;
        self.entries[usize::from(index)] = color;
        self.color_map.insert(color, index);
        Some(index)
    }

    /// All 256 entries, including entry 0 and unused entries.
    pub fn entries(&self) -> &[Rgba8; 256] {
        &self.entries
    }

    /// The entries in use, starting from index 1.
    pub fn used(&self) -> &[Rgba8] {
        &self.entries[1..=self.len]
    }

    /// Returns the color at `index`.
    pub fn get(&self, index: u8) -> Rgba8 {
        self.entries[usize::from(index)]
    }

    /// Returns the lowest index holding exactly `key`, if any.
    pub fn index_of(&self, key: ColorKey) -> Option<u8> {
        self.color_map.get(&key).copied()
    }

    /// Number of entries in use, not counting entry 0.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no entries are in use.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether [`Self::insert()`] would fail for a new color.
    pub fn is_full(&self) -> bool {
        self.len >= Self::CAPACITY
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Palette")
            .field("len", &self.len)
            .field("used", &self.used())
            .finish_non_exhaustive()
    }
}

/// Statistics about palette synthesis, for reporting.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct PaletteStats {
    /// Number of distinct non-transparent colors in the input.
    pub unique_colors: usize,
    /// Number of palette entries in use.
    pub used_entries: usize,
    /// Whether the input colors were reduced, so that some will not be reproduced exactly.
    pub quantized: bool,
    /// Number of colors chosen for the palette which did not fit in it.
    pub overflowed: usize,
}

/// Counts the distinct colors in `colors`, skipping those too transparent to be given a
/// palette index (alpha below [`OPACITY_THRESHOLD`]).
///
/// The result is in order of first appearance.
pub fn count_colors(colors: impl IntoIterator<Item = Rgba8>) -> Vec<ColorCount> {
    let mut positions: HashMap<Rgba8, usize> = HashMap::new();
    let mut counts: Vec<ColorCount> = Vec::new();
    for color in colors {
        if color.a < OPACITY_THRESHOLD {
            continue;
        }
        let position = *positions.entry(color).or_insert_with(|| {
            counts.push(ColorCount { color, count: 0 });
            counts.len() - 1
        });
        counts[position].count += 1;
    }
    counts
}

/// Builds the palette for a model whose (already lit) voxel colors are `colors`.
pub fn synthesize(
    mode: PaletteMode,
    quantizer: QuantizerKind,
    key_colors: bool,
    colors: impl IntoIterator<Item = Rgba8>,
) -> (Palette, PaletteStats) {
    let counts = count_colors(colors);
    match mode {
        PaletteMode::Preset => {
            // The preset table has no free entries, so key colors are only used when
            // already present, which is the same as not injecting them.
            let palette = Palette::preset();
            let stats = PaletteStats {
                unique_colors: counts.len(),
                used_entries: palette.len(),
                quantized: false,
                overflowed: 0,
            };
            (palette, stats)
        }
        PaletteMode::Adaptive => adaptive::adaptive_palette(&counts, quantizer.strategy(), key_colors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_and_lookup() {
        let mut palette = Palette::new();
        let red = Rgba8::new(255, 0, 0, 255);
        assert_eq!(palette.insert(red), Some(1));
        assert_eq!(palette.insert(Rgba8::new(0, 255, 0, 255)), Some(2));
        assert_eq!(palette.insert(red), Some(1));
        assert_eq!(palette.insert(Rgba8::new(9, 9, 9, 0)), Some(0));
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.index_of(red), Some(1));
        assert_eq!(palette.get(0), Rgba8::TRANSPARENT);
        assert_eq!(palette.used(), &[red, Rgba8::new(0, 255, 0, 255)]);
    }

    #[test]
    fn insert_when_full() {
        let mut palette = Palette::new();
        for i in 0..=254 {
            assert_eq!(palette.insert(Rgba8::new(i, 0, 0, 255)), Some(i + 1));
        }
        assert!(palette.is_full());
        assert_eq!(palette.insert(Rgba8::new(0, 1, 0, 255)), None);
        // Existing colors are still found.
        assert_eq!(palette.insert(Rgba8::new(7, 0, 0, 255)), Some(8));
    }

    #[test]
    fn preset_palette() {
        let palette = Palette::preset();
        assert_eq!(palette.len(), 255);
        assert_eq!(palette.get(0), Rgba8::TRANSPARENT);
        assert_eq!(palette.get(1), Rgba8::new(255, 255, 255, 255));
        assert_eq!(palette.index_of(Rgba8::TRANSPARENT), None);
        // The preset has no duplicates, so every entry is its own first occurrence.
        for index in 1..=255u8 {
            assert_eq!(palette.index_of(palette.get(index)), Some(index));
        }
    }

    #[test]
    fn count_colors_in_first_seen_order() {
        let a = Rgba8::new(1, 2, 3, 255);
        let b = Rgba8::new(4, 5, 6, 255);
        let counts = count_colors([
            b,
            a,
            Rgba8::TRANSPARENT,
            b,
            Rgba8::new(1, 1, 1, 0),
            Rgba8::new(7, 7, 7, 127),
            b,
            Rgba8::new(8, 8, 8, 128),
        ]);
        assert_eq!(
            counts,
            vec![
                ColorCount { color: b, count: 3 },
                ColorCount { color: a, count: 1 },
                ColorCount {
                    color: Rgba8::new(8, 8, 8, 128),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn mode_names() {
        assert_eq!("preset".parse::<PaletteMode>(), Ok(PaletteMode::Preset));
        assert_eq!(QuantizerKind::MedianCut.to_string(), "median-cut");
    }

    #[test]
    fn preset_stats() {
        let (palette, stats) = synthesize(
            PaletteMode::Preset,
            QuantizerKind::default(),
            true,
            [Rgba8::new(1, 2, 3, 255)],
        );
        assert_eq!(palette, Palette::preset());
        assert_eq!(stats.unique_colors, 1);
        assert_eq!(stats.used_entries, 255);
        assert!(!stats.quantized);
    }
}
