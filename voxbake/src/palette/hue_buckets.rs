use core::cmp::Reverse;

use itertools::Itertools as _;

use crate::math::{Hsv, Rgba8};
use crate::palette::{ColorCount, PaletteStrategy};

/// Number of hue categories, each spanning 30°.
const CATEGORIES: usize = 12;

/// Palette entries held back for blue hues, which are common on roofs and easily lost
/// among warmer building colors.
const BLUE_RESERVE: usize = 6;

/// [`PaletteStrategy`] which groups colors by hue and then by brightness, and picks the most
/// prominent colors of each group.
///
/// * Every hue category gets one entry per brightness band it has colors in.
/// * Further entries are shared out in proportion to how many colors each category has.
/// * Blue hues get up to [`BLUE_RESERVE`] additional entries.
///
/// Within a group, colors are ranked by a weight favoring saturated, bright, and frequent
/// colors.
#[allow(clippy::exhaustive_structs)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HueBuckets;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
enum Band {
    Dark,
    Mid,
    Bright,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    /// Position in the input.
    index: usize,
    color: Rgba8,
    hsv: Hsv,
    weight: f32,
    category: usize,
    band: Band,
}

impl Candidate {
    fn new(index: usize, &ColorCount { color, count }: &ColorCount) -> Self {
        let hsv = color.to_hsv();
        Self {
            index,
            color,
            hsv,
            weight: (hsv.s * 0.7 + 0.3) * (hsv.v * 0.7 + 0.3) * (1.0 + count as f32).log10(),
            category: ((hsv.h / 30.0) as usize).min(CATEGORIES - 1),
            band: if hsv.v < 0.4 {
                Band::Dark
            } else if hsv.v < 0.7 {
                Band::Mid
            } else {
                Band::Bright
            },
        }
    }

    fn is_blue(&self) -> bool {
        (200.0..=260.0).contains(&self.hsv.h) && self.hsv.s > 0.0
    }
}

/// Accumulates chosen candidates without duplicates.
struct Selection {
    picked: Vec<bool>,
    chosen: Vec<Rgba8>,
}

impl Selection {
    fn take(&mut self, candidate: &Candidate) -> bool {
        if self.picked[candidate.index] {
            false
        } else {
            self.picked[candidate.index] = true;
            self.chosen.push(candidate.color);
            true
        }
    }
}

impl PaletteStrategy for HueBuckets {
    fn reduce(&self, colors: &[ColorCount], budget: usize) -> Vec<Rgba8> {
        if colors.len() <= budget {
            return colors.iter().map(|c| c.color).collect();
        }

        let candidates: Vec<Candidate> = colors
            .iter()
            .enumerate()
            .map(|(index, count)| Candidate::new(index, count))
            .collect();
        // Stable sort, so equal weights stay in first-seen order.
        let by_weight: Vec<&Candidate> = candidates
            .iter()
            .sorted_by(|a, b| b.weight.total_cmp(&a.weight))
            .collect();

        let mut members: [Vec<&Candidate>; CATEGORIES] = Default::default();
        for &candidate in &by_weight {
            members[candidate.category].push(candidate);
        }

        let blue_count = candidates.iter().filter(|c| c.is_blue()).count();
        let reserve = BLUE_RESERVE.min(blue_count).min(budget);

        let mut selection = Selection {
            picked: vec![false; candidates.len()],
            chosen: Vec::with_capacity(budget),
        };

        let allocation = allocate(&members, budget - reserve);
        for (category_members, slots) in members.iter().zip(allocation) {
            pick_from_category(category_members, slots, &mut selection);
        }

        let mut reserved = 0;
        for &candidate in by_weight.iter().filter(|c| c.is_blue()) {
            if reserved == reserve {
                break;
            }
            if selection.take(candidate) {
                reserved += 1;
            }
        }

        // Whatever the allocation left unused goes to the heaviest remaining colors.
        for &candidate in &by_weight {
            if selection.chosen.len() >= budget {
                break;
            }
            selection.take(candidate);
        }

        selection.chosen
    }
}

fn band_count(members: &[&Candidate]) -> usize {
    members.iter().map(|c| c.band).unique().count()
}

/// Decides how many entries each hue category gets out of `budget`.
fn allocate(members: &[Vec<&Candidate>; CATEGORIES], budget: usize) -> [usize; CATEGORIES] {
    let bands: [usize; CATEGORIES] = core::array::from_fn(|c| band_count(&members[c]));
    let base_total: usize = bands.iter().sum();
    let mut allocation = [0; CATEGORIES];

    if base_total >= budget {
        // Not even one entry per band; go round the hue circle so every hue gets a chance.
        let mut remaining = budget;
        for round in 0..3 {
            for category in 0..CATEGORIES {
                if remaining > 0 && bands[category] > round {
                    allocation[category] += 1;
                    remaining -= 1;
                }
            }
        }
        return allocation;
    }

    let total_colors: usize = members.iter().map(Vec::len).sum();
    let extra = budget - base_total;
    for category in 0..CATEGORIES {
        let size = members[category].len();
        let share = extra * size / total_colors;
        allocation[category] = (bands[category] + share).min(size);
    }

    let mut leftover = budget - allocation.iter().sum::<usize>();
    while leftover > 0 {
        // Lowest category wins ties.
        let Some(category) = (0..CATEGORIES)
            .min_by_key(|&c| Reverse(members[c].len() - allocation[c]))
            .filter(|&c| members[c].len() > allocation[c])
        else {
            break;
        };
        allocation[category] += 1;
        leftover -= 1;
    }
    allocation
}

/// Picks `slots` colors from one category: the heaviest of each band first, then the
/// heaviest of the rest.
fn pick_from_category(members: &[&Candidate], slots: usize, selection: &mut Selection) {
    let mut remaining = slots;
    let mut bands_seen: Vec<Band> = Vec::with_capacity(3);
    for &candidate in members {
        if remaining == 0 {
            return;
        }
        if !bands_seen.contains(&candidate.band) {
            bands_seen.push(candidate.band);
            selection.take(candidate);
            remaining -= 1;
        }
    }
    for &candidate in members {
        if remaining == 0 {
            return;
        }
        if selection.take(candidate) {
            remaining -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashSet;
    use pretty_assertions::assert_eq;

    fn once(color: Rgba8) -> ColorCount {
        ColorCount { color, count: 1 }
    }

    fn rainbow(n: usize) -> Vec<ColorCount> {
        (0..n)
            .map(|i| {
                let hsv = Hsv {
                    h: (i * 360 / n) as f32,
                    s: 0.5 + 0.5 * ((i % 3) as f32 / 2.0),
                    v: 0.2 + 0.8 * ((i % 5) as f32 / 4.0),
                };
                once(Rgba8::from_hsv(hsv, 255))
            })
            .unique_by(|c| c.color)
            .collect()
    }

    #[test]
    fn fitting_colors_are_returned_unchanged() {
        let colors = rainbow(10);
        assert_eq!(
            HueBuckets.reduce(&colors, 10),
            colors.iter().map(|c| c.color).collect::<Vec<_>>()
        );
    }

    #[test]
    fn exact_budget_no_duplicates() {
        let colors = rainbow(600);
        assert!(colors.len() > 100);
        let reduced = HueBuckets.reduce(&colors, 100);
        assert_eq!(reduced.len(), 100);
        assert_eq!(reduced.iter().collect::<HashSet<_>>().len(), 100);

        let inputs: HashSet<Rgba8> = colors.iter().map(|c| c.color).collect();
        assert!(reduced.iter().all(|c| inputs.contains(c)));
    }

    #[test]
    fn every_hue_represented() {
        let colors = rainbow(600);
        let reduced = HueBuckets.reduce(&colors, 60);
        let categories: HashSet<usize> = reduced
            .iter()
            .map(|c| (c.to_hsv().h / 30.0) as usize)
            .collect();
        assert_eq!(categories.len(), CATEGORIES);
    }

    #[test]
    fn tiny_budget() {
        let reduced = HueBuckets.reduce(&rainbow(600), 5);
        assert_eq!(reduced.len(), 5);
        assert!(HueBuckets.reduce(&rainbow(600), 0).is_empty());
    }

    #[test]
    fn blue_reserve() {
        // Many reds in all bands, and three similar bright blues.
        let mut colors: Vec<ColorCount> =
            (1..=255).map(|r| once(Rgba8::new(r, 0, 0, 255))).collect();
        colors.extend([200, 210, 220].map(|b| once(Rgba8::new(0, 0, b, 255))));

        let reduced = HueBuckets.reduce(&colors, 20);
        assert_eq!(reduced.len(), 20);
        let blues = reduced.iter().filter(|c| c.b > 0).count();
        assert_eq!(blues, 3, "{reduced:?}");
    }

    #[test]
    fn frequency_matters() {
        // Two colors in the same group; the common one should be chosen.
        let mut colors = rainbow(300);
        let rare = Rgba8::new(250, 10, 10, 255);
        let common = Rgba8::new(251, 10, 10, 255);
        colors.push(ColorCount { color: rare, count: 1 });
        colors.push(ColorCount { color: common, count: 1000 });
        let reduced = HueBuckets.reduce(&colors, 40);
        assert!(reduced.contains(&common));
    }

    #[test]
    fn deterministic() {
        let colors = rainbow(600);
        assert_eq!(HueBuckets.reduce(&colors, 77), HueBuckets.reduce(&colors, 77));
    }
}
