use crate::math::Rgba8;
use crate::palette::{ColorCount, PaletteStrategy};

/// [`PaletteStrategy`] implementing median-cut quantization in RGB space.
///
/// The set of colors is repeatedly split, at the median, along the channel with the largest
/// range in any box, until there are as many boxes as the budget allows. Each box is then
/// represented by the count-weighted average of its colors.
#[allow(clippy::exhaustive_structs)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MedianCut;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Channel {
    R,
    G,
    B,
}

impl Channel {
    const ALL: [Self; 3] = [Self::R, Self::G, Self::B];

    fn of(self, color: Rgba8) -> u8 {
        match self {
            Channel::R => color.r,
            Channel::G => color.g,
            Channel::B => color.b,
        }
    }
}

/// Returns the channel with the largest range of values in `colors`, and that range.
/// Ties go to the earlier channel.
fn widest_channel(colors: &[ColorCount]) -> (Channel, u8) {
    let mut best = (Channel::R, 0);
    for channel in Channel::ALL {
        let (min, max) = colors.iter().fold((u8::MAX, u8::MIN), |(min, max), c| {
            let value = channel.of(c.color);
            (min.min(value), max.max(value))
        });
        let range = max.saturating_sub(min);
        if range > best.1 {
            best = (channel, range);
        }
    }
    best
}

fn weighted_average(colors: &[ColorCount]) -> Rgba8 {
    let total: u64 = colors.iter().map(|c| c.count as u64).sum::<u64>().max(1);
    let average = |component: fn(Rgba8) -> u8| {
        let sum: u64 = colors
            .iter()
            .map(|c| u64::from(component(c.color)) * c.count as u64)
            .sum();
        // Rounded; cannot exceed 255 since it is an average of u8s.
        ((sum + total / 2) / total) as u8
    };
    Rgba8 {
        r: average(|c| c.r),
        g: average(|c| c.g),
        b: average(|c| c.b),
        a: average(|c| c.a),
    }
}

impl PaletteStrategy for MedianCut {
    fn reduce(&self, colors: &[ColorCount], budget: usize) -> Vec<Rgba8> {
        if colors.len() <= budget {
            return colors.iter().map(|c| c.color).collect();
        }
        if budget == 0 {
            return Vec::new();
        }

        let mut boxes: Vec<Vec<ColorCount>> = vec![colors.to_vec()];
        while boxes.len() < budget {
            // Find the splittable box with the widest channel; the first one wins ties.
            let mut widest: Option<(usize, Channel, u8)> = None;
            for (index, colors_in_box) in boxes.iter().enumerate() {
                if colors_in_box.len() < 2 {
                    continue;
                }
                let (channel, range) = widest_channel(colors_in_box);
                if widest.is_none_or(|(_, _, best)| range > best) {
                    widest = Some((index, channel, range));
                }
            }
            let Some((index, channel, _)) = widest else {
                break;
            };

            let to_split = &mut boxes[index];
            to_split.sort_by_key(|c| channel.of(c.color));
            let upper = to_split.split_off(to_split.len() / 2);
            boxes.push(upper);
        }

        boxes.iter().map(|b| weighted_average(b)).collect()
    }
}
