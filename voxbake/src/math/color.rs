//! Color data types. This module is private but reexported by its parent.

use core::fmt;

/// A floating-point RGBA color value.
///
/// * Each component has a nominal range of 0 to 1. Values outside that range are preserved,
///   but clamped whenever the color is quantized to [`Rgba8`].
/// * The alpha is not premultiplied.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "[f32; 4]", into = "[f32; 4]")
)]
#[expect(clippy::exhaustive_structs)]
pub struct Rgba {
    /// Red component.
    pub r: f32,
    /// Green component.
    pub g: f32,
    /// Blue component.
    pub b: f32,
    /// Alpha (opacity) component.
    pub a: f32,
}

/// An 8-bit-per-component RGBA color, as stored in palettes.
///
/// Two [`Rgba`] colors which round to the same [`Rgba8`] are considered identical for
/// palette purposes; see [`ColorKey`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[expect(clippy::exhaustive_structs)]
pub struct Rgba8 {
    /// Red component.
    pub r: u8,
    /// Green component.
    pub g: u8,
    /// Blue component.
    pub b: u8,
    /// Alpha (opacity) component.
    pub a: u8,
}

/// Canonical key used for color deduplication and exact-match lookup.
pub type ColorKey = Rgba8;

/// Hue, saturation, value representation of a color.
///
/// Hue is in degrees, in the range `0.0..360.0`; saturation and value are in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct Hsv {
    #[allow(missing_docs)]
    pub h: f32,
    #[allow(missing_docs)]
    pub s: f32,
    #[allow(missing_docs)]
    pub v: f32,
}

/// Hue, saturation, lightness representation of a color.
///
/// Hue is in degrees, in the range `0.0..360.0`; saturation and lightness are in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct Hsl {
    #[allow(missing_docs)]
    pub h: f32,
    #[allow(missing_docs)]
    pub s: f32,
    #[allow(missing_docs)]
    pub l: f32,
}

impl Rgba {
    /// Transparent black (all components zero).
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    /// Constructs a color from components.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Combines the red, green, and blue components into a perceptual brightness
    /// using the Rec. 601 weights.
    ///
    /// ```
    /// use voxbake::math::Rgba;
    ///
    /// assert_eq!(Rgba::WHITE.luma(), 1.0);
    /// assert_eq!(Rgba::BLACK.luma(), 0.0);
    /// ```
    #[inline]
    pub fn luma(self) -> f32 {
        0.299 * self.r + 0.587 * self.g + 0.114 * self.b
    }

    /// Quantizes to 8 bits per component, rounding to nearest and clamping to range.
    #[inline]
    pub fn to_rgba8(self) -> Rgba8 {
        Rgba8 {
            r: component_to_8(self.r),
            g: component_to_8(self.g),
            b: component_to_8(self.b),
            a: component_to_8(self.a),
        }
    }

    /// Converts the RGB components to [`Hsl`], ignoring alpha.
    pub fn to_hsl(self) -> Hsl {
        let [r, g, b] = self.clamped_rgb();
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        let l = (max + min) / 2.0;
        let s = if delta <= 0.0 {
            0.0
        } else {
            delta / (1.0 - (2.0 * l - 1.0).abs())
        };
        Hsl {
            h: hue(r, g, b, max, delta),
            s: s.min(1.0),
            l,
        }
    }

    /// Converts [`Hsl`] back to RGB, attaching the given alpha.
    pub fn from_hsl(Hsl { h, s, l }: Hsl, a: f32) -> Self {
        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let [r, g, b] = chroma_to_rgb(h, chroma, l - chroma / 2.0);
        Self { r, g, b, a }
    }

    /// Converts the RGB components to [`Hsv`], ignoring alpha.
    pub fn to_hsv(self) -> Hsv {
        let [r, g, b] = self.clamped_rgb();
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;
        Hsv {
            h: hue(r, g, b, max, delta),
            s: if max <= 0.0 { 0.0 } else { delta / max },
            v: max,
        }
    }

    /// Converts [`Hsv`] back to RGB, attaching the given alpha.
    pub fn from_hsv(Hsv { h, s, v }: Hsv, a: f32) -> Self {
        let chroma = v * s;
        let [r, g, b] = chroma_to_rgb(h, chroma, v - chroma);
        Self { r, g, b, a }
    }

    fn clamped_rgb(self) -> [f32; 3] {
        [self.r, self.g, self.b].map(|c| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) })
    }
}

impl Rgba8 {
    /// Fully transparent black; the color of palette index 0.
    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);

    /// Constructs a color from components.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpacks a color from a 32-bit word laid out as `0xAARRGGBB`.
    ///
    /// ```
    /// use voxbake::math::Rgba8;
    ///
    /// assert_eq!(Rgba8::from_argb(0xff102030), Rgba8::new(0x10, 0x20, 0x30, 0xff));
    /// ```
    #[inline]
    pub const fn from_argb(word: u32) -> Self {
        let [a, r, g, b] = word.to_be_bytes();
        Self { r, g, b, a }
    }

    /// Converts to floating-point components.
    #[inline]
    pub fn to_rgba(self) -> Rgba {
        Rgba {
            r: f32::from(self.r) / 255.0,
            g: f32::from(self.g) / 255.0,
            b: f32::from(self.b) / 255.0,
            a: f32::from(self.a) / 255.0,
        }
    }

    /// Converts the RGB components to [`Hsv`].
    #[inline]
    pub fn to_hsv(self) -> Hsv {
        self.to_rgba().to_hsv()
    }

    /// Converts an [`Hsv`] color with the given alpha to 8-bit components.
    #[inline]
    pub fn from_hsv(hsv: Hsv, a: u8) -> Self {
        let Rgba8 { r, g, b, .. } = Rgba::from_hsv(hsv, 1.0).to_rgba8();
        Self { r, g, b, a }
    }

    /// Whether the alpha is exactly zero.
    #[inline]
    pub const fn is_fully_transparent(self) -> bool {
        self.a == 0
    }

    /// Whether the alpha is strictly between zero and fully opaque.
    #[inline]
    pub const fn is_translucent(self) -> bool {
        self.a > 0 && self.a < 255
    }

    /// Squared Euclidean distance between the RGB components, ignoring alpha.
    #[inline]
    pub fn rgb_distance_squared(self, other: Rgba8) -> u32 {
        let d = |a: u8, b: u8| u32::from(a.abs_diff(b)).pow(2);
        d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b)
    }
}

impl fmt::Display for Rgba8 {
    /// Formats as a hexadecimal `#rrggbbaa` string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { r, g, b, a } = self;
        write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

impl From<[f32; 4]> for Rgba {
    #[inline]
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }
}

impl From<Rgba> for [f32; 4] {
    #[inline]
    fn from(Rgba { r, g, b, a }: Rgba) -> Self {
        [r, g, b, a]
    }
}

impl From<[u8; 4]> for Rgba8 {
    #[inline]
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

#[inline]
fn component_to_8(c: f32) -> u8 {
    // `as` saturates and maps NaN to zero.
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Hue in degrees of an RGB color whose largest component is `max` and whose
/// chroma is `delta`.
fn hue(r: f32, g: f32, b: f32, max: f32, delta: f32) -> f32 {
    if delta <= 0.0 {
        return 0.0;
    }
    let h = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    (h * 60.0).rem_euclid(360.0)
}

/// Shared tail of HSL and HSV to RGB conversion.
fn chroma_to_rgb(h: f32, chroma: f32, m: f32) -> [f32; 3] {
    let h = h.rem_euclid(360.0) / 60.0;
    let x = chroma * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    [r + m, g + m, b + m]
}
