//! RGB and RGBA color types, with utility methods for parsing colors from hex integers and
//! strings. Both types are laid out as plain floats, so they can be written directly into vertex
//! buffers and uploaded as `vec3`/`vec4` uniforms.

use std::str::FromStr;

use bytemuck::{Pod, Zeroable};

/// A opaque color with red, green and blue components. All components are expected to be between
/// 0 and 1, both inclusive.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Default, Pod, Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// A color with red, green, blue and alpha components. All components are expected to be
/// between 0 and 1, both inclusive.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Default, Pod, Zeroable)]
pub struct ColorA {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Creates a new color. All parameters are clamped so that they are between 0 and 1, both
    /// inclusive.
    pub fn rgb(r: f32, g: f32, b: f32) -> Color {
        Color {
            r: clamp(r, 0.0, 1.0),
            g: clamp(g, 0.0, 1.0),
            b: clamp(b, 0.0, 1.0),
        }
    }

    /// Creates a color from a hex string. The string should be of the format "#rrggbb" or
    /// "rrggbb", where each of r, g and b is a hexadecimal digit.
    pub fn hex_str(string: &str) -> Option<Color> {
        let digits = string.strip_prefix('#').unwrap_or(string);
        if digits.len() != 6 {
            return None;
        }

        parse_hex(digits).map(Color::hex_int)
    }

    /// Creates a color from a hex int. Bit `16..24` are the red channel, bit `8..16` are the
    /// green channel and bit `0..8` (The eight least significant bits) are the blue channel.
    ///
    /// # Example
    /// ```rust
    /// # use glmesh::Color;
    /// let color = Color::hex_int(0xff00ff);
    ///
    /// assert_eq!(color, Color::rgb(1.0, 0.0, 1.0));
    /// ```
    pub fn hex_int(value: u32) -> Color {
        let (r, g, b) = split_channels(value);
        Color { r, g, b }
    }

    /// Converts this color to a hex string like "#ffa13b".
    pub fn to_hex(&self) -> String {
        format!("#{:06x}", join_channels(self.r, self.g, self.b))
    }

    /// Linearly interpolates between this color and the given other color. `t` should be between
    /// 0 and 1. Values outside of this range will lead to extrapolation.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color {
            r: self.r*(1.0 - t) + other.r*t,
            g: self.g*(1.0 - t) + other.g*t,
            b: self.b*(1.0 - t) + other.b*t,
        }
    }
}

impl ColorA {
    /// Creates a new color. All parameters are clamped so that they are between 0 and 1, both
    /// inclusive.
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> ColorA {
        ColorA {
            r: clamp(r, 0.0, 1.0),
            g: clamp(g, 0.0, 1.0),
            b: clamp(b, 0.0, 1.0),
            a: clamp(a, 0.0, 1.0),
        }
    }

    /// Creates a color from a hex string of the format "#rrggbb", "rrggbb", "#rrggbbaa" or
    /// "rrggbbaa". If no alpha digits are given the color is completely opaque.
    pub fn hex_str(string: &str) -> Option<ColorA> {
        let digits = string.strip_prefix('#').unwrap_or(string);
        match digits.len() {
            6 => Color::hex_str(digits).map(ColorA::from),
            8 => {
                let value = parse_hex(digits)?;
                let alpha = (value & 0xff) as f32 / 255.0;
                Some(ColorA::hex_int_alpha(value >> 8, alpha))
            },
            _ => None,
        }
    }

    /// Same as [`Color::hex_int`], but allows specifying the alpha channel. `alpha` should be
    /// between 0 and 1, both inclusive.
    pub fn hex_int_alpha(value: u32, alpha: f32) -> ColorA {
        let (r, g, b) = split_channels(value);
        ColorA { r, g, b, a: alpha }
    }

    /// Converts this color to a hex string like "#ffa13b80".
    pub fn to_hex(&self) -> String {
        let a = channel_byte(self.a);
        format!("#{:06x}{:02x}", join_channels(self.r, self.g, self.b), a)
    }

    /// Linearly interpolates between this color and the given other color, including the alpha
    /// channel.
    pub fn lerp(self, other: ColorA, t: f32) -> ColorA {
        ColorA {
            r: self.r*(1.0 - t) + other.r*t,
            g: self.g*(1.0 - t) + other.g*t,
            b: self.b*(1.0 - t) + other.b*t,
            a: self.a*(1.0 - t) + other.a*t,
        }
    }
}

fn split_channels(value: u32) -> (f32, f32, f32) {
    let r = value >> 16 & 0xff;
    let g = value >> 8 & 0xff;
    let b = value & 0xff;

    (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

// Channels outside 0..1 saturate instead of spilling into their neighbours
fn join_channels(r: f32, g: f32, b: f32) -> u32 {
    channel_byte(r) << 16 | channel_byte(g) << 8 | channel_byte(b)
}

fn channel_byte(value: f32) -> u32 {
    (clamp(value, 0.0, 1.0) * 255.0).round() as u32
}

// `from_str_radix` alone accepts a leading sign
fn parse_hex(digits: &str) -> Option<u32> {
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

// Does not properly handle NaN, which should not really matter
fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        return min;
    }
    if value > max {
        return max;
    }
    value
}

impl From<Color> for ColorA {
    fn from(c: Color) -> ColorA {
        ColorA { r: c.r, g: c.g, b: c.b, a: 1.0 }
    }
}

/// Drops the alpha channel
impl From<ColorA> for Color {
    fn from(c: ColorA) -> Color {
        Color { r: c.r, g: c.g, b: c.b }
    }
}

impl From<u32> for Color {
    fn from(v: u32) -> Color {
        Color::hex_int(v)
    }
}

impl FromStr for Color {
    type Err = (); // The user can see why the color failed to parse on inspection

    fn from_str(s: &str) -> Result<Color, ()> {
        Color::hex_str(s).ok_or(())
    }
}

impl FromStr for ColorA {
    type Err = ();

    fn from_str(s: &str) -> Result<ColorA, ()> {
        ColorA::hex_str(s).ok_or(())
    }
}

// Custom serialization
#[cfg(feature = "serialize")]
mod serialize {
    use super::*;

    use std::fmt;
    use std::marker::PhantomData;
    use serde::{Serialize, Deserialize, Serializer, Deserializer};
    use serde::de::{Visitor, Error};

    impl Serialize for Color {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.serialize_str(&self.to_hex())
        }
    }

    impl Serialize for ColorA {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            s.serialize_str(&self.to_hex())
        }
    }

    impl<'de> Deserialize<'de> for Color {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            d.deserialize_str(HexVisitor(PhantomData))
        }
    }

    impl<'de> Deserialize<'de> for ColorA {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            d.deserialize_str(HexVisitor(PhantomData))
        }
    }

    struct HexVisitor<T>(PhantomData<T>);

    impl<'de, T: FromStr> Visitor<'de> for HexVisitor<T> {
        type Value = T;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("A string representing a valid hex color")
        }

        fn visit_str<E: Error>(self, v: &str) -> Result<Self::Value, E> {
            v.parse().map_err(|_| E::custom(format!("\"{}\" is not a valid color string", v)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_hex() {
        assert_eq!("#ffa3b1", Color::hex_str("#ffa3b1").unwrap().to_hex());
        assert_eq!("#a300f1", Color::hex_str("a300f1").unwrap().to_hex());
        assert_eq!("#000000", Color::hex_str("#000000").unwrap().to_hex());
        assert_eq!("#000001", Color::hex_str("#000001").unwrap().to_hex());
        assert_eq!("#100000", Color::hex_str("#100000").unwrap().to_hex());
    }

    #[test]
    fn test_rejects_malformed_hex() {
        assert_eq!(None, Color::hex_str("#fff"));
        assert_eq!(None, Color::hex_str("#gggggg"));
        assert!("#12345".parse::<ColorA>().is_err());
    }

    #[test]
    fn test_alpha_hex() {
        let color = ColorA::hex_str("#ff000080").unwrap();
        assert_eq!(1.0, color.r);
        assert_eq!(0.0, color.g);
        assert!((color.a - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!("#ff000080", color.to_hex());

        assert_eq!(1.0, ColorA::hex_str("00ff00").unwrap().a);
    }

    #[test]
    fn test_clamping_and_conversion() {
        let color = Color::rgb(2.0, -1.0, 0.5);
        assert_eq!(Color { r: 1.0, g: 0.0, b: 0.5 }, color);

        let with_alpha = ColorA::from(color);
        assert_eq!(1.0, with_alpha.a);
        assert_eq!(color, Color::from(with_alpha));
    }

    #[test]
    fn test_rejects_signed_hex() {
        assert!("+fffff".parse::<Color>().is_err());
        assert!("#+fffff".parse::<Color>().is_err());
        assert!("+fffffff".parse::<ColorA>().is_err());
    }

    #[test]
    fn test_extrapolated_colors_saturate_in_hex() {
        let color = Color::rgb(0.0, 0.0, 1.0).lerp(Color::rgb(0.0, 0.0, 0.5), -1.0);
        assert_eq!(1.5, color.b);
        assert_eq!("#0000ff", color.to_hex());

        let color = ColorA { r: -0.5, g: 2.0, b: 0.0, a: 1.25 };
        assert_eq!("#00ff00ff", color.to_hex());
    }

    #[test]
    fn test_pod_layout() {
        let color = ColorA::rgba(1.0, 0.0, 0.0, 1.0);
        let bytes = bytemuck::bytes_of(&color);
        assert_eq!(16, bytes.len());
        assert_eq!(&1.0f32.to_ne_bytes(), &bytes[0..4]);
    }
}
