use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const GRAY: Color = Color::rgb(0x88, 0x88, 0x88);
    pub const SELECTION: Color = Color::rgb(0x00, 0x66, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();

        match digits.len() {
            6 => Some(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Some(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Weighted average: `factor` of `self` plus `1 - factor` of `other`
    pub fn blend(self, other: Color, factor: f64) -> Color {
        let factor = factor.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f64::from(a) * factor + f64::from(b) * (1.0 - factor)).round() as u8;

        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    /// Luma-weighted gray of the same brightness
    pub fn grayscale(self) -> Color {
        let luma = 0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b);
        let v = luma.round().clamp(0.0, 255.0) as u8;
        Color::rgb(v, v, v)
    }

    pub fn darken(self, amount: f64) -> Color {
        self.blend(Color::BLACK, 1.0 - amount)
    }

    pub fn lighten(self, amount: f64) -> Color {
        self.blend(Color::WHITE, 1.0 - amount)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
