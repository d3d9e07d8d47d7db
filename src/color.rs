use anyhow::{bail, Result};
use palette::{FromColor, Hsl, IntoColor, Lab, Srgb, Xyz};
use serde::{Deserialize, Serialize};

/// Core color type used throughout the pipeline.
/// Wraps opaque sRGB u8 components and provides conversions to the HSL, CIELAB and
/// CIEXYZ spaces plus WCAG luminance metrics.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string like `#ff8800` or `#FF8800`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 {
            bail!(
                "invalid hex color: expected 6 hex digits, got {}",
                hex.len()
            );
        }
        let r = u8::from_str_radix(&hex[0..2], 16)?;
        let g = u8::from_str_radix(&hex[2..4], 16)?;
        let b = u8::from_str_radix(&hex[4..6], 16)?;
        Ok(Self { r, g, b })
    }

    /// Serialize to lowercase hex `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Convert to `palette::Srgb<u8>`.
    pub fn to_srgb_u8(self) -> Srgb<u8> {
        Srgb::new(self.r, self.g, self.b)
    }

    fn to_srgb_f32(self) -> Srgb<f32> {
        self.to_srgb_u8().into_format()
    }

    /// Convert to CIELAB (D65), used for perceptual distance.
    pub fn to_lab(self) -> Lab {
        self.to_srgb_f32().into_color()
    }

    /// Convert to CIEXYZ (D65).
    pub fn to_xyz(self) -> Xyz {
        self.to_srgb_f32().into_color()
    }

    /// Convert to HSL. Hue of an achromatic color is reported as 0.
    pub fn to_hsl(self) -> Hsl {
        Hsl::from_color(self.to_srgb_f32())
    }

    /// Create from HSL with hue in degrees and saturation/lightness in [0, 1].
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let hsl: Hsl = Hsl::new(hue, saturation, lightness);
        Self::from_srgb_f32_clamped(Srgb::from_color(hsl))
    }

    /// Create from CIELAB.
    pub fn from_lab(lab: Lab) -> Self {
        Self::from_srgb_f32_clamped(Srgb::from_color(lab))
    }

    /// Clamp an Srgb<f32> to [0, 1] and convert to Color.
    fn from_srgb_f32_clamped(srgb: Srgb<f32>) -> Self {
        let r = (srgb.red.clamp(0.0, 1.0) * 255.0).round() as u8;
        let g = (srgb.green.clamp(0.0, 1.0) * 255.0).round() as u8;
        let b = (srgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { r, g, b }
    }

    /// HSL hue in degrees, in [0, 360).
    pub fn hue(self) -> f32 {
        let hue = self.to_hsl().hue.into_positive_degrees();
        if hue >= 360.0 {
            0.0
        } else {
            hue
        }
    }

    /// HSL saturation in [0, 1].
    pub fn saturation(self) -> f32 {
        self.to_hsl().saturation.clamp(0.0, 1.0)
    }

    /// HSL lightness in [0, 1].
    pub fn lightness(self) -> f32 {
        self.to_hsl().lightness.clamp(0.0, 1.0)
    }

    /// Euclidean distance in CIELAB space (CIE76 ΔE).
    pub fn lab_distance(self, other: Color) -> f32 {
        lab_distance(&self.to_lab(), &other.to_lab())
    }

    /// WCAG 2.0 relative luminance.
    ///
    /// Linearizes each sRGB channel, then computes the weighted sum.
    pub fn relative_luminance(self) -> f32 {
        fn linearize(c: u8) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        let r = linearize(self.r);
        let g = linearize(self.g);
        let b = linearize(self.b);
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }

    /// WCAG 2.0 contrast ratio between two colors.
    ///
    /// Returns a value in [1, 21]. Higher means more contrast.
    pub fn contrast_ratio(c1: &Color, c2: &Color) -> f32 {
        let l1 = c1.relative_luminance();
        let l2 = c2.relative_luminance();
        let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
        (lighter + 0.05) / (darker + 0.05)
    }
}

/// Euclidean distance between two precomputed LAB values.
pub fn lab_distance(a: &Lab, b: &Lab) -> f32 {
    ((a.l - b.l).powi(2) + (a.a - b.a).powi(2) + (a.b - b.b).powi(2)).sqrt()
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}
