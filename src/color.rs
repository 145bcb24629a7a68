use std::ops::{ Add, Mul };

use serde::{ Serialize, Deserialize };

/// An 8-bit-per-channel RGB color.
///
/// Arithmetic saturates rather than wrapping: accumulating several light
/// contributions can only clip to white, never overflow back to black.
///
/// # Examples
///
/// ```
/// # use gridtrace::color::Color;
/// let c = Color::rgb(200, 100, 0);
/// assert_eq!(c + c, Color::rgb(255, 200, 0));
/// assert_eq!(c * 0.5, Color::rgb(100, 50, 0));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq,
    Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
pub const RED: Color = Color { r: 255, g: 0, b: 0 };
pub const GREEN: Color = Color { r: 0, g: 255, b: 0 };
pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };

/// Applied to primitives whose transform could not be inverted, so broken
/// scenes are visible at a glance instead of crashing the render.
pub const FALLBACK: Color = Color { r: 255, g: 0, b: 255 };

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    /// Scales each channel by `factor`, clamping to the valid range.
    pub fn scaled(&self, factor: f64) -> Color {
        Color {
            r: (self.r as f64 * factor).clamp(0.0, 255.0).round() as u8,
            g: (self.g as f64 * factor).clamp(0.0, 255.0).round() as u8,
            b: (self.b as f64 * factor).clamp(0.0, 255.0).round() as u8,
        }
    }

    /// Channel-wise product of two colors, treating 255 as unity.
    ///
    /// Used to tint a surface color with a light's color.
    pub fn blend(&self, other: &Color) -> Color {
        Color {
            r: ((self.r as u16 * other.r as u16) / 255) as u8,
            g: ((self.g as u16 * other.g as u16) / 255) as u8,
            b: ((self.b as u16 * other.b as u16) / 255) as u8,
        }
    }
}

/// Adds two colors channel-wise, saturating at white.
impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Color {
        Color {
            r: self.r.saturating_add(other.r),
            g: self.g.saturating_add(other.g),
            b: self.b.saturating_add(other.b),
        }
    }
}

/// Scales a color by a scalar; shorthand for `scaled`.
impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, other: f64) -> Color {
        self.scaled(other)
    }
}

/* Tests */

#[test]
fn add_colors_saturates() {
    let c1 = Color::rgb(200, 60, 10);
    let c2 = Color::rgb(100, 60, 10);

    assert_eq!(c1 + c2, Color::rgb(255, 120, 20));
}

#[test]
fn scale_color() {
    let c = Color::rgb(100, 200, 255);

    assert_eq!(c.scaled(0.5), Color::rgb(50, 100, 128));
    assert_eq!(c.scaled(2.0), Color::rgb(200, 255, 255));
    assert_eq!(c.scaled(-1.0), BLACK);
}

#[test]
fn blend_colors() {
    assert_eq!(WHITE.blend(&RED), RED);
    assert_eq!(BLACK.blend(&RED), BLACK);
    assert_eq!(Color::rgb(255, 128, 0).blend(&Color::rgb(128, 255, 255)),
        Color::rgb(128, 128, 0));
}
