//! RGBA colors for debug shapes.
//!
//! ```
//! use testbed_draw::color::Color;
//!
//! assert_eq!(Color::rgb(0.8, 0.4, 0.2).fill().to_array(), [0.4, 0.2, 0.1, 0.5]);
//! ```

use serde::{Deserialize, Serialize};

/// Straight-alpha RGBA color, each channel in `0.0..=1.0`.
///
/// No premultiplication is implied. Callers pick alpha; solid shapes use
/// [`fill`](Self::fill) for their interior.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color.
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Opaque color from 8-bit channels.
    #[inline]
    pub fn from_rgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Interior color for solid shapes: half the RGB, alpha fixed at 0.5.
    #[inline]
    pub fn fill(self) -> Self {
        Self::new(0.5 * self.r, 0.5 * self.g, 0.5 * self.b, 0.5)
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Color> for [f32; 4] {
    #[inline]
    fn from(c: Color) -> Self {
        c.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_halves_rgb_and_fixes_alpha() {
        let fill = Color::new(0.8, 0.4, 1.0, 1.0).fill();
        assert_eq!(fill, Color::new(0.4, 0.2, 0.5, 0.5));
    }

    #[test]
    fn fill_ignores_input_alpha() {
        assert_eq!(Color::new(1.0, 1.0, 1.0, 0.1).fill().a, 0.5);
    }

    #[test]
    fn from_rgb_u8_scales_channels() {
        let c = Color::from_rgb_u8(255, 0, 51);
        assert_eq!(c.to_array(), [1.0, 0.0, 0.2, 1.0]);
    }
}
