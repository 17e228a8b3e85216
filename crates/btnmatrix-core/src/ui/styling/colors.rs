//! RGB565 colors and the palettes the matrix styles are derived from
//!
//! RGB565 packs red and blue into 5 bits and green into 6, so an 8-bit
//! channel converts as R>>3, G>>2, B>>3.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::RgbColor;

/// Very dark gray-blue
pub const COLOR_BACKGROUND: Rgb565 = Rgb565::new(18 >> 3, 23 >> 2, 24 >> 3);

/// Slightly lighter than the background
pub const COLOR_SURFACE: Rgb565 = Rgb565::new(38 >> 3, 46 >> 2, 48 >> 3);

/// Medium gray outline
pub const COLOR_STROKE: Rgb565 = Rgb565::new(43 >> 3, 55 >> 2, 57 >> 3);

/// Bright teal-green
pub const COLOR_ACCENT: Rgb565 = Rgb565::new(95 >> 3, 185 >> 2, 141 >> 3);

pub const WHITE: Rgb565 = Rgb565::new(31, 63, 31);
pub const LIGHT_GRAY: Rgb565 = Rgb565::new(21, 42, 21);
pub const DARK_GRAY: Rgb565 = Rgb565::new(10, 20, 10);

/// One shade darker, saturating at black.
pub fn darken(color: Rgb565) -> Rgb565 {
    Rgb565::new(
        color.r().saturating_sub(4),
        color.g().saturating_sub(8),
        color.b().saturating_sub(4),
    )
}

/// Convert a packed `0xRRGGBB` value to RGB565.
pub fn from_rgb888(rgb: u32) -> Rgb565 {
    let r = ((rgb >> 16) & 0xFF) as u8;
    let g = ((rgb >> 8) & 0xFF) as u8;
    let b = (rgb & 0xFF) as u8;
    Rgb565::new(r >> 3, g >> 2, b >> 3)
}

/// Colors a matrix is painted with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorPalette {
    /// Behind the keys, and the fill of inactive keys
    pub background: Rgb565,
    /// Fill of a released key
    pub key: Rgb565,
    /// Fill of the toggled key
    pub accent: Rgb565,
    pub label: Rgb565,
    /// Label of an inactive key
    pub label_dim: Rgb565,
    pub outline: Rgb565,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::dark()
    }
}

impl ColorPalette {
    pub fn dark() -> Self {
        Self {
            background: COLOR_BACKGROUND,
            key: COLOR_SURFACE,
            accent: COLOR_ACCENT,
            label: WHITE,
            label_dim: LIGHT_GRAY,
            outline: COLOR_STROKE,
        }
    }

    pub fn light() -> Self {
        Self {
            background: WHITE,
            key: LIGHT_GRAY,
            accent: COLOR_ACCENT,
            label: COLOR_BACKGROUND,
            label_dim: DARK_GRAY,
            outline: COLOR_STROKE,
        }
    }
}
