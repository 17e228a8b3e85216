//! The `Style` value a matrix keeps per state

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::primitives::{PrimitiveStyle, PrimitiveStyleBuilder};

use super::colors::{WHITE, darken};
use super::layout::Padding;

/// Fill, text and outline of one visual state.
///
/// `None` colors are not painted, so a style with neither background nor
/// border leaves whatever is underneath visible.
///
/// ```ignore
/// let released = Style::new()
///     .with_background(COLOR_SURFACE)
///     .with_border(COLOR_STROKE, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub background_color: Option<Rgb565>,
    /// Label color; white when unset
    pub foreground_color: Option<Rgb565>,
    pub border_color: Option<Rgb565>,
    /// Outline thickness; 0 disables the outline
    pub border_width: u32,
    /// Only read from the background slot, where it insets the keys
    pub padding: Padding,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background_color: None,
            foreground_color: Some(WHITE),
            border_color: None,
            border_width: 0,
            padding: Padding::default(),
        }
    }
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(mut self, color: Rgb565) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_foreground(mut self, color: Rgb565) -> Self {
        self.foreground_color = Some(color);
        self
    }

    pub fn with_border(mut self, color: Rgb565, width: u32) -> Self {
        self.border_color = Some(color);
        self.border_width = width;
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// The same style one shade darker, for the held-down look.
    ///
    /// `fallback` is darkened instead when there is no background.
    pub fn pressed(self, fallback: Rgb565) -> Self {
        let bg = self.background_color.unwrap_or(fallback);
        self.with_background(darken(bg))
    }

    pub fn to_primitive_style(&self) -> PrimitiveStyle<Rgb565> {
        let mut builder = PrimitiveStyleBuilder::new();

        if let Some(bg) = self.background_color {
            builder = builder.fill_color(bg);
        }

        if let Some(border) = self.border_color
            && self.border_width > 0
        {
            builder = builder.stroke_color(border).stroke_width(self.border_width);
        }

        builder.build()
    }
}
