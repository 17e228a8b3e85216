//! Insets between a widget's outer bounds and its content

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use serde::{Deserialize, Serialize};

/// Per-side inset in pixels.
///
/// The matrix reads it from its background style: keys are laid out in the
/// outer bounds shrunk by this much.
///
/// ```ignore
/// let p = Padding::symmetric(12, 16);
/// assert_eq!(p.horizontal(), 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Padding {
    pub fn all(value: u32) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn symmetric(vertical: u32, horizontal: u32) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    pub fn new(top: u32, right: u32, bottom: u32, left: u32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn horizontal(&self) -> u32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> u32 {
        self.top + self.bottom
    }

    /// Shrink `outer` by this padding. Collapses to zero size rather than
    /// going negative when the padding is larger than the rectangle.
    pub fn inset(&self, outer: Rectangle) -> Rectangle {
        Rectangle::new(
            outer.top_left + Point::new(self.left as i32, self.top as i32),
            Size::new(
                outer.size.width.saturating_sub(self.horizontal()),
                outer.size.height.saturating_sub(self.vertical()),
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inset_shrinks_each_side() {
        let outer = Rectangle::new(Point::new(10, 20), Size::new(100, 50));
        let inner = Padding::new(1, 2, 3, 4).inset(outer);

        assert_eq!(inner, Rectangle::new(Point::new(14, 21), Size::new(94, 46)));
    }

    #[test]
    fn test_oversized_padding_collapses() {
        let outer = Rectangle::new(Point::zero(), Size::new(10, 10));
        let inner = Padding::all(8).inset(outer);

        assert_eq!(inner.size, Size::zero());
    }
}
