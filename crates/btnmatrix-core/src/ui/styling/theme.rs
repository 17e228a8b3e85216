//! Theme: palette plus the metrics a matrix is laid out with

use super::colors::ColorPalette;

/// Everything [`ButtonMatrix::with_theme`] needs in one value.
///
/// ```ignore
/// let keypad = ButtonMatrix::new(bounds).with_theme(&Theme::light());
/// ```
///
/// [`ButtonMatrix::with_theme`]: crate::ui::components::button_matrix::ButtonMatrix::with_theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub palette: ColorPalette,
    /// Gap between keys and between rows (px)
    pub key_gap: u32,
    /// Inset of the keys from the matrix edge on every side (px)
    pub padding: u32,
    pub corner_radius: u32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            palette: ColorPalette::dark(),
            key_gap: 4,
            padding: 8,
            corner_radius: 4,
        }
    }

    pub fn light() -> Self {
        Self {
            palette: ColorPalette::light(),
            ..Self::dark()
        }
    }

    /// Edge-to-edge keys with square corners, for tiny displays.
    pub fn compact(palette: ColorPalette) -> Self {
        Self {
            palette,
            key_gap: 1,
            padding: 0,
            corner_radius: 0,
        }
    }
}
