//! Colors, insets and per-state styles
//!
//! - [`colors`] - RGB565 constants and the dark / light palettes
//! - [`layout`] - Padding between a widget's bounds and its content
//! - [`style`] - Fill, text and outline of one visual state
//! - [`theme`] - Palette plus key gap, padding and corner radius

pub mod colors;
pub mod layout;
pub mod style;
pub mod theme;

pub use colors::{ColorPalette, WHITE};
pub use layout::Padding;
pub use style::Style;
pub use theme::Theme;
