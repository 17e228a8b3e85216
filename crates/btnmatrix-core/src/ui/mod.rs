//! UI layer: touch and drawing traits, styling, and the button matrix.
//!
//! - [`core`] - Touch events and the `Drawable` / `Touchable` traits
//! - [`styling`] - Colors, spacing and per-state styles
//! - [`components`] - The button matrix widget

pub mod components;
pub mod core;
pub mod styling;

pub use components::{ActionResult, ButtonMatrix, MatrixError, MatrixStyle};
pub use core::{DirtyRegion, Drawable, TouchEvent, TouchPoint, TouchResult, Touchable};
