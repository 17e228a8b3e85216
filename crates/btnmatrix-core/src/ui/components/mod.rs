//! Widgets built on the [`core`](super::core) traits

pub mod button_matrix;

pub use button_matrix::{ActionResult, ButtonAction, ButtonMatrix, MatrixError, MatrixStyle};
