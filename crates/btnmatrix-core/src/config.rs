//! Matrix configuration and its binary encoding.

extern crate alloc;
use alloc::vec::Vec;

use embassy_time::Duration;
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::ui::components::button_matrix::PressTiming;
use crate::ui::styling::Padding;

/// Default hold time before a press turns into a long press.
pub const DEFAULT_LONG_PRESS_MS: u32 = 400;

/// Default period between repeats while long-pressed.
pub const DEFAULT_REPEAT_MS: u32 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config encode failed")]
    Encode(postcard::Error),

    #[error("Config decode failed")]
    Decode(postcard::Error),
}

/// Tunables of a button matrix, independent of the map it shows.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixConfig {
    pub long_press_ms: u32,
    pub repeat_ms: u32,
    /// Gap between neighboring keys and between rows, in pixels
    pub inner_spacing: u32,
    /// Inset of the keys from the outer bounds
    pub padding: Padding,
    pub toggle: bool,
    pub recolor: bool,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            long_press_ms: DEFAULT_LONG_PRESS_MS,
            repeat_ms: DEFAULT_REPEAT_MS,
            inner_spacing: 0,
            padding: Padding::default(),
            toggle: false,
            recolor: false,
        }
    }
}

impl MatrixConfig {
    pub fn timing(&self) -> PressTiming {
        PressTiming {
            long_press: Duration::from_millis(u64::from(self.long_press_ms)),
            repeat: Duration::from_millis(u64::from(self.repeat_ms)),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(ConfigError::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        postcard::from_bytes(bytes).map_err(ConfigError::Decode)
    }
}
