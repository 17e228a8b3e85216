//! Per-key control bits and the inline control byte codec.
//!
//! A key's flags can arrive two ways: as an optional first byte of its map
//! entry, or through a control map with one byte per key. Both share the
//! same low six bits:
//!
//! | bit | meaning                          |
//! |-----|----------------------------------|
//! | 7-6 | `10` marker (inline byte only)   |
//! | 5   | inactive (disabled)              |
//! | 4   | no repeat on long press          |
//! | 3   | hidden                           |
//! | 2-0 | relative width, 1..=7            |

use serde::{Deserialize, Serialize};

/// Marker the inline control byte must carry in its top two bits.
pub const CTRL_CODE: u8 = 0x80;
/// Mask selecting the marker bits.
pub const CTRL_MASK: u8 = 0xC0;
pub const WIDTH_MASK: u8 = 0x07;
pub const HIDDEN_MASK: u8 = 0x08;
pub const NO_REPEAT_MASK: u8 = 0x10;
pub const INACTIVE_MASK: u8 = 0x20;

/// Widest relative width a key may declare.
pub const MAX_WIDTH: u8 = 7;

/// Control bits of one key, without the inline marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ButtonCtrl(u8);

impl ButtonCtrl {
    /// Wrap a control-map byte. Bits above the field range are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & !CTRL_MASK)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Decode the first byte of a map entry.
    ///
    /// Returns `None` when the byte does not carry the `10xxxxxx` marker,
    /// meaning the entry has no control prefix.
    pub const fn from_prefix(byte: u8) -> Option<Self> {
        if byte & CTRL_MASK == CTRL_CODE {
            Some(Self::from_bits(byte))
        } else {
            None
        }
    }

    /// Encode as an inline map prefix.
    pub const fn to_prefix(self) -> u8 {
        CTRL_CODE | self.0
    }

    /// Relative width. A zero width field reads as 1.
    pub const fn width(self) -> u8 {
        match self.0 & WIDTH_MASK {
            0 => 1,
            w => w,
        }
    }

    pub const fn is_hidden(self) -> bool {
        self.0 & HIDDEN_MASK != 0
    }

    pub const fn is_inactive(self) -> bool {
        self.0 & INACTIVE_MASK != 0
    }

    pub const fn is_no_repeat(self) -> bool {
        self.0 & NO_REPEAT_MASK != 0
    }

    /// Hidden or inactive keys never take a press.
    pub const fn is_pressable(self) -> bool {
        !self.is_hidden() && !self.is_inactive()
    }

    /// Set the width field. Values outside `1..=7` are the caller's problem;
    /// only the low three bits are kept.
    pub const fn with_width(self, width: u8) -> Self {
        Self((self.0 & !WIDTH_MASK) | (width & WIDTH_MASK))
    }

    pub const fn with_hidden(self, hidden: bool) -> Self {
        self.with_flag(HIDDEN_MASK, hidden)
    }

    pub const fn with_inactive(self, inactive: bool) -> Self {
        self.with_flag(INACTIVE_MASK, inactive)
    }

    pub const fn with_no_repeat(self, no_repeat: bool) -> Self {
        self.with_flag(NO_REPEAT_MASK, no_repeat)
    }

    const fn with_flag(self, mask: u8, on: bool) -> Self {
        if on {
            Self(self.0 | mask)
        } else {
            Self(self.0 & !mask)
        }
    }
}
