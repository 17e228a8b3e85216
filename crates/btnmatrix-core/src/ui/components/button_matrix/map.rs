//! Map model: the borrowed key map plus the owned per-key control bits.
//!
//! A map is a slice of byte strings. `b"\n"` starts a new row, `b""` ends
//! the map (a slice without a terminator ends at its last entry), anything
//! else is a key label with an optional control prefix (see [`ctrl`]).
//!
//! Labels stay borrowed from the caller's slice. The control bits are
//! copied out at install time so later edits never touch the caller's data.
//!
//! [`ctrl`]: super::ctrl

extern crate alloc;
use alloc::vec::Vec;

use super::ctrl::ButtonCtrl;
use super::error::{MatrixError, MatrixResult};

/// Entry that starts a new row.
pub const ROW_BREAK: &[u8] = b"\n";

/// Entry that terminates the map.
pub const MAP_END: &[u8] = b"";

/// A map with no keys, installed on construction.
pub const EMPTY_MAP: &[&[u8]] = &[MAP_END];

/// Keys per map are limited so every index fits a `u16` with room to spare.
pub const MAX_BUTTONS: usize = u16::MAX as usize - 1;

/// One decoded map entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEntry {
    /// Key with its 0-based key index (row breaks are not counted)
    Button(u16),
    RowBreak,
}

/// Split an entry into its inline control bits (if any) and its label.
pub fn decode_entry(entry: &[u8]) -> Result<(Option<ButtonCtrl>, &str), core::str::Utf8Error> {
    let (ctrl, text) = match entry.split_first() {
        Some((&first, rest)) => match ButtonCtrl::from_prefix(first) {
            Some(ctrl) => (Some(ctrl), rest),
            None => (None, entry),
        },
        None => (None, entry),
    };
    core::str::from_utf8(text).map(|label| (ctrl, label))
}

/// The installed key map and its control bits.
#[derive(Debug, Clone)]
pub struct ButtonMap<'a> {
    entries: &'a [&'a [u8]],
    labels: Vec<&'a str>,
    ctrl_bits: Vec<ButtonCtrl>,
}

impl Default for ButtonMap<'_> {
    fn default() -> Self {
        Self {
            entries: EMPTY_MAP,
            labels: Vec::new(),
            ctrl_bits: Vec::new(),
        }
    }
}

impl<'a> ButtonMap<'a> {
    /// Validate `entries` and build the model.
    ///
    /// Control bits start from each key's inline prefix, or the defaults
    /// (width 1, no flags) when there is none.
    pub fn parse(entries: &'a [&'a [u8]]) -> MatrixResult<Self> {
        if entries.is_empty() {
            return Err(MatrixError::EmptyMap);
        }

        let mut labels = Vec::new();
        let mut ctrl_bits = Vec::new();

        for (index, &entry) in entries.iter().enumerate() {
            if entry == MAP_END {
                break;
            }
            if entry == ROW_BREAK {
                continue;
            }
            if labels.len() >= MAX_BUTTONS {
                return Err(MatrixError::TooManyButtons {
                    count: labels.len() + 1,
                });
            }

            let (ctrl, label) =
                decode_entry(entry).map_err(|_| MatrixError::InvalidLabel { index })?;
            labels.push(label);
            ctrl_bits.push(ctrl.unwrap_or_default());
        }

        Ok(Self {
            entries,
            labels,
            ctrl_bits,
        })
    }

    /// The caller's slice, exactly as installed.
    pub fn entries(&self) -> &'a [&'a [u8]] {
        self.entries
    }

    pub fn btn_count(&self) -> u16 {
        self.labels.len() as u16
    }

    /// Label of key `index` with any control prefix stripped.
    pub fn label(&self, index: u16) -> Option<&'a str> {
        self.labels.get(usize::from(index)).copied()
    }

    pub fn ctrl(&self, index: u16) -> Option<ButtonCtrl> {
        self.ctrl_bits.get(usize::from(index)).copied()
    }

    pub fn ctrl_bits(&self) -> &[ButtonCtrl] {
        &self.ctrl_bits
    }

    /// Walk the map in order up to its terminator.
    pub fn iter(&self) -> impl Iterator<Item = MapEntry> + '_ {
        let mut next_button = 0u16;
        self.entries
            .iter()
            .take_while(|entry| **entry != MAP_END)
            .map(move |entry| {
                if *entry == ROW_BREAK {
                    MapEntry::RowBreak
                } else {
                    let id = next_button;
                    next_button += 1;
                    MapEntry::Button(id)
                }
            })
    }

    /// Replace every key's control bits with a copy of `ctrl_map`.
    ///
    /// The slice must hold exactly one byte per key; anything else is
    /// rejected before a single entry is written.
    pub fn set_ctrl_map(&mut self, ctrl_map: &[u8]) -> MatrixResult<()> {
        if ctrl_map.len() != self.ctrl_bits.len() {
            return Err(MatrixError::CtrlMapLength {
                expected: self.ctrl_bits.len(),
                actual: ctrl_map.len(),
            });
        }

        for (slot, &bits) in self.ctrl_bits.iter_mut().zip(ctrl_map) {
            *slot = ButtonCtrl::from_bits(bits);
        }
        Ok(())
    }

    /// Apply `f` to key `index`, returning the bits before and after.
    pub fn update_ctrl(
        &mut self,
        index: u16,
        f: impl FnOnce(ButtonCtrl) -> ButtonCtrl,
    ) -> MatrixResult<(ButtonCtrl, ButtonCtrl)> {
        let count = self.btn_count();
        let slot = self
            .ctrl_bits
            .get_mut(usize::from(index))
            .ok_or(MatrixError::InvalidIndex { index, count })?;

        let old = *slot;
        *slot = f(old);
        Ok((old, *slot))
    }
}
