//! Layout compiler: turns the map model into one rectangle per key.
//!
//! Rows split the content height evenly, but only rows with at least one
//! visible key take part; a row of hidden keys collapses to zero height.
//! Inside a row the visible keys share the width in proportion to their
//! relative widths, and the last visible key absorbs the rounding remainder
//! so the spans always end flush with the right edge. Hidden keys get a
//! zero-size rectangle, which never contains a point.

extern crate alloc;
use alloc::vec::Vec;

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use super::map::{ButtonMap, MapEntry};

/// Vertical placement of one row and the keys it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowGeometry {
    /// Index of the first key in the row
    pub first: u16,
    /// Number of keys in the row
    pub len: u16,
    pub y: i32,
    pub height: u32,
    /// Whether any key of the row was visible when the row was placed
    pub visible: bool,
}

impl RowGeometry {
    fn contains(&self, index: u16) -> bool {
        index >= self.first && index - self.first < self.len
    }

    fn range(&self) -> core::ops::Range<usize> {
        usize::from(self.first)..usize::from(self.first) + usize::from(self.len)
    }
}

/// Compiled geometry for the installed map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatrixLayout {
    content: Rectangle,
    spacing: u32,
    rows: Vec<RowGeometry>,
    areas: Vec<Rectangle>,
}

impl MatrixLayout {
    /// Lay out every key of `map` inside `content`, with `spacing` pixels
    /// between neighboring keys and between rows.
    pub fn compile(map: &ButtonMap<'_>, content: Rectangle, spacing: u32) -> Self {
        let mut layout = Self {
            content,
            spacing,
            rows: partition_rows(map),
            areas: alloc::vec![Rectangle::zero(); usize::from(map.btn_count())],
        };

        let visible_rows = layout
            .rows
            .iter()
            .filter(|row| row_has_visible(map, row))
            .count() as u32;

        let avail_height = content
            .size
            .height
            .saturating_sub(spacing * visible_rows.saturating_sub(1));
        let row_height = if visible_rows > 0 {
            avail_height / visible_rows
        } else {
            0
        };

        let mut y = content.top_left.y;
        let mut placed = 0u32;

        for i in 0..layout.rows.len() {
            let visible = row_has_visible(map, &layout.rows[i]);
            let height = if !visible {
                0
            } else if placed + 1 == visible_rows {
                // Last visible row takes whatever rounding left over
                avail_height - row_height * placed
            } else {
                row_height
            };

            let row = &mut layout.rows[i];
            row.y = y;
            row.height = height;
            row.visible = visible;

            if visible {
                placed += 1;
                y += (height + spacing) as i32;
            }

            let row = *row;
            layout.distribute_row(map, row);
        }

        log::debug!(
            "Compiled {} buttons in {} rows ({} visible)",
            layout.areas.len(),
            layout.rows.len(),
            visible_rows
        );

        layout
    }

    /// Re-spread the keys of one row after a visibility change.
    ///
    /// Reuses the row's vertical placement. Returns `false` without touching
    /// anything when the row gained its first visible key or lost its last
    /// one: the row count changed and only a full compile can place it.
    pub fn patch_row(&mut self, map: &ButtonMap<'_>, row_index: usize) -> bool {
        let Some(&row) = self.rows.get(row_index) else {
            return false;
        };

        if row_has_visible(map, &row) != row.visible {
            return false;
        }

        self.distribute_row(map, row);
        true
    }

    pub fn areas(&self) -> &[Rectangle] {
        &self.areas
    }

    pub fn area(&self, index: u16) -> Option<Rectangle> {
        self.areas.get(usize::from(index)).copied()
    }

    pub fn rows(&self) -> &[RowGeometry] {
        &self.rows
    }

    /// Row holding key `index`.
    pub fn row_of(&self, index: u16) -> Option<usize> {
        self.rows.iter().position(|row| row.contains(index))
    }

    /// First key under `point` that can take a press.
    pub fn hit_test(&self, map: &ButtonMap<'_>, point: Point) -> Option<u16> {
        self.areas
            .iter()
            .zip(map.ctrl_bits())
            .position(|(area, ctrl)| ctrl.is_pressable() && area.contains(point))
            .map(|index| index as u16)
    }

    fn distribute_row(&mut self, map: &ButtonMap<'_>, row: RowGeometry) {
        let ctrl = &map.ctrl_bits()[row.range()];
        let origin = Point::new(self.content.top_left.x, row.y);

        let visible = ctrl.iter().filter(|c| !c.is_hidden()).count() as u32;
        let total_weight: u32 = ctrl
            .iter()
            .filter(|c| !c.is_hidden())
            .map(|c| u32::from(c.width()))
            .sum();

        if visible == 0 || total_weight == 0 {
            for area in &mut self.areas[row.range()] {
                *area = Rectangle::new(origin, Size::zero());
            }
            return;
        }

        let avail_width = self
            .content
            .size
            .width
            .saturating_sub(self.spacing * (visible - 1));

        let mut x = origin.x;
        let mut used = 0u32;
        let mut seen = 0u32;

        for (area, c) in self.areas[row.range()].iter_mut().zip(ctrl) {
            if c.is_hidden() {
                *area = Rectangle::new(Point::new(x, row.y), Size::zero());
                continue;
            }

            seen += 1;
            let width = if seen == visible {
                avail_width - used
            } else {
                (u64::from(avail_width) * u64::from(c.width()) / u64::from(total_weight)) as u32
            };

            *area = Rectangle::new(Point::new(x, row.y), Size::new(width, row.height));
            used += width;
            x += (width + self.spacing) as i32;
        }
    }
}

/// Group key indices into rows. Rows without keys are dropped; they would
/// take no space anyway.
fn partition_rows(map: &ButtonMap<'_>) -> Vec<RowGeometry> {
    let mut rows = Vec::new();
    let mut current = RowGeometry {
        first: 0,
        len: 0,
        y: 0,
        height: 0,
        visible: false,
    };

    for entry in map.iter() {
        match entry {
            MapEntry::Button(id) => {
                if current.len == 0 {
                    current.first = id;
                }
                current.len += 1;
            }
            MapEntry::RowBreak => {
                if current.len > 0 {
                    rows.push(current);
                }
                current.len = 0;
            }
        }
    }
    if current.len > 0 {
        rows.push(current);
    }

    rows
}

fn row_has_visible(map: &ButtonMap<'_>, row: &RowGeometry) -> bool {
    map.ctrl_bits()[row.range()].iter().any(|c| !c.is_hidden())
}
