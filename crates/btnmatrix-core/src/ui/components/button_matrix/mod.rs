// src/ui/components/button_matrix/mod.rs
//! Button matrix: a grid of keys compiled from a compact textual map.
//!
//! The map is a slice of byte strings, one per key, with `b"\n"` starting a
//! new row and `b""` ending the map. A key may carry a control prefix byte
//! (`0b10xxxxxx`) declaring its relative width and whether it starts
//! hidden, inactive, or without long-press repeat.
//!
//! ```ignore
//! const KEYPAD: &[&[u8]] = &[
//!     b"1", b"2", b"3", b"\n",
//!     b"4", b"5", b"6", b"\n",
//!     b"\x82Enter", b"\x880", b"",
//! ];
//!
//! let mut keypad = ButtonMatrix::new(bounds).with_config(config);
//! keypad.set_map(KEYPAD)?;
//! keypad.set_action(|_, label| {
//!     info!("key {label}");
//!     ActionResult::Ok
//! });
//! ```
//!
//! # Touch Behavior
//! - A press lands on the first visible, enabled key under the point
//! - Dragging away keeps the press but drops the pressed look
//! - Releasing over the pressed key runs the action with its label and,
//!   with toggling on, makes it the single toggled key
//! - Holding past the long-press time repeats the action every repeat
//!   period, unless the key has repeat disabled
//!
//! Frame time reaches the widget through [`ButtonMatrix::update`], which
//! the owner calls once per frame before dispatching touch events.

extern crate alloc;
use alloc::boxed::Box;

use embassy_time::Instant;
use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Rectangle, RoundedRectangle};
use log::{debug, warn};

use crate::config::MatrixConfig;
use crate::ui::core::{DirtyRegion, Drawable, TouchEvent, TouchPoint, TouchResult, Touchable};
use crate::ui::styling::{Padding, Style, Theme};

mod ctrl;
mod draw;
mod error;
mod layout;
mod map;
mod state;

pub use ctrl::{ButtonCtrl, MAX_WIDTH};
pub use draw::{ColorRun, MatrixStyle, MatrixStyles, recolor_runs};
pub use error::{MatrixError, MatrixResult};
pub use layout::{MatrixLayout, RowGeometry};
pub use map::{ButtonMap, EMPTY_MAP, MAP_END, MapEntry, ROW_BREAK, decode_entry};
pub use state::{PressState, PressTiming};

use state::{Interaction, Tick};

/// What an action callback reports back to the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionResult {
    /// The matrix is still the one that fired; finish the release
    Ok,
    /// The owner tore the matrix down or rebuilt it from inside the
    /// callback; the matrix must not write anything else for this event
    Invalidated,
}

/// Callback run when a key is released, or repeatedly while long-pressed.
///
/// Receives the matrix and the key's label without its control prefix.
pub type ButtonAction<'a> = Box<dyn FnMut(&mut ButtonMatrix<'a>, &str) -> ActionResult + 'a>;

/// A grid of keys laid out from a borrowed map.
///
/// `'a` is the lifetime of the installed map: the matrix keeps a reference
/// to it, so the caller's slice must outlive the install.
pub struct ButtonMatrix<'a> {
    bounds: Rectangle,
    map: ButtonMap<'a>,
    layout: MatrixLayout,
    interaction: Interaction,
    action: Option<ButtonAction<'a>>,
    styles: MatrixStyles,
    spacing: u32,
    border_radius: u32,
    recolor: bool,
    timing: PressTiming,
    now: Instant,
    dirty: Option<DirtyRegion>,
}

impl<'a> ButtonMatrix<'a> {
    /// Create an empty matrix filling `bounds`.
    ///
    /// Uses [`MatrixConfig::default`] and styles from the default palette.
    pub fn new(bounds: Rectangle) -> Self {
        let config = MatrixConfig::default();
        let mut styles = MatrixStyles::default();
        let bg = styles.get(MatrixStyle::Bg).with_padding(config.padding);
        styles.set(MatrixStyle::Bg, bg);

        let mut matrix = Self {
            bounds,
            map: ButtonMap::default(),
            layout: MatrixLayout::default(),
            interaction: Interaction::default(),
            action: None,
            styles,
            spacing: config.inner_spacing,
            border_radius: 0,
            recolor: config.recolor,
            timing: config.timing(),
            now: Instant::from_ticks(0),
            dirty: None,
        };
        matrix.relayout();
        matrix
    }

    /// A new matrix at `bounds` built like `other`.
    ///
    /// Takes the map, control bits, styles, timing, key gap, corner radius,
    /// recolor and toggle mode. The action, the pressed key and the toggled
    /// key are not carried over.
    pub fn copy_of(other: &ButtonMatrix<'a>, bounds: Rectangle) -> Self {
        let mut interaction = Interaction::default();
        interaction.set_toggle(other.toggle_enabled(), None);

        let mut matrix = Self {
            bounds,
            map: other.map.clone(),
            layout: MatrixLayout::default(),
            interaction,
            action: None,
            styles: other.styles,
            spacing: other.spacing,
            border_radius: other.border_radius,
            recolor: other.recolor,
            timing: other.timing,
            now: other.now,
            dirty: None,
        };
        matrix.relayout();
        matrix
    }

    /// Apply timing, spacing, padding, toggle and recolor settings.
    pub fn with_config(mut self, config: MatrixConfig) -> Self {
        self.timing = config.timing();
        self.spacing = config.inner_spacing;
        self.recolor = config.recolor;
        self.interaction.set_toggle(config.toggle, None);

        let bg = self.styles.get(MatrixStyle::Bg).with_padding(config.padding);
        self.styles.set(MatrixStyle::Bg, bg);
        self.relayout();
        self
    }

    /// Take styles, key gap, padding and corner radius from a theme.
    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.styles = MatrixStyles::from_palette(&theme.palette);
        let bg = self
            .styles
            .get(MatrixStyle::Bg)
            .with_padding(Padding::all(theme.padding));
        self.styles.set(MatrixStyle::Bg, bg);

        self.spacing = theme.key_gap;
        self.border_radius = theme.corner_radius;
        self.relayout();
        self
    }

    /// Replace all six styles at once.
    pub fn with_styles(mut self, styles: MatrixStyles) -> Self {
        self.styles = styles;
        self.relayout();
        self
    }

    /// Set the corner radius of the keys and the background.
    pub fn with_border_radius(mut self, radius: u32) -> Self {
        self.border_radius = radius;
        self.mark_dirty();
        self
    }

    // ------------------------------------------------------------------
    // Map model
    // ------------------------------------------------------------------

    /// Install a new map and rebuild every key.
    ///
    /// Control bits are reset from the map's inline prefixes. A stored
    /// pressed or toggled index that the new map no longer has is dropped.
    /// On error the previous map stays installed untouched.
    pub fn set_map(&mut self, entries: &'a [&'a [u8]]) -> MatrixResult<()> {
        let map = ButtonMap::parse(entries).inspect_err(|e| warn!("Map rejected: {}", e))?;

        self.map = map;
        self.relayout();
        self.interaction.validate(self.map.btn_count());
        self.drop_unpressable_press();
        debug!("Installed map with {} buttons", self.map.btn_count());
        Ok(())
    }

    /// Overwrite every key's control bits with a copy of `ctrl_map`.
    ///
    /// `ctrl_map` holds one byte per key, row breaks excluded.
    pub fn set_ctrl_map(&mut self, ctrl_map: &[u8]) -> MatrixResult<()> {
        self.map
            .set_ctrl_map(ctrl_map)
            .inspect_err(|e| warn!("Control map rejected: {}", e))?;

        self.drop_unpressable_press();
        self.relayout();
        Ok(())
    }

    pub fn set_btn_hidden(&mut self, index: u16, hidden: bool) -> MatrixResult<()> {
        self.apply_ctrl(index, |c| c.with_hidden(hidden))
    }

    pub fn set_btn_disabled(&mut self, index: u16, disabled: bool) -> MatrixResult<()> {
        self.apply_ctrl(index, |c| c.with_inactive(disabled))
    }

    pub fn set_btn_disable_repeat(&mut self, index: u16, disabled: bool) -> MatrixResult<()> {
        self.apply_ctrl(index, |c| c.with_no_repeat(disabled))
    }

    /// Set hidden, disabled and no-repeat of one key in one go.
    pub fn set_btn_flags(
        &mut self,
        index: u16,
        hidden: bool,
        disabled: bool,
        disable_repeat: bool,
    ) -> MatrixResult<()> {
        self.apply_ctrl(index, |c| {
            c.with_hidden(hidden)
                .with_inactive(disabled)
                .with_no_repeat(disable_repeat)
        })
    }

    /// Change one key's relative width (`1..=7`).
    ///
    /// This rebuilds the whole matrix. Prefer declaring initial widths in
    /// the map prefixes or with [`set_ctrl_map`](Self::set_ctrl_map).
    pub fn set_btn_width(&mut self, index: u16, width: u8) -> MatrixResult<()> {
        if !(1..=MAX_WIDTH).contains(&width) {
            warn!("Width {} rejected for button {}", width, index);
            return Err(MatrixError::InvalidWidth { width });
        }

        self.map
            .update_ctrl(index, |c| c.with_width(width))
            .inspect_err(|e| warn!("Width change rejected: {}", e))?;
        self.relayout();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Interaction state
    // ------------------------------------------------------------------

    /// Install the action run on release and long-press repeat.
    pub fn set_action<F>(&mut self, action: F)
    where
        F: FnMut(&mut ButtonMatrix<'a>, &str) -> ActionResult + 'a,
    {
        self.action = Some(Box::new(action));
    }

    pub fn clear_action(&mut self) {
        self.action = None;
    }

    /// Highlight a key as pressed (`None` releases it) without firing.
    pub fn set_pressed(&mut self, id: Option<u16>) -> MatrixResult<()> {
        if let Some(id) = id {
            self.check_index(id)?;
        }

        if let Some(old) = self.interaction.pressed() {
            self.invalidate_button(old);
        }
        self.interaction.set_pressed(id, self.now);
        if let Some(id) = id {
            self.invalidate_button(id);
        }
        Ok(())
    }

    /// Enable or disable toggling and pick the toggled key.
    ///
    /// `id` is ignored when `enabled` is false.
    pub fn set_toggle(&mut self, enabled: bool, id: Option<u16>) -> MatrixResult<()> {
        if enabled && let Some(id) = id {
            self.check_index(id)?;
        }

        if let Some(old) = self.interaction.toggled() {
            self.invalidate_button(old);
        }
        self.interaction.set_toggle(enabled, id);
        if let Some(id) = self.interaction.toggled() {
            self.invalidate_button(id);
        }
        Ok(())
    }

    pub fn set_style(&mut self, kind: MatrixStyle, style: Style) {
        self.styles.set(kind, style);
        if kind == MatrixStyle::Bg {
            // Padding may have moved the content area
            self.relayout();
        } else {
            self.mark_dirty();
        }
    }

    pub fn set_recolor(&mut self, enabled: bool) {
        if self.recolor != enabled {
            self.recolor = enabled;
            self.mark_dirty();
        }
    }

    /// Move or resize the matrix; every key is laid out again.
    pub fn set_bounds(&mut self, bounds: Rectangle) {
        if self.bounds != bounds {
            self.bounds = bounds;
            self.relayout();
        }
    }

    /// Advance the frame clock and run long-press handling.
    ///
    /// Presses are stamped with the time of the latest call.
    pub fn update(&mut self, now: Instant) -> TouchResult {
        self.now = now;

        let Some(id) = self.interaction.pressed() else {
            return TouchResult::NotHandled;
        };
        let ctrl = self.ctrl_or_default(id);
        if !ctrl.is_pressable() {
            return TouchResult::NotHandled;
        }

        match self.interaction.tick(now, self.timing, ctrl.is_no_repeat()) {
            Tick::Nothing => TouchResult::NotHandled,
            Tick::EnteredLongPress(id) => {
                debug!("Button {} long pressed", id);
                TouchResult::Handled
            }
            Tick::Repeat(id) => {
                if self.fire(id) == ActionResult::Invalidated {
                    return TouchResult::Invalidated;
                }
                self.interaction.repeated(now);
                TouchResult::Handled
            }
        }
    }

    // ------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------

    /// The installed map, as handed to [`set_map`](Self::set_map).
    pub fn map(&self) -> &'a [&'a [u8]] {
        self.map.entries()
    }

    pub fn action(&self) -> Option<&ButtonAction<'a>> {
        self.action.as_ref()
    }

    pub fn pressed(&self) -> Option<u16> {
        self.interaction.pressed()
    }

    pub fn toggled(&self) -> Option<u16> {
        self.interaction.toggled()
    }

    pub fn toggle_enabled(&self) -> bool {
        self.interaction.toggle_enabled()
    }

    pub fn press_state(&self) -> PressState {
        self.interaction.state()
    }

    pub fn style(&self, kind: MatrixStyle) -> &Style {
        self.styles.get(kind)
    }

    pub fn recolor(&self) -> bool {
        self.recolor
    }

    pub fn btn_count(&self) -> u16 {
        self.map.btn_count()
    }

    pub fn label(&self, index: u16) -> Option<&'a str> {
        self.map.label(index)
    }

    pub fn ctrl(&self, index: u16) -> Option<ButtonCtrl> {
        self.map.ctrl(index)
    }

    pub fn ctrl_bits(&self) -> &[ButtonCtrl] {
        self.map.ctrl_bits()
    }

    pub fn button_area(&self, index: u16) -> Option<Rectangle> {
        self.layout.area(index)
    }

    pub fn button_areas(&self) -> &[Rectangle] {
        self.layout.areas()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn content_area(&self) -> Rectangle {
        self.styles.get(MatrixStyle::Bg).padding.inset(self.bounds)
    }

    fn relayout(&mut self) {
        self.layout = MatrixLayout::compile(&self.map, self.content_area(), self.spacing);
        self.mark_dirty();
    }

    fn check_index(&self, index: u16) -> MatrixResult<()> {
        let count = self.btn_count();
        if index < count {
            Ok(())
        } else {
            warn!("Button index {} out of range ({})", index, count);
            Err(MatrixError::InvalidIndex { index, count })
        }
    }

    /// Forget a press whose key became hidden or inactive.
    fn drop_unpressable_press(&mut self) {
        if let Some(id) = self.interaction.pressed()
            && !self.ctrl_or_default(id).is_pressable()
        {
            debug!("Press on button {} cancelled", id);
            self.interaction.cancel();
        }
    }

    fn ctrl_or_default(&self, index: u16) -> ButtonCtrl {
        self.map.ctrl(index).unwrap_or_default()
    }

    /// Patch one key's control bits and refresh only what they affect.
    fn apply_ctrl(
        &mut self,
        index: u16,
        f: impl FnOnce(ButtonCtrl) -> ButtonCtrl,
    ) -> MatrixResult<()> {
        let (old, new) = self
            .map
            .update_ctrl(index, f)
            .inspect_err(|e| warn!("Button flag change rejected: {}", e))?;

        if self.interaction.pressed() == Some(index) && !new.is_pressable() {
            self.interaction.cancel();
        }

        if old.is_hidden() == new.is_hidden() {
            self.invalidate_button(index);
            return Ok(());
        }

        let patched = self
            .layout
            .row_of(index)
            .is_some_and(|row| self.layout.patch_row(&self.map, row));

        if patched {
            debug!("Re-spread row of button {}", index);
            self.invalidate_row(index);
        } else {
            self.relayout();
        }
        Ok(())
    }

    /// Run the action for key `id`, if one is installed.
    fn fire(&mut self, id: u16) -> ActionResult {
        let Some(label) = self.map.label(id) else {
            return ActionResult::Ok;
        };
        let Some(mut action) = self.action.take() else {
            return ActionResult::Ok;
        };

        debug!("Button {} fired ({})", id, label);
        let result = action(self, label);

        // The callback may have installed a replacement
        if self.action.is_none() {
            self.action = Some(action);
        }
        result
    }

    fn invalidate_button(&mut self, index: u16) {
        if let Some(area) = self.layout.area(index) {
            self.expand_dirty(area);
        }
    }

    fn invalidate_row(&mut self, index: u16) {
        let content = self.content_area();
        if let Some(row) = self.layout.row_of(index).map(|r| self.layout.rows()[r]) {
            self.expand_dirty(Rectangle::new(
                Point::new(content.top_left.x, row.y),
                Size::new(content.size.width, row.height),
            ));
        }
    }

    fn expand_dirty(&mut self, area: Rectangle) {
        match &mut self.dirty {
            Some(region) => region.expand_to_include(area),
            None => self.dirty = Some(DirtyRegion::new(area)),
        }
    }

    fn style_for(&self, index: u16) -> &Style {
        let ctrl = self.ctrl_or_default(index);
        let toggled = self.interaction.toggled() == Some(index);
        let pressed = self.interaction.pressed() == Some(index) && self.interaction.pointer_over();

        let kind = match (ctrl.is_inactive(), toggled, pressed) {
            (true, _, _) => MatrixStyle::BtnIna,
            (false, true, true) => MatrixStyle::BtnTglPr,
            (false, true, false) => MatrixStyle::BtnTglRel,
            (false, false, true) => MatrixStyle::BtnPr,
            (false, false, false) => MatrixStyle::BtnRel,
        };
        self.styles.get(kind)
    }
}

impl Drawable for ButtonMatrix<'_> {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        let bg = self.styles.get(MatrixStyle::Bg);
        if bg.background_color.is_some() || bg.border_color.is_some() {
            let corner = Size::new(self.border_radius, self.border_radius);
            RoundedRectangle::with_equal_corners(self.bounds, corner)
                .into_styled(bg.to_primitive_style())
                .draw(display)?;
        }

        for (index, area) in self.layout.areas().iter().enumerate() {
            let index = index as u16;
            if self.ctrl_or_default(index).is_hidden() || area.is_zero_sized() {
                continue;
            }

            let label = self.map.label(index).unwrap_or("");
            draw::draw_button(
                display,
                *area,
                label,
                self.style_for(index),
                self.border_radius,
                self.recolor,
            )?;
        }

        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }

    fn is_dirty(&self) -> bool {
        self.dirty.is_some()
    }

    fn mark_clean(&mut self) {
        self.dirty = None;
    }

    fn mark_dirty(&mut self) {
        self.dirty = Some(DirtyRegion::new(self.bounds));
    }

    fn dirty_region(&self) -> Option<DirtyRegion> {
        self.dirty
    }
}

impl Touchable for ButtonMatrix<'_> {
    fn contains_point(&self, point: TouchPoint) -> bool {
        self.bounds.contains(point.to_point())
    }

    fn handle_touch(&mut self, event: TouchEvent) -> TouchResult {
        match event {
            TouchEvent::Press(point) => {
                let Some(id) = self.layout.hit_test(&self.map, point.to_point()) else {
                    return TouchResult::NotHandled;
                };

                if let Some(old) = self.interaction.pressed() {
                    self.invalidate_button(old);
                }
                self.interaction.press(id, self.now);
                self.invalidate_button(id);
                debug!("Button {} pressed", id);
                TouchResult::Handled
            }
            TouchEvent::Drag(point) => {
                let Some(id) = self.interaction.pressed() else {
                    return TouchResult::NotHandled;
                };

                let over = self
                    .layout
                    .area(id)
                    .is_some_and(|area| area.contains(point.to_point()));
                if self.interaction.drag(over) {
                    self.invalidate_button(id);
                }
                TouchResult::Handled
            }
            TouchEvent::Release(point) => {
                let Some(id) = self.interaction.pressed() else {
                    return TouchResult::NotHandled;
                };

                let over = self.ctrl_or_default(id).is_pressable()
                    && self
                        .layout
                        .area(id)
                        .is_some_and(|area| area.contains(point.to_point()));

                let target = self.interaction.release_target(over);
                if let Some(target) = target
                    && self.fire(target) == ActionResult::Invalidated
                {
                    return TouchResult::Invalidated;
                }

                // The action may have re-mapped or disabled the key
                let fired = target.filter(|&t| {
                    t < self.btn_count() && self.ctrl_or_default(t).is_pressable()
                });
                let old_toggled = self.interaction.toggled();

                self.interaction.complete_release(fired);

                self.invalidate_button(id);
                if let Some(old) = old_toggled
                    && old_toggled != self.interaction.toggled()
                {
                    self.invalidate_button(old);
                }
                TouchResult::Handled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use embedded_graphics::mock_display::MockDisplay;

    use crate::ui::styling::ColorPalette;

    const EXAMPLE: &[&[u8]] = &[b"\x82A", b"B", b"\n", b"C", b""];
    const KEYPAD: &[&[u8]] = &[b"1", b"2", b"3", b"\n", b"4", b"5", b"\x916", b""];
    const PAIR: &[&[u8]] = &[b"A", b"B", b""];
    const SINGLE: &[&[u8]] = &[b"A", b""];
    const BAD_LABEL: &[&[u8]] = &[b"ok", b"\x82\xFF", b""];
    const WITH_HIDDEN: &[&[u8]] = &[b"A", b"B", b"\x88C", b"D", b""];

    fn bounds(w: u32, h: u32) -> Rectangle {
        Rectangle::new(Point::zero(), Size::new(w, h))
    }

    fn touch(area: Rectangle) -> TouchPoint {
        let c = area.center();
        TouchPoint::new(c.x as u16, c.y as u16)
    }

    fn recorder(matrix: &mut ButtonMatrix<'_>) -> Rc<RefCell<Vec<String>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        matrix.set_action(move |_, label| {
            sink.borrow_mut().push(label.to_string());
            ActionResult::Ok
        });
        log
    }

    fn click(matrix: &mut ButtonMatrix<'_>, index: u16) -> TouchResult {
        let p = touch(matrix.button_area(index).unwrap());
        matrix.handle_touch(TouchEvent::Press(p));
        matrix.handle_touch(TouchEvent::Release(p))
    }

    #[test]
    fn test_example_map_geometry() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(EXAMPLE).unwrap();

        assert_eq!(matrix.btn_count(), 3);
        assert_eq!(matrix.button_areas().len(), 3);
        assert_eq!(matrix.ctrl_bits().len(), 3);
        assert_eq!(matrix.button_area(0).unwrap().size, Size::new(200, 50));
        assert_eq!(matrix.button_area(1).unwrap().size, Size::new(100, 50));
        assert_eq!(matrix.button_area(2).unwrap().size, Size::new(300, 50));
        assert_eq!(matrix.label(0), Some("A"));
        assert_eq!(matrix.map(), EXAMPLE);
    }

    #[test]
    fn test_theme_sets_gap_and_padding() {
        let theme = Theme::dark();
        let mut matrix = ButtonMatrix::new(bounds(100, 40)).with_theme(&theme);
        matrix.set_map(PAIR).unwrap();

        assert_eq!(
            matrix.button_area(0),
            Some(Rectangle::new(Point::new(8, 8), Size::new(40, 24)))
        );
        assert_eq!(matrix.button_area(1).unwrap().top_left, Point::new(52, 8));
        assert_eq!(
            matrix.style(MatrixStyle::BtnTglRel).background_color,
            Some(theme.palette.accent)
        );
    }

    #[test]
    fn test_compact_theme_packs_keys() {
        let theme = Theme::compact(ColorPalette::light());
        let mut matrix = ButtonMatrix::new(bounds(101, 40)).with_theme(&theme);
        matrix.set_map(PAIR).unwrap();

        assert_eq!(
            matrix.button_area(0),
            Some(Rectangle::new(Point::zero(), Size::new(50, 40)))
        );
        assert_eq!(
            matrix.button_area(1),
            Some(Rectangle::new(Point::new(51, 0), Size::new(50, 40)))
        );
        assert_eq!(
            matrix.style(MatrixStyle::Bg).background_color,
            Some(ColorPalette::light().background)
        );
    }

    #[test]
    fn test_copy_of_takes_map_and_settings_but_not_action() {
        let mut source = ButtonMatrix::new(bounds(300, 100)).with_theme(&Theme::light());
        source.set_map(EXAMPLE).unwrap();
        source.set_btn_disabled(1, true).unwrap();
        source.set_toggle(true, Some(0)).unwrap();
        source.set_recolor(true);
        let log = recorder(&mut source);
        source.set_pressed(Some(2)).unwrap();

        let mut copy = ButtonMatrix::copy_of(&source, bounds(300, 100));

        assert_eq!(copy.map(), EXAMPLE);
        assert_eq!(copy.ctrl_bits(), source.ctrl_bits());
        assert_eq!(copy.button_areas(), source.button_areas());
        assert_eq!(
            copy.style(MatrixStyle::BtnRel),
            source.style(MatrixStyle::BtnRel)
        );
        assert!(copy.recolor());
        assert!(copy.toggle_enabled());
        assert_eq!(copy.toggled(), None);
        assert_eq!(copy.pressed(), None);
        assert!(copy.action().is_none());
        assert!(copy.is_dirty());

        click(&mut copy, 0);
        assert!(log.borrow().is_empty());
        assert!(source.action().is_some());
    }

    #[test]
    fn test_padding_insets_content() {
        let config = MatrixConfig {
            padding: Padding::all(10),
            inner_spacing: 4,
            ..MatrixConfig::default()
        };
        let mut matrix = ButtonMatrix::new(bounds(124, 60)).with_config(config);
        matrix.set_map(PAIR).unwrap();

        assert_eq!(
            matrix.button_area(0),
            Some(Rectangle::new(Point::new(10, 10), Size::new(50, 40)))
        );
        assert_eq!(
            matrix.button_area(1),
            Some(Rectangle::new(Point::new(64, 10), Size::new(50, 40)))
        );
    }

    #[test]
    fn test_click_fires_once_with_stripped_label() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(EXAMPLE).unwrap();
        let log = recorder(&mut matrix);

        assert_eq!(click(&mut matrix, 0), TouchResult::Handled);

        assert_eq!(*log.borrow(), ["A"]);
        assert_eq!(matrix.pressed(), None);
        assert_eq!(matrix.press_state(), PressState::Idle);
    }

    #[test]
    fn test_release_on_other_button_does_not_fire() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(EXAMPLE).unwrap();
        let log = recorder(&mut matrix);

        let a = touch(matrix.button_area(0).unwrap());
        let c = touch(matrix.button_area(2).unwrap());
        matrix.handle_touch(TouchEvent::Press(a));
        matrix.handle_touch(TouchEvent::Drag(c));
        assert_eq!(matrix.pressed(), Some(0));
        matrix.handle_touch(TouchEvent::Release(c));

        matrix.handle_touch(TouchEvent::Press(a));
        matrix.handle_touch(TouchEvent::Release(TouchPoint::new(500, 500)));

        assert!(log.borrow().is_empty());
        assert_eq!(matrix.pressed(), None);
    }

    #[test]
    fn test_press_outside_buttons_is_ignored() {
        let config = MatrixConfig {
            padding: Padding::all(10),
            ..MatrixConfig::default()
        };
        let mut matrix = ButtonMatrix::new(bounds(100, 40)).with_config(config);
        matrix.set_map(SINGLE).unwrap();

        let result = matrix.handle_touch(TouchEvent::Press(TouchPoint::new(2, 2)));
        assert_eq!(result, TouchResult::NotHandled);
        assert_eq!(matrix.press_state(), PressState::Idle);
    }

    #[test]
    fn test_toggle_mutual_exclusion() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(KEYPAD).unwrap();
        matrix.set_toggle(true, None).unwrap();

        click(&mut matrix, 0);
        assert_eq!(matrix.toggled(), Some(0));

        click(&mut matrix, 4);
        assert_eq!(matrix.toggled(), Some(4));
    }

    #[test]
    fn test_set_btn_width_relayouts_and_keeps_flags() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(KEYPAD).unwrap();
        matrix.set_btn_disabled(1, true).unwrap();

        matrix.set_btn_width(0, 4).unwrap();

        assert_eq!(matrix.button_area(0).unwrap().size.width, 200);
        assert_eq!(matrix.button_area(1).unwrap().size.width, 50);
        assert_eq!(matrix.button_area(2).unwrap().size.width, 50);
        assert!(matrix.ctrl(1).unwrap().is_inactive());
        assert_eq!(matrix.ctrl(0).unwrap().width(), 4);
        assert!(!matrix.ctrl(0).unwrap().is_inactive());
    }

    #[test]
    fn test_set_btn_width_rejects_bad_width() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(KEYPAD).unwrap();

        assert_eq!(
            matrix.set_btn_width(0, 0),
            Err(MatrixError::InvalidWidth { width: 0 })
        );
        assert_eq!(
            matrix.set_btn_width(0, 8),
            Err(MatrixError::InvalidWidth { width: 8 })
        );
        assert_eq!(matrix.ctrl(0).unwrap().width(), 1);
    }

    #[test]
    fn test_disabled_button_ignores_press_and_keeps_geometry() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(EXAMPLE).unwrap();
        let log = recorder(&mut matrix);
        let before = matrix.button_area(1).unwrap();

        matrix.set_btn_disabled(1, true).unwrap();

        assert_eq!(matrix.button_area(1), Some(before));
        let result = matrix.handle_touch(TouchEvent::Press(touch(before)));
        assert_eq!(result, TouchResult::NotHandled);
        assert_eq!(matrix.press_state(), PressState::Idle);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_hidden_button_redistributes_row() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(KEYPAD).unwrap();
        let old = matrix.button_area(1).unwrap();

        matrix.set_btn_hidden(1, true).unwrap();

        assert_eq!(matrix.button_area(1).unwrap().size, Size::zero());
        assert_eq!(matrix.button_area(0).unwrap().size.width, 150);
        assert_eq!(matrix.button_area(2).unwrap().size.width, 150);
        let result = matrix.handle_touch(TouchEvent::Press(touch(old)));
        // The point now lands on key 0 or 2, never the hidden one
        assert_eq!(result, TouchResult::Handled);
        assert_ne!(matrix.pressed(), Some(1));

        matrix.set_btn_hidden(1, false).unwrap();
        assert_eq!(matrix.button_area(1), Some(old));
    }

    #[test]
    fn test_hiding_whole_row_gives_space_to_others() {
        let mut matrix = ButtonMatrix::new(bounds(90, 100));
        matrix.set_map(KEYPAD).unwrap();

        for i in 0..3 {
            matrix.set_btn_hidden(i, true).unwrap();
        }

        assert_eq!(
            matrix.button_area(3),
            Some(Rectangle::new(Point::new(0, 0), Size::new(30, 100)))
        );
    }

    #[test]
    fn test_hiding_pressed_button_cancels_press() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(KEYPAD).unwrap();
        let log = recorder(&mut matrix);

        let p = touch(matrix.button_area(2).unwrap());
        matrix.handle_touch(TouchEvent::Press(p));
        matrix.set_btn_flags(2, true, false, false).unwrap();

        assert_eq!(matrix.pressed(), None);
        matrix.handle_touch(TouchEvent::Release(p));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(EXAMPLE).unwrap();

        let err = MatrixError::InvalidIndex { index: 3, count: 3 };
        assert_eq!(matrix.set_btn_hidden(3, true), Err(err));
        assert_eq!(matrix.set_btn_disabled(3, true), Err(err));
        assert_eq!(matrix.set_btn_disable_repeat(3, true), Err(err));
        assert_eq!(matrix.set_btn_flags(3, true, true, true), Err(err));
        assert_eq!(matrix.set_btn_width(3, 2), Err(err));
        assert_eq!(matrix.set_pressed(Some(3)), Err(err));
        assert_eq!(matrix.set_toggle(true, Some(3)), Err(err));
        assert!(!matrix.toggle_enabled());
    }

    #[test]
    fn test_invalid_map_keeps_previous() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(EXAMPLE).unwrap();

        assert_eq!(matrix.set_map(&[]), Err(MatrixError::EmptyMap));
        assert_eq!(
            matrix.set_map(BAD_LABEL),
            Err(MatrixError::InvalidLabel { index: 1 })
        );
        assert_eq!(matrix.btn_count(), 3);
        assert_eq!(matrix.label(2), Some("C"));
    }

    #[test]
    fn test_ctrl_map_length_mismatch_is_rejected() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(EXAMPLE).unwrap();
        let areas: Vec<Rectangle> = matrix.button_areas().to_vec();

        assert_eq!(
            matrix.set_ctrl_map(&[1, 1]),
            Err(MatrixError::CtrlMapLength {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(matrix.button_areas(), areas.as_slice());

        matrix.set_ctrl_map(&[1, 1, 1]).unwrap();
        assert_eq!(matrix.button_area(0).unwrap().size.width, 150);
    }

    #[test]
    fn test_shrinking_map_drops_stale_state() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(KEYPAD).unwrap();
        matrix.set_toggle(true, Some(5)).unwrap();
        matrix.set_pressed(Some(4)).unwrap();

        matrix.set_map(EXAMPLE).unwrap();

        assert_eq!(matrix.toggled(), None);
        assert_eq!(matrix.pressed(), None);
        assert!(matrix.toggle_enabled());
    }

    #[test]
    fn test_zero_button_map() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(EMPTY_MAP).unwrap();

        assert_eq!(matrix.btn_count(), 0);
        assert!(matrix.button_areas().is_empty());
        assert_eq!(
            matrix.handle_touch(TouchEvent::Press(TouchPoint::new(5, 5))),
            TouchResult::NotHandled
        );
    }

    #[test]
    fn test_long_press_repeats_until_release() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(KEYPAD).unwrap();
        let log = recorder(&mut matrix);

        matrix.update(Instant::from_millis(1_000));
        let p = touch(matrix.button_area(0).unwrap());
        matrix.handle_touch(TouchEvent::Press(p));

        assert_eq!(matrix.update(Instant::from_millis(1_300)), TouchResult::NotHandled);
        assert_eq!(matrix.update(Instant::from_millis(1_400)), TouchResult::Handled);
        assert!(matches!(
            matrix.press_state(),
            PressState::LongPressed { id: 0, .. }
        ));
        matrix.update(Instant::from_millis(1_500));
        matrix.update(Instant::from_millis(1_600));
        assert_eq!(log.borrow().len(), 2);

        matrix.handle_touch(TouchEvent::Release(p));
        assert_eq!(log.borrow().len(), 3);
        assert_eq!(matrix.press_state(), PressState::Idle);
    }

    #[test]
    fn test_no_repeat_button_never_repeats() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(KEYPAD).unwrap();
        let log = recorder(&mut matrix);

        // "\x91" = no repeat, width 1
        assert!(matrix.ctrl(5).unwrap().is_no_repeat());
        let p = touch(matrix.button_area(5).unwrap());
        matrix.handle_touch(TouchEvent::Press(p));
        for ms in (0..3_000).step_by(100) {
            matrix.update(Instant::from_millis(ms));
        }
        assert!(log.borrow().is_empty());
        assert!(matches!(matrix.press_state(), PressState::Pressed { id: 5, .. }));

        matrix.set_btn_disable_repeat(5, false).unwrap();
        matrix.update(Instant::from_millis(3_000));
        assert!(matches!(
            matrix.press_state(),
            PressState::LongPressed { id: 5, .. }
        ));
    }

    #[test]
    fn test_config_timing_is_used() {
        let config = MatrixConfig {
            long_press_ms: 50,
            repeat_ms: 10,
            ..MatrixConfig::default()
        };
        let mut matrix = ButtonMatrix::new(bounds(300, 100)).with_config(config);
        matrix.set_map(KEYPAD).unwrap();
        let log = recorder(&mut matrix);

        let p = touch(matrix.button_area(0).unwrap());
        matrix.handle_touch(TouchEvent::Press(p));
        matrix.update(Instant::from_millis(50));
        matrix.update(Instant::from_millis(60));
        assert_eq!(*log.borrow(), ["1"]);
    }

    fn run_frames(matrix: &mut ButtonMatrix<'_>) {
        for ms in (0..=1_000).step_by(50) {
            matrix.update(Instant::from_millis(ms));
        }
    }

    #[test]
    fn test_highlighted_key_never_repeats() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(PAIR).unwrap();
        let log = recorder(&mut matrix);

        matrix.set_pressed(Some(0)).unwrap();
        run_frames(&mut matrix);

        assert!(log.borrow().is_empty());
        assert!(matches!(matrix.press_state(), PressState::Pressed { id: 0, .. }));
    }

    #[test]
    fn test_highlighted_disabled_or_hidden_key_never_fires() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(PAIR).unwrap();
        let log = recorder(&mut matrix);

        matrix.set_btn_disabled(1, true).unwrap();
        matrix.set_pressed(Some(1)).unwrap();
        run_frames(&mut matrix);
        assert!(log.borrow().is_empty());

        matrix.set_pressed(None).unwrap();
        matrix.set_btn_hidden(0, true).unwrap();
        matrix.set_pressed(Some(0)).unwrap();
        run_frames(&mut matrix);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_remap_to_inactive_key_drops_press() {
        const FIRST_INACTIVE: &[&[u8]] = &[b"\xA1A", b"B", b""];

        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(PAIR).unwrap();
        let log = recorder(&mut matrix);

        let p = touch(matrix.button_area(0).unwrap());
        matrix.handle_touch(TouchEvent::Press(p));
        assert_eq!(matrix.pressed(), Some(0));

        matrix.set_map(FIRST_INACTIVE).unwrap();
        assert!(matrix.ctrl(0).unwrap().is_inactive());
        assert_eq!(matrix.pressed(), None);

        run_frames(&mut matrix);
        matrix.handle_touch(TouchEvent::Release(p));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_invalidating_callback_stops_all_writes() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(KEYPAD).unwrap();
        matrix.set_toggle(true, None).unwrap();
        matrix.set_action(|m, _| {
            m.set_map(EXAMPLE).unwrap();
            ActionResult::Invalidated
        });

        assert_eq!(click(&mut matrix, 0), TouchResult::Invalidated);

        // Nothing after the callback ran: press not cleared, no toggle
        assert_eq!(matrix.pressed(), Some(0));
        assert_eq!(matrix.toggled(), None);
        assert_eq!(matrix.btn_count(), 3);
        assert!(matrix.action().is_some());
    }

    #[test]
    fn test_callback_remap_does_not_toggle_stale_index() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(KEYPAD).unwrap();
        matrix.set_toggle(true, None).unwrap();
        matrix.set_action(|m, _| {
            m.set_map(EXAMPLE).unwrap();
            ActionResult::Ok
        });

        assert_eq!(click(&mut matrix, 4), TouchResult::Handled);

        assert_eq!(matrix.btn_count(), 3);
        assert_eq!(matrix.toggled(), None);
        assert_eq!(matrix.pressed(), None);
    }

    #[test]
    fn test_callback_can_replace_itself() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(EXAMPLE).unwrap();
        let count = Rc::new(RefCell::new(0u32));
        let sink = count.clone();
        matrix.set_action(move |m, _| {
            let sink = sink.clone();
            m.set_action(move |_, _| {
                *sink.borrow_mut() += 10;
                ActionResult::Ok
            });
            ActionResult::Ok
        });

        click(&mut matrix, 0);
        click(&mut matrix, 0);
        assert_eq!(*count.borrow(), 10);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(EXAMPLE).unwrap();
        assert_eq!(matrix.dirty_region(), Some(DirtyRegion::new(bounds(300, 100))));

        matrix.mark_clean();
        assert!(!matrix.is_dirty());

        matrix.set_btn_disabled(2, true).unwrap();
        assert_eq!(
            matrix.dirty_region().map(|r| r.bounds),
            matrix.button_area(2)
        );
    }

    #[test]
    fn test_set_bounds_relayouts() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        matrix.set_map(EXAMPLE).unwrap();

        matrix.set_bounds(bounds(150, 50));
        assert_eq!(matrix.button_area(0).unwrap().size, Size::new(100, 25));
        assert!(matrix.contains_point(TouchPoint::new(149, 49)));
        assert!(!matrix.contains_point(TouchPoint::new(150, 49)));
    }

    #[test]
    fn test_style_and_recolor_accessors() {
        let mut matrix = ButtonMatrix::new(bounds(300, 100));
        let style = Style::new().with_background(Rgb565::new(1, 2, 3));

        matrix.set_style(MatrixStyle::BtnIna, style);
        matrix.set_recolor(true);

        assert_eq!(matrix.style(MatrixStyle::BtnIna), &style);
        assert!(matrix.recolor());
    }

    #[test]
    fn test_draw_uses_state_styles() {
        let rel = Rgb565::new(0, 0, 31);
        let tgl = Rgb565::new(31, 0, 0);
        let ina = Rgb565::new(0, 63, 0);

        let mut matrix = ButtonMatrix::new(bounds(60, 20));
        matrix.set_map(WITH_HIDDEN).unwrap();
        matrix.set_style(MatrixStyle::Bg, Style::new());
        matrix.set_style(MatrixStyle::BtnRel, Style::new().with_background(rel));
        matrix.set_style(MatrixStyle::BtnTglRel, Style::new().with_background(tgl));
        matrix.set_style(MatrixStyle::BtnIna, Style::new().with_background(ina));
        matrix.set_toggle(true, Some(1)).unwrap();
        matrix.set_btn_disabled(3, true).unwrap();

        let mut display = MockDisplay::<Rgb565>::new();
        display.set_allow_overdraw(true);
        matrix.draw(&mut display).unwrap();

        // Three visible keys, 20px each
        assert_eq!(display.get_pixel(Point::new(1, 1)), Some(rel));
        assert_eq!(display.get_pixel(Point::new(21, 1)), Some(tgl));
        assert_eq!(display.get_pixel(Point::new(41, 1)), Some(ina));
        assert_eq!(display.get_pixel(Point::new(61, 1)), None);
    }
}
