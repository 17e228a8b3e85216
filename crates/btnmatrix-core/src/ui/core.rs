// src/ui/core.rs
//! Pointer input and the drawing / touch contracts every widget implements

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// Pointer position in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

impl TouchPoint {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    pub fn to_point(&self) -> Point {
        Point::new(i32::from(self.x), i32::from(self.y))
    }
}

/// One step of a pointer gesture.
///
/// A gesture is a `Press`, any number of `Drag`s, and a `Release`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEvent {
    Press(TouchPoint),
    /// Pointer moved while held down
    Drag(TouchPoint),
    Release(TouchPoint),
}

impl TouchEvent {
    pub fn point(&self) -> TouchPoint {
        match *self {
            TouchEvent::Press(p) | TouchEvent::Drag(p) | TouchEvent::Release(p) => p,
        }
    }
}

/// Outcome of dispatching a [`TouchEvent`] to a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchResult {
    /// The widget consumed the event
    Handled,
    /// Nothing under the pointer took it; offer it to the next widget
    NotHandled,
    /// A callback run while handling the event reported that the widget
    /// was torn down or reconfigured. The widget wrote nothing after the
    /// callback returned and the caller must re-query any state it cached.
    Invalidated,
}

/// Part of the screen that has to be repainted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRegion {
    pub bounds: Rectangle,
}

impl DirtyRegion {
    pub fn new(bounds: Rectangle) -> Self {
        Self { bounds }
    }

    /// Grow to the bounding box of the current region and `other`.
    ///
    /// Zero-sized rectangles add nothing.
    pub fn expand_to_include(&mut self, other: Rectangle) {
        if other.is_zero_sized() {
            return;
        }
        if self.bounds.is_zero_sized() {
            self.bounds = other;
            return;
        }

        let a = self.bounds;
        let left = a.top_left.x.min(other.top_left.x);
        let top = a.top_left.y.min(other.top_left.y);
        let right =
            (a.top_left.x + a.size.width as i32).max(other.top_left.x + other.size.width as i32);
        let bottom =
            (a.top_left.y + a.size.height as i32).max(other.top_left.y + other.size.height as i32);

        self.bounds = Rectangle::new(
            Point::new(left, top),
            Size::new((right - left) as u32, (bottom - top) as u32),
        );
    }
}

/// Something that can paint itself and track what needs repainting.
pub trait Drawable {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error>;

    /// Outer rectangle the widget paints within
    fn bounds(&self) -> Rectangle;

    fn is_dirty(&self) -> bool;

    /// Called by the owner after a successful draw
    fn mark_clean(&mut self);

    /// Request a full repaint
    fn mark_dirty(&mut self);

    /// Smallest rectangle that needs repainting, if any.
    ///
    /// Widgets that track partial damage override this; the default
    /// repaints everything.
    fn dirty_region(&self) -> Option<DirtyRegion> {
        self.is_dirty().then(|| DirtyRegion::new(self.bounds()))
    }
}

/// Something that reacts to pointer gestures.
pub trait Touchable {
    fn contains_point(&self, point: TouchPoint) -> bool;

    fn handle_touch(&mut self, event: TouchEvent) -> TouchResult;
}

/// A widget that both draws and takes touch input.
pub trait Interactive: Drawable + Touchable {}

impl<T: Drawable + Touchable> Interactive for T {}
