//! Per-state styles and rendering of the matrix.

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, ascii::FONT_6X10};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Rectangle, RoundedRectangle};
use embedded_graphics::text::{Alignment as TextAlignment, Baseline, Text, TextStyleBuilder};
use heapless::Vec;

use crate::ui::styling::colors::from_rgb888;
use crate::ui::styling::{ColorPalette, Style, WHITE};

/// Font used for key labels.
pub const LABEL_FONT: &MonoFont<'static> = &FONT_6X10;

/// Most color runs a recolored label is split into. Further runs are
/// dropped with a warning.
pub const MAX_RECOLOR_RUNS: usize = 8;

/// Style slots of the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixStyle {
    /// Matrix background; its padding insets the keys
    Bg,
    BtnRel,
    BtnPr,
    BtnTglRel,
    BtnTglPr,
    BtnIna,
}

impl MatrixStyle {
    pub const COUNT: usize = 6;

    const fn slot(self) -> usize {
        self as usize
    }
}

/// The six styles, indexed by [`MatrixStyle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixStyles([Style; MatrixStyle::COUNT]);

impl Default for MatrixStyles {
    fn default() -> Self {
        Self::from_palette(&ColorPalette::default())
    }
}

impl MatrixStyles {
    /// Derive every state style from a palette.
    pub fn from_palette(palette: &ColorPalette) -> Self {
        let released = Style::new()
            .with_background(palette.key)
            .with_foreground(palette.label)
            .with_border(palette.outline, 1);
        let toggled = Style::new()
            .with_background(palette.accent)
            .with_foreground(WHITE);
        let inactive = Style::new()
            .with_background(palette.background)
            .with_foreground(palette.label_dim)
            .with_border(palette.outline, 1);

        Self([
            Style::new().with_background(palette.background),
            released,
            released.pressed(palette.key),
            toggled,
            toggled.pressed(palette.accent),
            inactive,
        ])
    }

    pub fn get(&self, kind: MatrixStyle) -> &Style {
        &self.0[kind.slot()]
    }

    pub fn set(&mut self, kind: MatrixStyle, style: Style) {
        self.0[kind.slot()] = style;
    }
}

/// A piece of label text and the color it is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRun<'t> {
    pub text: &'t str,
    /// `None` means the style's foreground color
    pub color: Option<Rgb565>,
}

/// Split a label on recolor commands.
///
/// `#RRGGBB text#` draws `text` in that color. A `#` that does not open a
/// valid command is kept as text; an unterminated command runs to the end.
pub fn recolor_runs(label: &str) -> Vec<ColorRun<'_>, MAX_RECOLOR_RUNS> {
    let mut runs = Vec::new();
    let mut rest = label;
    let mut search_from = 0usize;

    while let Some(offset) = rest[search_from..].find('#') {
        let hash = search_from + offset;
        let Some(color) = parse_command(&rest[hash + 1..]) else {
            search_from = hash + 1;
            continue;
        };

        push_run(&mut runs, &rest[..hash], None);

        // Skip "#RRGGBB" and the single separating space
        let body = &rest[hash + 7..];
        let body = body.strip_prefix(' ').unwrap_or(body);
        let (colored, after) = match body.find('#') {
            Some(end) => (&body[..end], &body[end + 1..]),
            None => (body, ""),
        };
        push_run(&mut runs, colored, Some(color));

        rest = after;
        search_from = 0;
    }
    push_run(&mut runs, rest, None);

    runs
}

fn parse_command(after_hash: &str) -> Option<Rgb565> {
    let hex = after_hash.get(..6)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().map(from_rgb888)
}

fn push_run<'t>(
    runs: &mut Vec<ColorRun<'t>, MAX_RECOLOR_RUNS>,
    text: &'t str,
    color: Option<Rgb565>,
) {
    if text.is_empty() {
        return;
    }
    if runs.push(ColorRun { text, color }).is_err() {
        log::warn!("Recolor label has more than {} runs", MAX_RECOLOR_RUNS);
    }
}

/// Draw one key: body in `style`, label centered.
pub fn draw_button<D: DrawTarget<Color = Rgb565>>(
    display: &mut D,
    area: Rectangle,
    label: &str,
    style: &Style,
    radius: u32,
    recolor: bool,
) -> Result<(), D::Error> {
    let corner = Size::new(radius, radius);
    RoundedRectangle::with_equal_corners(area, corner)
        .into_styled(style.to_primitive_style())
        .draw(display)?;

    if label.is_empty() {
        return Ok(());
    }

    let text_color = style.foreground_color.unwrap_or(WHITE);
    let center = area.center();

    if !recolor {
        let text_style = MonoTextStyle::new(LABEL_FONT, text_color);
        let layout = TextStyleBuilder::new()
            .alignment(TextAlignment::Center)
            .baseline(Baseline::Middle)
            .build();
        Text::with_text_style(label, center, text_style, layout).draw(display)?;
        return Ok(());
    }

    let runs = recolor_runs(label);
    let char_width = LABEL_FONT.character_size.width;
    let total_chars: u32 = runs.iter().map(|r| r.text.chars().count() as u32).sum();
    let mut cursor = Point::new(center.x - (total_chars * char_width / 2) as i32, center.y);

    for run in &runs {
        let text_style = MonoTextStyle::new(LABEL_FONT, run.color.unwrap_or(text_color));
        cursor = Text::with_baseline(run.text, cursor, text_style, Baseline::Middle).draw(display)?;
    }

    Ok(())
}
