//! Desktop simulator for the btnmatrix button matrix widget.
//!
//! Renders a numeric keypad in an SDL2 window via `embedded-graphics-simulator`
//! and echoes typed keys above it, so the matrix can be exercised without
//! hardware.
//!
//! # Key bindings
//!
//! | Key | Action                          |
//! |-----|---------------------------------|
//! | T   | Toggle "sticky key" mode        |
//! | H   | Hide / show the `0` key         |
//! | D   | Disable / enable the `Del` key  |
//! | L   | Cycle dark / light / compact    |
//! | Q   | Quit                            |
//!
//! Mouse presses, drags and releases are forwarded as touch events.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::{MonoTextStyle, ascii::FONT_6X10};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{info, warn};

use btnmatrix_core::config::MatrixConfig;
use btnmatrix_core::ui::core::Interactive;
use btnmatrix_core::ui::styling::{ColorPalette, Theme, WHITE};
use btnmatrix_core::ui::{
    ActionResult, ButtonMatrix, Drawable, TouchEvent, TouchPoint, TouchResult, Touchable,
};

// ---------------------------------------------------------------------------
// Display constants
// ---------------------------------------------------------------------------

const DISPLAY_WIDTH_PX: u32 = 320;
const DISPLAY_HEIGHT_PX: u32 = 240;

/// Height of the echo line above the keypad.
const ECHO_HEIGHT_PX: u32 = 24;

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 2;

/// Target frame duration (~30 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(33);

/// Longest echo kept on screen, in characters.
const ECHO_MAX_CHARS: usize = 48;

/// Keypad layout. `\x82` doubles the width of `Enter`, `\x91` stops `Clr`
/// from auto-repeating.
const KEYPAD: &[&[u8]] = &[
    b"1", b"2", b"3", b"Del", b"\n",
    b"4", b"5", b"6", b"\x91#ff4040 Clr#", b"\n",
    b"7", b"8", b"9", b"\n",
    b"0", b"\x82Enter", b"",
];

const ZERO_KEY: u16 = 11;
const DEL_KEY: u16 = 3;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn keypad_bounds() -> Rectangle {
    Rectangle::new(
        Point::new(0, ECHO_HEIGHT_PX as i32),
        Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX - ECHO_HEIGHT_PX),
    )
}

/// Build the keypad and wire its action to the shared echo buffer.
fn create_keypad(theme: &Theme, echo: &Rc<RefCell<String>>) -> ButtonMatrix<'static> {
    let config = MatrixConfig {
        recolor: true,
        ..MatrixConfig::default()
    };

    let mut keypad = ButtonMatrix::new(keypad_bounds())
        .with_config(config)
        .with_theme(theme);
    if let Err(e) = keypad.set_map(KEYPAD) {
        warn!("Keypad map rejected: {}", e);
    }

    let echo = echo.clone();
    keypad.set_action(move |_, label| {
        let mut text = echo.borrow_mut();
        match label {
            "Del" => {
                text.pop();
            }
            "Enter" => {
                info!("Entered: {}", text);
                text.clear();
            }
            l if l.contains("Clr") => text.clear(),
            digit => {
                if text.len() < ECHO_MAX_CHARS {
                    text.push_str(digit);
                }
            }
        }
        ActionResult::Ok
    });

    keypad
}

/// Themes cycled by the `L` key.
fn theme_at(index: usize) -> Theme {
    match index {
        0 => Theme::dark(),
        1 => Theme::light(),
        _ => Theme::compact(ColorPalette::dark()),
    }
}

fn to_touch(point: Point) -> TouchPoint {
    TouchPoint::new(point.x.max(0) as u16, point.y.max(0) as u16)
}

/// Clear the screen and draw the echo line and the widget.
fn render<W: Interactive>(
    display: &mut SimulatorDisplay<Rgb565>,
    widget: &mut W,
    echo: &str,
    background: Rgb565,
) {
    let _ = display.clear(background);

    let style = MonoTextStyle::new(&FONT_6X10, WHITE);
    let _ = Text::with_baseline(echo, Point::new(8, 8), style, Baseline::Top).draw(display);

    if let Err(e) = widget.draw(display) {
        log::error!("Draw error: {:?}", e);
    }
    widget.mark_clean();
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting btnmatrix simulator");
    info!(
        "Display: {}×{} (scale {}×)",
        DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX, WINDOW_SCALE
    );
    info!("Keys: T=Toggle  H=Hide 0  D=Disable Del  L=Theme  Q=Quit");

    let mut display =
        SimulatorDisplay::<Rgb565>::new(Size::new(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX));
    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("Button Matrix Simulator", &output_settings);

    let echo = Rc::new(RefCell::new(String::new()));
    let mut theme_index = 0usize;
    let mut theme = theme_at(theme_index);
    let mut keypad = create_keypad(&theme, &echo);

    let start = Instant::now();
    let mut mouse_down = false;
    let mut shown_echo = String::new();

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    render(&mut display, &mut keypad, "", theme.palette.background);
    window.update(&display);

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    'running: loop {
        let frame_start = Instant::now();

        // --- Frame clock --------------------------------------------------
        let now = embassy_time::Instant::from_millis(start.elapsed().as_millis() as u64);
        keypad.update(now);

        // --- SDL events ---------------------------------------------------
        for event in window.events() {
            let touch = match event {
                SimulatorEvent::Quit => break 'running,

                SimulatorEvent::KeyDown { keycode, .. } => {
                    let result = match keycode {
                        Keycode::Q | Keycode::Escape => break 'running,
                        Keycode::T => {
                            let enabled = !keypad.toggle_enabled();
                            info!("Toggle mode {}", if enabled { "on" } else { "off" });
                            keypad.set_toggle(enabled, None)
                        }
                        Keycode::H => {
                            let hidden = keypad.ctrl(ZERO_KEY).is_some_and(|c| c.is_hidden());
                            keypad.set_btn_hidden(ZERO_KEY, !hidden)
                        }
                        Keycode::D => {
                            let disabled = keypad.ctrl(DEL_KEY).is_some_and(|c| c.is_inactive());
                            keypad.set_btn_disabled(DEL_KEY, !disabled)
                        }
                        Keycode::L => {
                            theme_index = (theme_index + 1) % 3;
                            theme = theme_at(theme_index);
                            keypad = create_keypad(&theme, &echo);
                            Ok(())
                        }
                        _ => Ok(()),
                    };
                    if let Err(e) = result {
                        warn!("Key command failed: {}", e);
                    }
                    None
                }

                SimulatorEvent::MouseButtonDown { point, .. } => {
                    mouse_down = true;
                    Some(TouchEvent::Press(to_touch(point)))
                }
                SimulatorEvent::MouseMove { point } if mouse_down => {
                    Some(TouchEvent::Drag(to_touch(point)))
                }
                SimulatorEvent::MouseButtonUp { point, .. } => {
                    mouse_down = false;
                    Some(TouchEvent::Release(to_touch(point)))
                }

                _ => None,
            };

            if let Some(touch) = touch
                && keypad.handle_touch(touch) == TouchResult::Invalidated
            {
                info!("Keypad rebuilt by its action");
            }
        }

        // --- Render -------------------------------------------------------
        let current_echo = echo.borrow().clone();
        if keypad.is_dirty() || current_echo != shown_echo {
            render(
                &mut display,
                &mut keypad,
                &current_echo,
                theme.palette.background,
            );
            shown_echo = current_echo;
        }

        window.update(&display);

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    info!("Simulator exiting");
}
