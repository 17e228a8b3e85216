//! Press / long-press / release / toggle tracking.
//!
//! This part knows nothing about geometry or callbacks. The widget
//! hit-tests, asks the machine what to do, runs the callback, and only then
//! commits the follow-up write, so a callback that invalidates the widget
//! leaves the machine untouched.

use embassy_time::{Duration, Instant};

/// Where the pointer interaction currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressState {
    Idle,
    /// `id` went down at `since`. `pointer` is false for a press injected
    /// by the owner, which only highlights the key
    Pressed {
        id: u16,
        since: Instant,
        over: bool,
        pointer: bool,
    },
    /// Held past the long-press threshold; `last_fire` is the last repeat
    LongPressed {
        id: u16,
        last_fire: Instant,
        over: bool,
    },
}

/// Long-press timing, supplied by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressTiming {
    pub long_press: Duration,
    pub repeat: Duration,
}

/// What a frame tick asks the widget to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Nothing,
    /// Threshold crossed, state moved to long-pressed, no callback yet
    EnteredLongPress(u16),
    /// Repeat period elapsed: fire the callback for this key
    Repeat(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interaction {
    press: PressState,
    toggled: Option<u16>,
    toggle_enabled: bool,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            press: PressState::Idle,
            toggled: None,
            toggle_enabled: false,
        }
    }
}

impl Interaction {
    pub fn state(&self) -> PressState {
        self.press
    }

    /// Key currently held down, if any.
    pub fn pressed(&self) -> Option<u16> {
        match self.press {
            PressState::Idle => None,
            PressState::Pressed { id, .. } | PressState::LongPressed { id, .. } => Some(id),
        }
    }

    /// Whether the pointer is still over the pressed key.
    pub fn pointer_over(&self) -> bool {
        match self.press {
            PressState::Idle => false,
            PressState::Pressed { over, .. } | PressState::LongPressed { over, .. } => over,
        }
    }

    pub fn toggled(&self) -> Option<u16> {
        self.toggled
    }

    pub fn toggle_enabled(&self) -> bool {
        self.toggle_enabled
    }

    /// Pointer went down on `id`.
    pub fn press(&mut self, id: u16, now: Instant) {
        self.press = PressState::Pressed {
            id,
            since: now,
            over: true,
            pointer: true,
        };
    }

    /// Forget the press without firing anything.
    pub fn cancel(&mut self) {
        self.press = PressState::Idle;
    }

    /// Track whether a dragged pointer is still over the pressed key.
    /// Returns `true` when that changed.
    pub fn drag(&mut self, still_over: bool) -> bool {
        match &mut self.press {
            PressState::Idle => false,
            PressState::Pressed { over, .. } | PressState::LongPressed { over, .. } => {
                let changed = *over != still_over;
                *over = still_over;
                changed
            }
        }
    }

    /// Key whose callback a release should fire: the pressed key, if the
    /// release landed on it.
    pub fn release_target(&self, released_over: bool) -> Option<u16> {
        if released_over { self.pressed() } else { None }
    }

    /// Finish a release. `fired` is the key whose callback ran, which
    /// becomes the toggled key when toggling is on.
    pub fn complete_release(&mut self, fired: Option<u16>) {
        if self.toggle_enabled
            && let Some(id) = fired
        {
            self.toggled = Some(id);
        }
        self.press = PressState::Idle;
    }

    /// Advance long-press handling to `now`.
    ///
    /// `no_repeat` is the pressed key's no-repeat bit; such keys stay in
    /// the pressed state however long they are held. Injected presses
    /// never turn into long presses.
    pub fn tick(&mut self, now: Instant, timing: PressTiming, no_repeat: bool) -> Tick {
        match self.press {
            PressState::Pressed {
                id,
                since,
                over,
                pointer,
            } => {
                if !pointer || no_repeat || now.saturating_duration_since(since) < timing.long_press
                {
                    return Tick::Nothing;
                }
                self.press = PressState::LongPressed {
                    id,
                    last_fire: now,
                    over,
                };
                Tick::EnteredLongPress(id)
            }
            PressState::LongPressed {
                id,
                last_fire,
                over,
            } => {
                if !over || now.saturating_duration_since(last_fire) < timing.repeat {
                    return Tick::Nothing;
                }
                Tick::Repeat(id)
            }
            PressState::Idle => Tick::Nothing,
        }
    }

    /// Record that a repeat fired at `now`.
    pub fn repeated(&mut self, now: Instant) {
        if let PressState::LongPressed { last_fire, .. } = &mut self.press {
            *last_fire = now;
        }
    }

    /// Highlight a key as pressed, bypassing hit-testing.
    pub fn set_pressed(&mut self, id: Option<u16>, now: Instant) {
        self.press = match id {
            Some(id) => PressState::Pressed {
                id,
                since: now,
                over: true,
                pointer: false,
            },
            None => PressState::Idle,
        };
    }

    pub fn set_toggle(&mut self, enabled: bool, id: Option<u16>) {
        self.toggle_enabled = enabled;
        self.toggled = if enabled { id } else { None };
    }

    /// Drop any stored index that no longer names a key.
    pub fn validate(&mut self, btn_count: u16) {
        if self.pressed().is_some_and(|id| id >= btn_count) {
            self.press = PressState::Idle;
        }
        if self.toggled.is_some_and(|id| id >= btn_count) {
            self.toggled = None;
        }
    }
}
