//! Hardware-independent button matrix widget
//!
//! A grid of touch keys described by a compact textual map: the map
//! compiler, row layout, press / long-press / toggle state machine and
//! rendering onto any `embedded-graphics` draw target.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets and desktop hosts (for the simulator and tests).

#![no_std]

extern crate alloc;

pub mod config;
pub mod ui;
