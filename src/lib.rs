//! Input core for a touch-slider game controller.
//!
//! Each polling cycle the [`acquisition`] adapter produces a [`frame::TouchFrame`],
//! the [`tracker`] turns it into two slider axes, and [`gamepad`] merges those
//! with the digital pins into a [`gamepad::GamepadState`].

pub mod acquisition;
pub mod axis;
pub mod config;
pub mod error;
pub mod frame;
pub mod gamepad;
pub mod replay;
pub mod trace;
pub mod tracker;
pub mod zones;
