//! Drives the full input pipeline from a trace, one cycle per line.

use serde::Serialize;

use crate::acquisition::{SENSOR_ELECTRODES, ScriptedSensor, TouchAdapter};
use crate::config::Profile;
use crate::error::SensorError;
use crate::gamepad::{Gamepad, GamepadState};
use crate::trace::{Cycle, TouchReading};
use crate::tracker::SideState;

/// What one cycle produced, as printed by `slidepad replay`.
#[derive(Debug, Clone, Serialize)]
pub struct CycleRecord {
    pub cycle: usize,
    pub line: usize,
    pub touched: u32,
    #[serde(flatten)]
    pub state: GamepadState,
    pub left: SideState,
    pub right: SideState,
}

pub struct Replay {
    adapter: TouchAdapter<ScriptedSensor>,
    gamepad: Gamepad,
    chips: usize,
    cycle: usize,
}

impl Replay {
    pub fn new(profile: &Profile) -> Self {
        let width = profile.touch_width();
        let chips = (usize::from(width.electrodes())).div_ceil(SENSOR_ELECTRODES as usize);
        let sensors = (0..chips).map(|_| Some(ScriptedSensor::default())).collect();
        Self {
            adapter: TouchAdapter::new(width, sensors),
            gamepad: Gamepad::new(&profile.board, profile.axis_mapper()),
            chips,
            cycle: 0,
        }
    }

    /// Splits the trace's touch word back into per-chip readings, polls the
    /// adapter and runs one gamepad cycle.
    pub fn step(&mut self, c: &Cycle) -> CycleRecord {
        for chip in 0..self.chips {
            let reading = match c.touch {
                TouchReading::Mask(bits) => {
                    let shifted = bits
                        .checked_shr(chip as u32 * SENSOR_ELECTRODES)
                        .unwrap_or(0);
                    Ok((shifted & 0x0FFF) as u16)
                }
                TouchReading::Unavailable if chip == 0 => Err(SensorError::NoResponse),
                TouchReading::Unavailable => Ok(0),
            };
            if let Some(sensor) = self.adapter.sensor_mut(chip) {
                sensor.push(reading);
            }
        }

        let frame = self.adapter.read_frame();
        let state = self.gamepad.read(c.gpio, &frame);
        self.cycle += 1;
        CycleRecord {
            cycle: self.cycle,
            line: c.line,
            touched: frame.bitmask(),
            state,
            left: *self.gamepad.left_slider(),
            right: *self.gamepad.right_slider(),
        }
    }

    pub fn run(&mut self, cycles: &[Cycle]) -> Vec<CycleRecord> {
        cycles.iter().map(|c| self.step(c)).collect()
    }
}
