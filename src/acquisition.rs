//! Touch acquisition: turns one or three 12-electrode sensors into a frame.

use log::{info, warn};

use crate::error::SensorError;
use crate::frame::{TouchFrame, TouchWidth};

/// Electrodes per sensor chip.
pub const SENSOR_ELECTRODES: u32 = 12;
const SENSOR_MASK: u32 = (1 << SENSOR_ELECTRODES) - 1;

/// One capacitive sensor chip. `touched` returns the electrode bitmask, bit 0
/// being the chip's first electrode.
pub trait TouchSensor {
    fn touched(&mut self) -> Result<u16, SensorError>;
}

impl<S: TouchSensor + ?Sized> TouchSensor for Box<S> {
    fn touched(&mut self) -> Result<u16, SensorError> {
        (**self).touched()
    }
}

/// Sensors in address order. A slot is `None` when the chip failed to come up.
pub struct TouchAdapter<S> {
    width: TouchWidth,
    sensors: Vec<Option<S>>,
    available: bool,
}

impl<S: TouchSensor> TouchAdapter<S> {
    pub fn new(width: TouchWidth, sensors: Vec<Option<S>>) -> Self {
        let needed = sensors_for(width);
        if sensors.len() < needed {
            warn!(
                "touch: {} sensor(s) configured, {} needed for {} electrodes",
                sensors.len(),
                needed,
                width.electrodes()
            );
        }
        Self {
            width,
            sensors,
            available: true,
        }
    }

    /// Reads every sensor for this cycle. Any missing or failing sensor makes
    /// the whole frame read as released.
    pub fn read_frame(&mut self) -> TouchFrame {
        match self.read_bits() {
            Ok(bits) => {
                if !self.available {
                    info!("touch: sensors available again");
                    self.available = true;
                }
                TouchFrame::new(bits, self.width)
            }
            Err(e) => {
                if self.available {
                    warn!("touch: {e}; reporting released frames");
                    self.available = false;
                }
                TouchFrame::released(self.width)
            }
        }
    }

    /// Chip `index` in address order, if it came up.
    pub fn sensor_mut(&mut self, index: usize) -> Option<&mut S> {
        self.sensors.get_mut(index).and_then(Option::as_mut)
    }

    /// Polls every chip each cycle, even after a failure, so all chips stay on
    /// the same sample.
    fn read_bits(&mut self) -> Result<u32, SensorError> {
        let needed = sensors_for(self.width);
        if self.sensors.len() < needed {
            return Err(SensorError::NoResponse);
        }
        let mut bits = 0u32;
        let mut failure = None;
        for (i, slot) in self.sensors.iter_mut().take(needed).enumerate() {
            let reading = match slot.as_mut() {
                Some(sensor) => sensor.touched(),
                None => Err(SensorError::NoResponse),
            };
            match reading {
                Ok(raw) => {
                    let raw = u32::from(raw) & SENSOR_MASK;
                    bits |= raw.checked_shl(i as u32 * SENSOR_ELECTRODES).unwrap_or(0);
                }
                Err(e) if failure.is_none() => failure = Some(e),
                Err(_) => {}
            }
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(bits),
        }
    }
}

fn sensors_for(width: TouchWidth) -> usize {
    match width {
        TouchWidth::Single => 1,
        TouchWidth::Triple => 3,
    }
}

/// Sensor that replays a prepared sequence of masks, then reads as untouched.
#[derive(Debug, Default)]
pub struct ScriptedSensor {
    readings: std::collections::VecDeque<Result<u16, SensorError>>,
}

impl ScriptedSensor {
    pub fn new<I: IntoIterator<Item = Result<u16, SensorError>>>(readings: I) -> Self {
        Self {
            readings: readings.into_iter().collect(),
        }
    }

    pub fn push(&mut self, reading: Result<u16, SensorError>) {
        self.readings.push_back(reading);
    }
}

impl TouchSensor for ScriptedSensor {
    fn touched(&mut self) -> Result<u16, SensorError> {
        self.readings.pop_front().unwrap_or(Ok(0))
    }
}
