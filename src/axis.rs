//! Drag distance to analog axis mapping.

use serde::{Deserialize, Serialize};

pub const AXIS_MIN: u16 = 0x0000;
pub const AXIS_MID: u16 = 0x7FFF;
pub const AXIS_MAX: u16 = 0xFFFF;

/// Electrodes of travel that give full deflection.
pub const DEFAULT_DRAG_SPAN: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: u16,
    pub mid: u16,
    pub max: u16,
}

impl Default for AxisRange {
    fn default() -> Self {
        Self {
            min: AXIS_MIN,
            mid: AXIS_MID,
            max: AXIS_MAX,
        }
    }
}

/// Linear map from a drag distance to an axis value.
///
/// Distances are clamped to `±span`. The positive and negative halves scale
/// independently so `+span` lands exactly on `max` and `-span` on `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisMapper {
    range: AxisRange,
    span: u8,
}

impl Default for AxisMapper {
    fn default() -> Self {
        Self::new(AxisRange::default(), DEFAULT_DRAG_SPAN)
    }
}

impl AxisMapper {
    /// `span` of zero is treated as one.
    pub fn new(range: AxisRange, span: u8) -> Self {
        Self {
            range,
            span: span.max(1),
        }
    }

    pub fn rest(&self) -> u16 {
        self.range.mid
    }

    pub fn span(&self) -> u8 {
        self.span
    }

    pub fn clamp_distance(&self, distance: i16) -> i16 {
        let span = i16::from(self.span);
        distance.clamp(-span, span)
    }

    pub fn map(&self, distance: i16) -> u16 {
        let d = i32::from(self.clamp_distance(distance));
        let span = i32::from(self.span);
        let mid = i32::from(self.range.mid);
        let value = if d >= 0 {
            mid + d * (i32::from(self.range.max) - mid) / span
        } else {
            mid + d * (mid - i32::from(self.range.min)) / span
        };
        value.clamp(0, i32::from(u16::MAX)) as u16
    }
}
