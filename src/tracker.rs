//! Per-side slide tracking.
//!
//! Each slider behaves like a small relative joystick: the electrode where a
//! touch lands becomes the anchor, and the axis deflects by how far the finger
//! has since moved from it. Lifting the finger recentres the axis and drops the
//! anchor.

use log::debug;
use serde::Serialize;
use std::fmt;

use crate::axis::AxisMapper;
use crate::frame::{Electrode, TouchFrame};
use crate::zones::{self, Zones};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderSide {
    Left,
    Right,
}

impl fmt::Display for SliderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    /// No contact. Also entered on the cycle contact is lost.
    #[default]
    Released,
    /// First cycle of contact; the anchor is set but the axis stays centred.
    TouchStart,
    Dragging,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SideState {
    pub phase: TouchPhase,
    pub last: Option<Electrode>,
    pub start: Option<Electrode>,
    pub current: Option<Electrode>,
}

impl SideState {
    /// Advances one cycle. Returns the drag distance while dragging.
    fn step(&mut self, current: Option<Electrode>) -> Option<i16> {
        let (phase, distance) = match (self.last, current) {
            (None, None) | (Some(_), None) => {
                self.start = None;
                (TouchPhase::Released, None)
            }
            (None, Some(pos)) => {
                self.start = Some(pos);
                (TouchPhase::TouchStart, None)
            }
            (Some(_), Some(pos)) => {
                let anchor = self.start.unwrap_or(pos);
                (
                    TouchPhase::Dragging,
                    Some(i16::from(pos) - i16::from(anchor)),
                )
            }
        };
        self.phase = phase;
        self.current = current;
        self.last = current;
        distance
    }
}

/// Axis values produced for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SliderAxes {
    pub left: u16,
    pub right: u16,
}

#[derive(Debug, Default)]
pub struct SliderTracker {
    left: SideState,
    right: SideState,
    mapper: AxisMapper,
}

impl SliderTracker {
    pub fn new(mapper: AxisMapper) -> Self {
        Self {
            left: SideState::default(),
            right: SideState::default(),
            mapper,
        }
    }

    pub fn left(&self) -> &SideState {
        &self.left
    }

    pub fn right(&self) -> &SideState {
        &self.right
    }

    /// Consumes one frame and returns both axes.
    pub fn update(&mut self, frame: &TouchFrame) -> SliderAxes {
        let previous = Zones {
            right: self.right.last,
            left: self.left.last,
        };
        let zones = zones::detect(frame, previous);

        let left = Self::advance(SliderSide::Left, &mut self.left, zones.left, &self.mapper);
        let right = Self::advance(
            SliderSide::Right,
            &mut self.right,
            zones.right,
            &self.mapper,
        );
        SliderAxes { left, right }
    }

    fn advance(
        side: SliderSide,
        state: &mut SideState,
        current: Option<Electrode>,
        mapper: &AxisMapper,
    ) -> u16 {
        let before = state.phase;
        let distance = state.step(current);
        if state.phase != before {
            debug!(
                "{side} slider: {before:?} -> {:?} (pos={:?}, anchor={:?})",
                state.phase, state.current, state.start
            );
        }
        distance.map_or(mapper.rest(), |d| mapper.map(d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{AXIS_MAX, AXIS_MID, AXIS_MIN};
    use crate::frame::TouchWidth;
    use proptest::prelude::*;

    fn run(start: u8, end: u8) -> u32 {
        (start..end).fold(0u32, |acc, b| acc | (1u32 << b))
    }

    fn feed(t: &mut SliderTracker, bits: u32) -> SliderAxes {
        t.update(&TouchFrame::new(bits, TouchWidth::Single))
    }

    #[test]
    fn starts_released() {
        let t = SliderTracker::default();
        for side in [t.left(), t.right()] {
            assert_eq!(*side, SideState::default());
            assert_eq!(side.phase, TouchPhase::Released);
        }
    }

    #[test]
    fn empty_frames_stay_centred() {
        let mut t = SliderTracker::default();
        for _ in 0..3 {
            let axes = feed(&mut t, 0);
            assert_eq!(axes, SliderAxes { left: AXIS_MID, right: AXIS_MID });
            assert_eq!(t.right().start, None);
            assert_eq!(t.left().current, None);
        }
    }

    #[test]
    fn touch_then_drag_to_full_deflection() {
        let mut t = SliderTracker::default();
        feed(&mut t, 0);

        let axes = feed(&mut t, run(4, 6));
        assert_eq!(t.right().phase, TouchPhase::TouchStart);
        assert_eq!(t.right().start, Some(5));
        assert_eq!(axes.right, AXIS_MID);

        let axes = feed(&mut t, run(7, 9));
        assert_eq!(t.right().phase, TouchPhase::Dragging);
        assert_eq!(t.right().current, Some(8));
        assert_eq!(t.right().start, Some(5));
        assert_eq!(axes.right, AXIS_MAX);
        assert_eq!(axes.left, AXIS_MID);
    }

    #[test]
    fn drag_backwards_to_minimum() {
        let mut t = SliderTracker::default();
        feed(&mut t, run(4, 6));
        let axes = feed(&mut t, run(0, 2));
        assert_eq!(axes.right, AXIS_MIN);
    }

    #[test]
    fn long_drag_saturates() {
        let span = 3;
        let mut a = SliderTracker::default();
        a.update(&TouchFrame::new(run(0, 2), TouchWidth::Triple));
        let three = a.update(&TouchFrame::new(run(span, span + 2), TouchWidth::Triple));

        let mut b = SliderTracker::default();
        b.update(&TouchFrame::new(run(0, 2), TouchWidth::Triple));
        let ten = b.update(&TouchFrame::new(run(10, 12), TouchWidth::Triple));

        assert_eq!(three.right, ten.right);
        assert_eq!(ten.right, AXIS_MAX);
    }

    #[test]
    fn release_then_retouch_gets_new_anchor() {
        let mut t = SliderTracker::default();
        feed(&mut t, run(1, 3));
        feed(&mut t, run(3, 5));
        assert_eq!(t.right().start, Some(2));

        let axes = feed(&mut t, 0);
        assert_eq!(t.right().phase, TouchPhase::Released);
        assert_eq!(t.right().start, None);
        assert_eq!(axes.right, AXIS_MID);

        let axes = feed(&mut t, run(5, 7));
        assert_eq!(t.right().start, Some(6));
        assert_eq!(axes.right, AXIS_MID);

        let axes = feed(&mut t, run(4, 6));
        assert_eq!(axes.right, AXIS_MID - AXIS_MID / 3);
    }

    #[test]
    fn left_cycle_leaves_right_untouched() {
        let mut t = SliderTracker::default();
        let right_hold = run(1, 3);
        feed(&mut t, right_hold);
        feed(&mut t, right_hold);
        let right_before = *t.right();

        for left_bits in [run(7, 9), run(8, 10), run(9, 11), 0] {
            let axes = feed(&mut t, right_hold | left_bits);
            assert_eq!(*t.right(), right_before);
            assert_eq!(axes.right, AXIS_MID);
        }
        assert_eq!(t.left().phase, TouchPhase::Released);
        assert_eq!(t.left().start, None);
    }

    #[test]
    fn both_sides_drag_independently() {
        let mut t = SliderTracker::default();
        feed(&mut t, run(2, 4) | run(8, 10));
        let axes = feed(&mut t, run(3, 5) | run(6, 8));
        assert_eq!(t.right().start, Some(3));
        assert_eq!(t.left().start, Some(9));
        assert_eq!(axes.right, AXIS_MID + AXIS_MID / 3);
        assert_eq!(axes.left, AXIS_MID - 2 * (AXIS_MID / 3));
    }

    #[test]
    fn left_gesture_keeps_side_across_half_boundary() {
        let mut t = SliderTracker::default();
        feed(&mut t, run(8, 10));
        assert_eq!(t.left().start, Some(9));

        // midpoint 6 would be right for a fresh touch
        let axes = feed(&mut t, run(5, 7));
        assert_eq!(t.right().phase, TouchPhase::Released);
        assert_eq!(t.left().phase, TouchPhase::Dragging);
        assert_eq!(t.left().current, Some(6));
        assert_eq!(axes.left, AXIS_MIN);
        assert_eq!(axes.right, AXIS_MID);
    }

    #[test]
    fn left_finger_stays_left_when_right_finger_lands() {
        let mut t = SliderTracker::default();
        feed(&mut t, run(8, 10));
        let axes = feed(&mut t, run(5, 7));
        assert_eq!(axes.left, AXIS_MIN);

        // the left finger has not moved; the new finger belongs to the right
        let axes = feed(&mut t, run(5, 7) | run(9, 11));
        assert_eq!(t.left().phase, TouchPhase::Dragging);
        assert_eq!(t.left().start, Some(9));
        assert_eq!(t.left().current, Some(6));
        assert_eq!(axes.left, AXIS_MIN);
        assert_eq!(t.right().phase, TouchPhase::TouchStart);
        assert_eq!(t.right().start, Some(10));
        assert_eq!(axes.right, AXIS_MID);
    }

    #[test]
    fn spanning_sensor_groups_in_triple_mode() {
        let mut t = SliderTracker::default();
        t.update(&TouchFrame::new(run(10, 14), TouchWidth::Triple));
        assert_eq!(t.right().current, Some(12));
        assert_eq!(t.left().current, None);
    }

    proptest! {
        #[test]
        fn prop_empty_frame_always_releases(frames in proptest::collection::vec(any::<u32>(), 1..40)) {
            let mut t = SliderTracker::default();
            for bits in frames {
                let axes = t.update(&TouchFrame::new(bits, TouchWidth::Triple));
                if bits == 0 {
                    prop_assert_eq!(axes, SliderAxes { left: AXIS_MID, right: AXIS_MID });
                    prop_assert_eq!(t.left().phase, TouchPhase::Released);
                    prop_assert_eq!(t.right().phase, TouchPhase::Released);
                }
                prop_assert_eq!(t.left().last, t.left().current);
                prop_assert_eq!(t.right().last, t.right().current);
            }
        }
    }
}
