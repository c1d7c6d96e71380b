//! Splits a touch frame into the right and left slider zones.
//!
//! The strip is wired so that the lowest electrode addresses belong to the
//! right slider. A frame is scanned from bit 0 upward for value changes; the
//! first run of touched electrodes is the right slider's, the second is the
//! left slider's. Runs after the second are sensor noise and never examined.

use crate::frame::{Electrode, TouchFrame};

const MAX_EDGES: usize = 4;

/// Contiguous touched run `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchSpan {
    pub start: Electrode,
    pub end: Electrode,
}

impl TouchSpan {
    pub fn midpoint(&self) -> Electrode {
        (self.start + self.end) / 2
    }
}

/// Position assigned to each slider for one frame. `None` means not touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zones {
    pub right: Option<Electrode>,
    pub left: Option<Electrode>,
}

impl Zones {
    pub const RELEASED: Zones = Zones {
        right: None,
        left: None,
    };
}

/// Finds the first two spans of `frame`, lowest address first.
///
/// Bit `width` is a boundary that always reads as untouched, so a run reaching
/// the top electrode is still closed.
pub fn spans(frame: &TouchFrame) -> [Option<TouchSpan>; 2] {
    let mut edges = [0 as Electrode; MAX_EDGES];
    let mut found = 0;
    let mut prev = false;

    for bit in 0..=frame.width().electrodes() {
        if found == MAX_EDGES {
            break;
        }
        let cur = frame.is_touched(bit);
        if cur != prev {
            edges[found] = bit;
            found += 1;
        }
        prev = cur;
    }

    let pair = |i: usize| {
        (found >= i + 2).then(|| TouchSpan {
            start: edges[i],
            end: edges[i + 1],
        })
    };
    [pair(0), pair(2)]
}

/// Assigns this frame's spans to the two sliders.
///
/// `previous` is the assignment from the prior frame. A slider that was
/// already being dragged keeps the span nearest its last position, so a
/// gesture never jumps sides mid-drag.
pub fn detect(frame: &TouchFrame, previous: Zones) -> Zones {
    match spans(frame) {
        [None, _] => Zones::RELEASED,
        [Some(first), Some(second)] => assign_pair(first.midpoint(), second.midpoint(), previous),
        [Some(lone), None] => assign_lone(lone.midpoint(), frame, previous),
    }
}

/// `lower` and `upper` go right and left by address unless exactly one side
/// was active and the other span is strictly nearer to it.
fn assign_pair(lower: Electrode, upper: Electrode, previous: Zones) -> Zones {
    let swapped = match (previous.right, previous.left) {
        (Some(r), None) => r.abs_diff(upper) < r.abs_diff(lower),
        (None, Some(l)) => l.abs_diff(lower) < l.abs_diff(upper),
        _ => false,
    };
    if swapped {
        Zones {
            right: Some(upper),
            left: Some(lower),
        }
    } else {
        Zones {
            right: Some(lower),
            left: Some(upper),
        }
    }
}

fn assign_lone(pos: Electrode, frame: &TouchFrame, previous: Zones) -> Zones {
    let right = Zones {
        right: Some(pos),
        left: None,
    };
    let left = Zones {
        right: None,
        left: Some(pos),
    };

    match (previous.right, previous.left) {
        (Some(_), None) => right,
        (None, Some(_)) => left,
        (Some(r), Some(l)) if r.abs_diff(pos) < l.abs_diff(pos) => right,
        (Some(r), Some(l)) if l.abs_diff(pos) < r.abs_diff(pos) => left,
        _ if pos <= frame.width().half() => right,
        _ => left,
    }
}
