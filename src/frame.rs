//! Per-cycle touch input.

use serde::Serialize;

/// Index of one electrode on the strip.
pub type Electrode = u8;

/// Number of electrodes the acquisition side reports: one sensor or three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TouchWidth {
    Single,
    Triple,
}

impl TouchWidth {
    pub fn from_electrodes(n: u8) -> Option<Self> {
        match n {
            12 => Some(Self::Single),
            32 => Some(Self::Triple),
            _ => None,
        }
    }

    pub fn electrodes(self) -> u8 {
        match self {
            Self::Single => 12,
            Self::Triple => 32,
        }
    }

    /// Boundary used to place a lone span on the right or left half.
    pub fn half(self) -> Electrode {
        self.electrodes() / 2
    }

    pub fn mask(self) -> u32 {
        match self {
            Self::Single => 0x0FFF,
            Self::Triple => u32::MAX,
        }
    }
}

/// Touched-electrode bitmask for one polling cycle. Bit `n` is electrode `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchFrame {
    bitmask: u32,
    width: TouchWidth,
}

impl TouchFrame {
    /// Bits at or above the width are dropped.
    pub fn new(bitmask: u32, width: TouchWidth) -> Self {
        Self {
            bitmask: bitmask & width.mask(),
            width,
        }
    }

    pub fn released(width: TouchWidth) -> Self {
        Self { bitmask: 0, width }
    }

    pub fn bitmask(&self) -> u32 {
        self.bitmask
    }

    pub fn width(&self) -> TouchWidth {
        self.width
    }

    /// State of electrode `bit`; anything past the strip reads as untouched.
    pub fn is_touched(&self, bit: u8) -> bool {
        bit < self.width.electrodes() && self.bitmask & (1u32 << bit) != 0
    }
}
