//! Controller state assembly: digital pins plus the two touch sliders.

use serde::Serialize;

use crate::axis::AxisMapper;
use crate::config::{BoardOptions, PinMap};
use crate::frame::TouchFrame;
use crate::tracker::{SideState, SliderTracker};

pub const MASK_UP: u8 = 1 << 0;
pub const MASK_DOWN: u8 = 1 << 1;
pub const MASK_LEFT: u8 = 1 << 2;
pub const MASK_RIGHT: u8 = 1 << 3;

pub const MASK_B1: u16 = 1 << 0;
pub const MASK_B2: u16 = 1 << 1;
pub const MASK_B3: u16 = 1 << 2;
pub const MASK_B4: u16 = 1 << 3;
pub const MASK_L1: u16 = 1 << 4;
pub const MASK_R1: u16 = 1 << 5;
pub const MASK_L2: u16 = 1 << 6;
pub const MASK_R2: u16 = 1 << 7;
pub const MASK_S1: u16 = 1 << 8;
pub const MASK_S2: u16 = 1 << 9;
pub const MASK_L3: u16 = 1 << 10;
pub const MASK_R3: u16 = 1 << 11;
pub const MASK_A1: u16 = 1 << 12;
pub const MASK_A2: u16 = 1 << 13;

pub const MASK_AUX_SETTINGS: u8 = 1 << 0;

/// GPIO word with every pin pulled high, i.e. nothing pressed.
pub const GPIO_IDLE: u32 = u32::MAX;

/// Snapshot handed to the report layer once per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GamepadState {
    pub dpad: u8,
    pub buttons: u16,
    pub aux: u8,
    pub lx: u16,
    pub ly: u16,
    pub rx: u16,
    pub ry: u16,
    pub lt: u8,
    pub rt: u8,
}

impl GamepadState {
    pub fn centred(rest: u16) -> Self {
        Self {
            dpad: 0,
            buttons: 0,
            aux: 0,
            lx: rest,
            ly: rest,
            rx: rest,
            ry: rest,
            lt: 0,
            rt: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ButtonMapping<M> {
    pin_mask: u32,
    button_mask: M,
}

impl<M: Copy + Default> ButtonMapping<M> {
    fn new(pin: u8, button_mask: M) -> Self {
        Self {
            pin_mask: 1u32.checked_shl(u32::from(pin)).unwrap_or(0),
            button_mask,
        }
    }

    fn read(&self, pressed: u32) -> M {
        if pressed & self.pin_mask != 0 {
            self.button_mask
        } else {
            M::default()
        }
    }
}

/// Pin to mask table built from a board's pin map.
#[derive(Debug, Clone)]
pub struct DigitalMap {
    up: ButtonMapping<u8>,
    down: ButtonMapping<u8>,
    left: ButtonMapping<u8>,
    right: ButtonMapping<u8>,
    buttons: [ButtonMapping<u16>; 14],
    settings: Option<ButtonMapping<u8>>,
    invert_y: bool,
}

impl DigitalMap {
    pub fn new(pins: &PinMap, settings_pin: Option<u8>, invert_y: bool) -> Self {
        Self {
            up: ButtonMapping::new(pins.dpad_up, MASK_UP),
            down: ButtonMapping::new(pins.dpad_down, MASK_DOWN),
            left: ButtonMapping::new(pins.dpad_left, MASK_LEFT),
            right: ButtonMapping::new(pins.dpad_right, MASK_RIGHT),
            buttons: [
                ButtonMapping::new(pins.button_b1, MASK_B1),
                ButtonMapping::new(pins.button_b2, MASK_B2),
                ButtonMapping::new(pins.button_b3, MASK_B3),
                ButtonMapping::new(pins.button_b4, MASK_B4),
                ButtonMapping::new(pins.button_l1, MASK_L1),
                ButtonMapping::new(pins.button_r1, MASK_R1),
                ButtonMapping::new(pins.button_l2, MASK_L2),
                ButtonMapping::new(pins.button_r2, MASK_R2),
                ButtonMapping::new(pins.button_s1, MASK_S1),
                ButtonMapping::new(pins.button_s2, MASK_S2),
                ButtonMapping::new(pins.button_l3, MASK_L3),
                ButtonMapping::new(pins.button_r3, MASK_R3),
                ButtonMapping::new(pins.button_a1, MASK_A1),
                ButtonMapping::new(pins.button_a2, MASK_A2),
            ],
            settings: settings_pin.map(|p| ButtonMapping::new(p, MASK_AUX_SETTINGS)),
            invert_y,
        }
    }

    /// Decodes a raw GPIO word. Inputs are pulled up, so a low pin is pressed.
    pub fn read(&self, gpio: u32, state: &mut GamepadState) {
        let pressed = !gpio;

        let (up, down) = if self.invert_y {
            (MASK_DOWN, MASK_UP)
        } else {
            (MASK_UP, MASK_DOWN)
        };
        let mut dpad = 0;
        if self.up.read(pressed) != 0 {
            dpad |= up;
        }
        if self.down.read(pressed) != 0 {
            dpad |= down;
        }
        state.dpad = dpad | self.left.read(pressed) | self.right.read(pressed);

        state.buttons = self
            .buttons
            .iter()
            .fold(0, |acc, m| acc | m.read(pressed));

        state.aux = self.settings.map_or(0, |m| m.read(pressed));
    }
}

/// Owns the per-cycle input pipeline for one board.
#[derive(Debug)]
pub struct Gamepad {
    digital: DigitalMap,
    slider: SliderTracker,
    rest: u16,
}

impl Gamepad {
    pub fn new(board: &BoardOptions, mapper: AxisMapper) -> Self {
        Self {
            digital: DigitalMap::new(&board.pins, board.settings_pin, board.invert_y_axis),
            slider: SliderTracker::new(mapper),
            rest: mapper.rest(),
        }
    }

    /// Runs one polling cycle. Left slider drives `lx`, right slider `rx`.
    pub fn read(&mut self, gpio: u32, frame: &TouchFrame) -> GamepadState {
        let mut state = GamepadState::centred(self.rest);
        self.digital.read(gpio, &mut state);

        let axes = self.slider.update(frame);
        state.lx = axes.left;
        state.rx = axes.right;
        state
    }

    pub fn left_slider(&self) -> &SideState {
        self.slider.left()
    }

    pub fn right_slider(&self) -> &SideState {
        self.slider.right()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{AXIS_MAX, AXIS_MID};
    use crate::config::Profile;
    use crate::frame::TouchWidth;

    fn board() -> BoardOptions {
        Profile::default().board
    }

    fn press(pins: &[u8]) -> u32 {
        pins.iter().fold(GPIO_IDLE, |acc, p| acc & !(1u32 << p))
    }

    #[test]
    fn idle_pins_read_nothing() {
        let map = DigitalMap::new(&board().pins, None, false);
        let mut s = GamepadState::centred(AXIS_MID);
        map.read(GPIO_IDLE, &mut s);
        assert_eq!((s.dpad, s.buttons, s.aux), (0, 0, 0));
    }

    #[test]
    fn pressed_pins_map_to_masks() {
        let b = board();
        let map = DigitalMap::new(&b.pins, None, false);
        let mut s = GamepadState::centred(AXIS_MID);
        map.read(
            press(&[b.pins.dpad_up, b.pins.dpad_left, b.pins.button_b1, b.pins.button_a2]),
            &mut s,
        );
        assert_eq!(s.dpad, MASK_UP | MASK_LEFT);
        assert_eq!(s.buttons, MASK_B1 | MASK_A2);
    }

    #[test]
    fn invert_y_swaps_up_and_down() {
        let b = board();
        let map = DigitalMap::new(&b.pins, None, true);
        let mut s = GamepadState::centred(AXIS_MID);
        map.read(press(&[b.pins.dpad_up]), &mut s);
        assert_eq!(s.dpad, MASK_DOWN);
        map.read(press(&[b.pins.dpad_down, b.pins.dpad_right]), &mut s);
        assert_eq!(s.dpad, MASK_UP | MASK_RIGHT);
    }

    #[test]
    fn settings_pin_sets_aux() {
        let b = board();
        let map = DigitalMap::new(&b.pins, Some(28), false);
        let mut s = GamepadState::centred(AXIS_MID);
        map.read(press(&[28]), &mut s);
        assert_eq!(s.aux, MASK_AUX_SETTINGS);
    }

    #[test]
    fn sliders_drive_lx_and_rx() {
        let mut pad = Gamepad::new(&board(), AxisMapper::default());
        let w = TouchWidth::Single;

        // right slider lands at 2, left at 9
        pad.read(GPIO_IDLE, &TouchFrame::new(0b0010_0000_0110, w));
        let s = pad.read(GPIO_IDLE, &TouchFrame::new(0b0000_0011_0110 << 2, w));
        assert_eq!(pad.right_slider().start, Some(2));
        assert_eq!(s.ly, AXIS_MID);
        assert_eq!(s.ry, AXIS_MID);
        assert_eq!((s.lt, s.rt), (0, 0));
        assert_eq!(s.rx, 54612);
        assert_eq!(pad.left_slider().start, Some(9));
        assert_eq!(s.lx, 10923);
    }

    #[test]
    fn released_frame_recentres() {
        let mut pad = Gamepad::new(&board(), AxisMapper::default());
        let w = TouchWidth::Single;
        pad.read(GPIO_IDLE, &TouchFrame::new(0b11, w));
        let s = pad.read(GPIO_IDLE, &TouchFrame::new(0b11 << 4, w));
        assert_eq!(s.rx, AXIS_MAX);
        let s = pad.read(GPIO_IDLE, &TouchFrame::released(w));
        assert_eq!(s, GamepadState::centred(AXIS_MID));
    }
}
