//! State fusion and HID report encoding for both personalities.

use crate::slider::{Axes, SliderMask};
use crate::types::{ButtonMask, Control, Personality, NUM_BUTTONS};

/// Logical control identifiers of the canonical control table.
///
/// Follows the Switch convention (X up, B down on the face cluster).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Slot {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
    A = 4,
    B = 5,
    X = 6,
    Y = 7,
    Lb = 8,
    Rb = 9,
    Lt = 10,
    Rt = 11,
    Start = 12,
    Select = 13,
    AxisLx = 14,
    AxisLy = 15,
    AxisRx = 16,
    AxisRy = 17,
    L3 = 18,
    R3 = 19,
    Home = 20,
    Capture = 21,
}

/// Number of slots in the canonical table.
pub const NUM_SLOTS: usize = 22;

/// Logical slot of each physical control, in wiring order.
pub const GAMEPAD_LAYOUT: [Slot; NUM_BUTTONS] = [
    Slot::X,
    Slot::Y,
    Slot::B,
    Slot::A,
    Slot::Lb,
    Slot::Rb,
    Slot::Lt,
    Slot::Rt,
    Slot::Select,
    Slot::Start,
    Slot::Home,
    Slot::R3,
    Slot::L3,
    Slot::Up,
    Slot::Right,
    Slot::Down,
    Slot::Left,
];

/// Per-cycle snapshot of every logical control. Buttons hold 0 or 1,
/// axis slots hold the centred lane value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlTable {
    slots: [u8; NUM_SLOTS],
}

impl ControlTable {
    /// Fuse the sampled buttons and the slider mask.
    #[must_use]
    pub fn build(buttons: ButtonMask, slider: SliderMask) -> Self {
        let mut slots = [0u8; NUM_SLOTS];

        for (control, slot) in Control::ALL.iter().zip(GAMEPAD_LAYOUT) {
            slots[slot as usize] = u8::from(buttons.is_pressed(*control));
        }

        let axes = Axes::from_mask(slider);
        slots[Slot::AxisLx as usize] = axes.lx;
        slots[Slot::AxisLy as usize] = axes.ly;
        slots[Slot::AxisRx as usize] = axes.rx;
        slots[Slot::AxisRy as usize] = axes.ry;

        Self { slots }
    }

    /// Raw slot value.
    #[inline]
    #[must_use]
    pub const fn get(&self, slot: Slot) -> u8 {
        self.slots[slot as usize]
    }

    /// `true` if a button slot is asserted.
    #[inline]
    #[must_use]
    pub const fn is_set(&self, slot: Slot) -> bool {
        self.slots[slot as usize] != 0
    }
}

/// HAT switch position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Hat {
    Up = 0,
    UpRight = 1,
    Right = 2,
    DownRight = 3,
    Down = 4,
    DownLeft = 5,
    Left = 6,
    UpLeft = 7,
    Centered = 8,
}

impl Hat {
    /// Resolve four direction booleans, diagonals first.
    ///
    /// Opposite pairs have no branch of their own: up+down resolves as up,
    /// left+right as left, and up+down+left+right as up-right.
    #[must_use]
    pub const fn from_directions(up: bool, down: bool, left: bool, right: bool) -> Self {
        if up && right {
            Self::UpRight
        } else if down && right {
            Self::DownRight
        } else if down && left {
            Self::DownLeft
        } else if up && left {
            Self::UpLeft
        } else if up {
            Self::Up
        } else if down {
            Self::Down
        } else if left {
            Self::Left
        } else if right {
            Self::Right
        } else {
            Self::Centered
        }
    }
}

/// Gamepad button bits in the report's 16-bit field.
pub mod gamepad_bits {
    pub const Y: u16 = 0x0001;
    pub const B: u16 = 0x0002;
    pub const A: u16 = 0x0004;
    pub const X: u16 = 0x0008;
    pub const L: u16 = 0x0010;
    pub const R: u16 = 0x0020;
    pub const ZL: u16 = 0x0040;
    pub const ZR: u16 = 0x0080;
    pub const SELECT: u16 = 0x0100;
    pub const START: u16 = 0x0200;
    pub const L3: u16 = 0x0400;
    pub const R3: u16 = 0x0800;
    pub const HOME: u16 = 0x1000;
    pub const CAPTURE: u16 = 0x2000;
}

const GAMEPAD_BUTTONS: [(Slot, u16); 14] = [
    (Slot::A, gamepad_bits::A),
    (Slot::B, gamepad_bits::B),
    (Slot::X, gamepad_bits::X),
    (Slot::Y, gamepad_bits::Y),
    (Slot::Lb, gamepad_bits::L),
    (Slot::Rb, gamepad_bits::R),
    (Slot::Lt, gamepad_bits::ZL),
    (Slot::Rt, gamepad_bits::ZR),
    (Slot::Start, gamepad_bits::START),
    (Slot::Select, gamepad_bits::SELECT),
    (Slot::Home, gamepad_bits::HOME),
    (Slot::L3, gamepad_bits::L3),
    (Slot::R3, gamepad_bits::R3),
    (Slot::Capture, gamepad_bits::CAPTURE),
];

/// HORI-style joystick input report.
///
/// Total size: 8 bytes (buttons: 2, HAT: 1, axes: 4, vendor: 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GamepadReport {
    /// Button bitfield, see [`gamepad_bits`].
    pub buttons: u16,
    /// HAT position in the low nibble.
    pub hat: Hat,
    pub lx: u8,
    pub ly: u8,
    pub rx: u8,
    pub ry: u8,
    /// Vendor-specific byte, always 0.
    pub vendor: u8,
}

impl GamepadReport {
    /// Size of the report in bytes.
    pub const SIZE: usize = 8;

    /// Neutral report: no buttons, HAT centred, axes centred.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            buttons: 0,
            hat: Hat::Centered,
            lx: Axes::CENTERED.lx,
            ly: Axes::CENTERED.ly,
            rx: Axes::CENTERED.rx,
            ry: Axes::CENTERED.ry,
            vendor: 0,
        }
    }

    /// Render from the canonical table.
    #[must_use]
    pub fn from_table(table: &ControlTable) -> Self {
        let buttons = GAMEPAD_BUTTONS
            .iter()
            .filter(|(slot, _)| table.is_set(*slot))
            .fold(0u16, |acc, (_, bit)| acc | bit);

        Self {
            buttons,
            hat: Hat::from_directions(
                table.is_set(Slot::Up),
                table.is_set(Slot::Down),
                table.is_set(Slot::Left),
                table.is_set(Slot::Right),
            ),
            lx: table.get(Slot::AxisLx),
            ly: table.get(Slot::AxisLy),
            rx: table.get(Slot::AxisRx),
            ry: table.get(Slot::AxisRy),
            vendor: 0,
        }
    }

    /// Convert the report to bytes.
    #[must_use]
    pub fn as_bytes(&self) -> [u8; Self::SIZE] {
        let [lo, hi] = self.buttons.to_le_bytes();
        [
            lo,
            hi,
            self.hat as u8,
            self.lx,
            self.ly,
            self.rx,
            self.ry,
            self.vendor,
        ]
    }
}

/// HID keyboard usage codes used by the keyboard personality.
pub mod keys {
    pub const Q: u8 = 0x14;
    pub const W: u8 = 0x1A;
    pub const O: u8 = 0x12;
    pub const P: u8 = 0x13;
    pub const N1: u8 = 0x1E;
    pub const N2: u8 = 0x1F;
    pub const N3: u8 = 0x20;
    pub const N4: u8 = 0x21;
    pub const N5: u8 = 0x22;
    pub const N6: u8 = 0x23;
    pub const N7: u8 = 0x24;
    pub const N8: u8 = 0x25;
    pub const N9: u8 = 0x26;
    pub const N0: u8 = 0x27;
    pub const MINUS: u8 = 0x2D;
    pub const EQUAL: u8 = 0x2E;
    /// First modifier usage (left control).
    pub const MODIFIER_FIRST: u8 = 0xE0;
    /// Last modifier usage (right GUI).
    pub const MODIFIER_LAST: u8 = 0xE7;
}

/// Keys for triangle, square, cross, circle.
pub const BUTTON_KEYS: [u8; 4] = [keys::Q, keys::W, keys::O, keys::P];

/// Slider keys from the top of the strip to the bottom.
pub const SLIDER_KEYS: [u8; 12] = [
    keys::N1,
    keys::N2,
    keys::N3,
    keys::N4,
    keys::N5,
    keys::N6,
    keys::N7,
    keys::N8,
    keys::N9,
    keys::N0,
    keys::MINUS,
    keys::EQUAL,
];

/// Mask bits that count as the top extreme of the strip.
const SLIDER_TOP: u32 = 0b111 << 29;
/// Mask bits that count as the bottom extreme of the strip.
const SLIDER_BOTTOM: u32 = 0b111;

/// Two-bit window of the slider mask mapped to slider key `i`.
#[must_use]
pub const fn slider_window(i: usize) -> u32 {
    0b11 << (26 - 2 * i)
}

/// N-key-rollover keyboard report: modifier byte plus a 248-key bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport(pub [u8; KeyboardReport::SIZE]);

impl KeyboardReport {
    /// Size of the report in bytes.
    pub const SIZE: usize = 32;

    /// No keys held.
    #[must_use]
    pub const fn empty() -> Self {
        Self([0; Self::SIZE])
    }

    /// Mark `code` as held. Codes outside the bitmap are silently dropped.
    pub fn press(&mut self, code: u8) {
        if (keys::MODIFIER_FIRST..=keys::MODIFIER_LAST).contains(&code) {
            self.0[0] |= 1 << (code - keys::MODIFIER_FIRST);
            return;
        }

        let byte = usize::from(code / 8) + 1;
        if byte < Self::SIZE {
            self.0[byte] |= 1 << (code % 8);
        }
    }

    /// Check whether `code` is held.
    #[must_use]
    pub fn is_pressed(&self, code: u8) -> bool {
        if (keys::MODIFIER_FIRST..=keys::MODIFIER_LAST).contains(&code) {
            return self.0[0] & (1 << (code - keys::MODIFIER_FIRST)) != 0;
        }

        let byte = usize::from(code / 8) + 1;
        byte < Self::SIZE && self.0[byte] & (1 << (code % 8)) != 0
    }

    /// Render buttons and the raw slider mask.
    #[must_use]
    pub fn build(buttons: ButtonMask, slider: SliderMask) -> Self {
        let mut report = Self::empty();

        for (line, &code) in BUTTON_KEYS.iter().enumerate() {
            if buttons.bit(line) {
                report.press(code);
            }
        }

        if slider.intersects(SLIDER_TOP) {
            report.press(SLIDER_KEYS[0]);
        }

        for (i, &code) in SLIDER_KEYS.iter().enumerate() {
            if slider.intersects(slider_window(i)) {
                report.press(code);
            }
        }

        if slider.intersects(SLIDER_BOTTOM) {
            report.press(SLIDER_KEYS[SLIDER_KEYS.len() - 1]);
        }

        report
    }

    /// Report bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; Self::SIZE] {
        &self.0
    }
}

/// A rendered report for the active personality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Report {
    Gamepad(GamepadReport),
    Keyboard(KeyboardReport),
}

impl Report {
    /// Build the report for `personality`. Pure and deterministic.
    #[must_use]
    pub fn encode(personality: Personality, buttons: ButtonMask, slider: SliderMask) -> Self {
        match personality {
            Personality::Gamepad => {
                Self::Gamepad(GamepadReport::from_table(&ControlTable::build(buttons, slider)))
            }
            Personality::Keyboard => Self::Keyboard(KeyboardReport::build(buttons, slider)),
        }
    }

    /// Personality this report belongs to.
    #[must_use]
    pub const fn personality(&self) -> Personality {
        match self {
            Self::Gamepad(_) => Personality::Gamepad,
            Self::Keyboard(_) => Personality::Keyboard,
        }
    }

    /// Copy the wire bytes into `buf` and return the used length.
    ///
    /// `buf` must hold at least [`KeyboardReport::SIZE`] bytes.
    pub fn write_to(&self, buf: &mut [u8; KeyboardReport::SIZE]) -> usize {
        match self {
            Self::Gamepad(report) => {
                buf[..GamepadReport::SIZE].copy_from_slice(&report.as_bytes());
                GamepadReport::SIZE
            }
            Self::Keyboard(report) => {
                buf.copy_from_slice(report.as_bytes());
                KeyboardReport::SIZE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(controls: &[Control]) -> ButtonMask {
        controls
            .iter()
            .fold(ButtonMask::NONE, |mask, c| mask | c.mask())
    }

    #[test]
    fn test_neutral_gamepad_report() {
        let report = GamepadReport::from_table(&ControlTable::build(
            ButtonMask::NONE,
            SliderMask::EMPTY,
        ));
        assert_eq!(report, GamepadReport::neutral());
        assert_eq!(report.as_bytes(), [0, 0, 8, 0x80, 0x80, 0x80, 0x80, 0]);
    }

    #[test]
    fn test_face_buttons_permuted() {
        let table = ControlTable::build(press(&[Control::Triangle, Control::Circle]), SliderMask::EMPTY);
        assert!(table.is_set(Slot::X));
        assert!(table.is_set(Slot::A));
        assert!(!table.is_set(Slot::Y));
        let report = GamepadReport::from_table(&table);
        assert_eq!(report.buttons, gamepad_bits::X | gamepad_bits::A);
    }

    #[test]
    fn test_every_button_bit() {
        let cases = [
            (Control::Triangle, gamepad_bits::X),
            (Control::Square, gamepad_bits::Y),
            (Control::Cross, gamepad_bits::B),
            (Control::Circle, gamepad_bits::A),
            (Control::L1, gamepad_bits::L),
            (Control::R1, gamepad_bits::R),
            (Control::L2, gamepad_bits::ZL),
            (Control::R2, gamepad_bits::ZR),
            (Control::Share, gamepad_bits::SELECT),
            (Control::Options, gamepad_bits::START),
            (Control::Home, gamepad_bits::HOME),
            (Control::R3, gamepad_bits::R3),
            (Control::L3, gamepad_bits::L3),
        ];
        for (control, bit) in cases {
            let report = match Report::encode(Personality::Gamepad, control.mask(), SliderMask::EMPTY) {
                Report::Gamepad(report) => report,
                Report::Keyboard(_) => unreachable!(),
            };
            assert_eq!(report.buttons, bit, "{control:?}");
            assert_eq!(report.hat, Hat::Centered);
        }
    }

    #[test]
    fn test_dpad_drives_hat_not_buttons() {
        let table = ControlTable::build(press(&[Control::Up, Control::Right]), SliderMask::EMPTY);
        let report = GamepadReport::from_table(&table);
        assert_eq!(report.buttons, 0);
        assert_eq!(report.hat, Hat::UpRight);
        assert_eq!(report.as_bytes()[2], 1);
    }

    #[test]
    fn test_hat_priority() {
        use Hat::*;
        let cases = [
            ((false, false, false, false), Centered),
            ((true, false, false, false), Up),
            ((false, true, false, false), Down),
            ((false, false, true, false), Left),
            ((false, false, false, true), Right),
            ((true, false, false, true), UpRight),
            ((false, true, false, true), DownRight),
            ((false, true, true, false), DownLeft),
            ((true, false, true, false), UpLeft),
            ((true, true, false, false), Up),
            ((false, false, true, true), Left),
            ((true, true, true, true), UpRight),
        ];
        for ((up, down, left, right), expected) in cases {
            assert_eq!(Hat::from_directions(up, down, left, right), expected);
        }
    }

    #[test]
    fn test_axes_follow_slider() {
        let report = GamepadReport::from_table(&ControlTable::build(
            ButtonMask::NONE,
            SliderMask(0xFF00_0001),
        ));
        assert_eq!([report.lx, report.ly, report.rx, report.ry], [0x81, 0x80, 0x80, 0x7F]);
    }

    #[test]
    fn test_keyboard_buttons() {
        let report = KeyboardReport::build(press(&[Control::Triangle, Control::Circle]), SliderMask::EMPTY);
        assert!(report.is_pressed(keys::Q));
        assert!(report.is_pressed(keys::P));
        assert!(!report.is_pressed(keys::W));
        // Q = 0x14 and P = 0x13 share byte 3.
        assert_eq!(report.as_bytes()[3], (1 << 4) | (1 << 3));
    }

    #[test]
    fn test_keyboard_ignores_other_buttons() {
        let report = KeyboardReport::build(press(&[Control::Home, Control::Up]), SliderMask::EMPTY);
        assert_eq!(report, KeyboardReport::empty());
    }

    #[test]
    fn test_slider_extremes() {
        let top = KeyboardReport::build(ButtonMask::NONE, SliderMask(1 << 31));
        assert!(top.is_pressed(keys::N1));
        assert!(!top.is_pressed(keys::N2));

        let bottom = KeyboardReport::build(ButtonMask::NONE, SliderMask(1));
        assert!(bottom.is_pressed(keys::EQUAL));
        assert!(!bottom.is_pressed(keys::MINUS));
    }

    #[test]
    fn test_slider_windows() {
        for (i, &code) in SLIDER_KEYS.iter().enumerate() {
            let report = KeyboardReport::build(ButtonMask::NONE, SliderMask(slider_window(i)));
            assert!(report.is_pressed(code), "window {i}");
            let pressed = SLIDER_KEYS.iter().filter(|&&k| report.is_pressed(k)).count();
            assert_eq!(pressed, 1, "window {i}");
        }
    }

    #[test]
    fn test_empty_slider_no_keys() {
        let report = KeyboardReport::build(ButtonMask::NONE, SliderMask::EMPTY);
        assert_eq!(report, KeyboardReport::empty());
    }

    #[test]
    fn test_modifiers_and_out_of_range() {
        let mut report = KeyboardReport::empty();
        report.press(keys::MODIFIER_FIRST + 1);
        assert_eq!(report.as_bytes()[0], 0b10);
        report.press(0xF8);
        report.press(0xFF);
        let mut expected = [0u8; KeyboardReport::SIZE];
        expected[0] = 0b10;
        assert_eq!(report.as_bytes(), &expected);
        assert!(!report.is_pressed(0xFF));
    }

    #[test]
    fn test_write_to() {
        let mut buf = [0xAA; KeyboardReport::SIZE];
        let report = Report::encode(Personality::Gamepad, ButtonMask::NONE, SliderMask::EMPTY);
        assert_eq!(report.write_to(&mut buf), GamepadReport::SIZE);
        assert_eq!(buf[2], Hat::Centered as u8);

        let report = Report::encode(Personality::Keyboard, ButtonMask::NONE, SliderMask::EMPTY);
        assert_eq!(report.personality(), Personality::Keyboard);
        assert_eq!(report.write_to(&mut buf), KeyboardReport::SIZE);
        assert_eq!(buf, [0; KeyboardReport::SIZE]);
    }
}
