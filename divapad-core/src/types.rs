//! Core controller types: physical controls, button mask, personality.

use core::ops::{BitOr, BitOrAssign};

/// Number of discrete physical controls.
pub const NUM_BUTTONS: usize = 17;

/// Physical control, in wiring order. The discriminant is the bit index in
/// a [`ButtonMask`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Control {
    Triangle = 0,
    Square = 1,
    Cross = 2,
    Circle = 3,
    L1 = 4,
    R1 = 5,
    L2 = 6,
    R2 = 7,
    Share = 8,
    Options = 9,
    Home = 10,
    R3 = 11,
    L3 = 12,
    Up = 13,
    Right = 14,
    Down = 15,
    Left = 16,
}

impl Control {
    /// Every control in wiring order.
    pub const ALL: [Self; NUM_BUTTONS] = [
        Self::Triangle,
        Self::Square,
        Self::Cross,
        Self::Circle,
        Self::L1,
        Self::R1,
        Self::L2,
        Self::R2,
        Self::Share,
        Self::Options,
        Self::Home,
        Self::R3,
        Self::L3,
        Self::Up,
        Self::Right,
        Self::Down,
        Self::Left,
    ];

    /// Bit index inside a [`ButtonMask`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Single-bit mask for this control.
    #[inline]
    #[must_use]
    pub const fn mask(self) -> ButtonMask {
        ButtonMask(1 << (self as u32))
    }
}

/// Currently asserted physical controls, bit `i` = [`Control`] with index `i`.
///
/// Rebuilt from scratch on every sampling pass.
///
/// ```
/// use divapad_core::{ButtonMask, Control};
///
/// let mask = Control::Home.mask() | Control::Circle.mask();
/// assert!(mask.is_pressed(Control::Home));
/// assert!(!mask.is_pressed(Control::Cross));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonMask(pub u32);

impl ButtonMask {
    /// Nothing pressed.
    pub const NONE: Self = Self(0);

    /// Check if a control is asserted.
    #[inline]
    #[must_use]
    pub const fn is_pressed(self, control: Control) -> bool {
        self.0 & (1 << (control as u32)) != 0
    }

    /// Check if the bit at `index` is set.
    #[inline]
    #[must_use]
    pub const fn bit(self, index: usize) -> bool {
        index < 32 && (self.0 >> index) & 1 != 0
    }

    /// Set or clear a control.
    #[inline]
    pub fn set(&mut self, control: Control, pressed: bool) {
        if pressed {
            self.0 |= control.mask().0;
        } else {
            self.0 &= !control.mask().0;
        }
    }

    /// Get the raw u32 value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if nothing is pressed.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `true` when the boot-time firmware update gesture (home + circle)
    /// is held.
    #[must_use]
    pub const fn requests_firmware_update(self) -> bool {
        self.is_pressed(Control::Home) && self.is_pressed(Control::Circle)
    }
}

impl BitOr for ButtonMask {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ButtonMask {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// USB identity the adapter presents to the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Personality {
    /// HORI-style joystick with HAT and four axes.
    #[default]
    Gamepad = 0,
    /// N-key-rollover keyboard.
    Keyboard = 1,
}

impl Personality {
    /// Personality requested by the mode-select line.
    ///
    /// The line is pulled up; an open switch (high) selects the keyboard.
    #[must_use]
    pub const fn from_select_line(high: bool) -> Self {
        if high {
            Self::Keyboard
        } else {
            Self::Gamepad
        }
    }

    /// The other personality.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Gamepad => Self::Keyboard,
            Self::Keyboard => Self::Gamepad,
        }
    }

    /// Decode the stored representation. Unknown values fall back to
    /// [`Personality::Gamepad`].
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Keyboard,
            _ => Self::Gamepad,
        }
    }
}
