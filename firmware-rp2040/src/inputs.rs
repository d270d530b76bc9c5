//! GPIO-backed button bank and mode-select line.
//!
//! All lines are active-low with internal pull-ups.
//!
//! # Pins
//!
//! | Control  | GPIO | Control | GPIO |
//! |----------|------|---------|------|
//! | Triangle | 28   | Home    | 20   |
//! | Square   | 27   | R3      | 4    |
//! | Cross    | 26   | L3      | 5    |
//! | Circle   | 22   | Up      | 6    |
//! | L1       | 13   | Right   | 7    |
//! | R1       | 14   | Down    | 8    |
//! | L2       | 17   | Left    | 9    |
//! | R2       | 16   | Mode    | 15   |
//! | Share    | 18   |         |      |
//! | Options  | 19   |         |      |

use divapad_core::{ButtonMask, InputLines, Personality, NUM_BUTTONS};
use embedded_hal::digital::InputPin;

/// The controller's button lines in wiring order.
pub struct PinBank<P> {
    pins: [P; NUM_BUTTONS],
}

impl<P: InputPin> PinBank<P> {
    /// Wrap pins ordered like [`Control::ALL`](divapad_core::Control::ALL).
    #[must_use]
    pub fn new(pins: [P; NUM_BUTTONS]) -> Self {
        Self { pins }
    }

    /// Raw snapshot of every line, no debouncing.
    pub fn snapshot(&mut self) -> ButtonMask {
        let mut mask = ButtonMask::NONE;
        for index in 0..NUM_BUTTONS {
            if self.is_asserted(index) {
                mask.0 |= 1 << index;
            }
        }
        mask
    }
}

impl<P: InputPin> InputLines for PinBank<P> {
    #[inline]
    fn is_asserted(&mut self, index: usize) -> bool {
        self.pins
            .get_mut(index)
            .is_some_and(|pin| pin.is_low().unwrap_or(false))
    }
}

/// Personality switch on the controller's mode line.
pub struct ModeSelect<P> {
    pin: P,
}

impl<P: InputPin> ModeSelect<P> {
    #[must_use]
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Personality the switch currently asks for.
    pub fn requested(&mut self) -> Personality {
        Personality::from_select_line(self.pin.is_high().unwrap_or(false))
    }
}
