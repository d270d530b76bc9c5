//! Discrete input lines and the press-biased debounced sampler.

use crate::types::{ButtonMask, NUM_BUTTONS};

/// Bank of raw discrete input lines.
///
/// Implementations translate electrical levels so that `true` means the
/// control is asserted (the physical lines are active-low).
pub trait InputLines {
    /// Read line `index` (wiring order, see [`Control`](crate::Control)).
    fn is_asserted(&mut self, index: usize) -> bool;
}

impl<T: InputLines + ?Sized> InputLines for &mut T {
    fn is_asserted(&mut self, index: usize) -> bool {
        (**self).is_asserted(index)
    }
}

/// Samples every line once per call and debounces presses on the first
/// `debounced_lines` controls.
///
/// A press arms a countdown of `cycles` passes during which the line's
/// reported state stays frozen. Releases never arm the countdown, so they
/// go through as soon as no countdown is running.
#[derive(Clone, Debug)]
pub struct DebouncedSampler {
    cycles: u16,
    debounced_lines: usize,
    countdown: [u16; NUM_BUTTONS],
    committed: [bool; NUM_BUTTONS],
}

impl DebouncedSampler {
    /// Create a sampler. `debounced_lines` is clamped to the number of
    /// controls; `cycles == 0` samples every line directly.
    #[must_use]
    pub const fn new(cycles: u16, debounced_lines: usize) -> Self {
        let debounced_lines = if debounced_lines > NUM_BUTTONS {
            NUM_BUTTONS
        } else {
            debounced_lines
        };
        Self {
            cycles,
            debounced_lines,
            countdown: [0; NUM_BUTTONS],
            committed: [false; NUM_BUTTONS],
        }
    }

    /// Number of lines going through the debounce filter.
    #[must_use]
    pub const fn debounced_lines(&self) -> usize {
        if self.cycles == 0 {
            0
        } else {
            self.debounced_lines
        }
    }

    /// Read all lines and return the fresh button mask. Never blocks.
    pub fn sample<L: InputLines>(&mut self, lines: &mut L) -> ButtonMask {
        let mut mask = ButtonMask::NONE;
        let debounced = self.debounced_lines();

        for line in 0..debounced {
            if self.debounce(line, lines) {
                mask.0 |= 1 << line;
            }
        }

        for line in debounced..NUM_BUTTONS {
            if lines.is_asserted(line) {
                mask.0 |= 1 << line;
            }
        }

        mask
    }

    fn debounce<L: InputLines>(&mut self, line: usize, lines: &mut L) -> bool {
        let can_update = match self.countdown[line] {
            0 => true,
            n => {
                self.countdown[line] = n - 1;
                n == 1
            }
        };

        let pressed = if can_update {
            let pressed = lines.is_asserted(line);
            if pressed {
                self.countdown[line] = self.cycles;
            }
            pressed
        } else {
            self.committed[line]
        };

        self.committed[line] = pressed;
        pressed
    }
}
