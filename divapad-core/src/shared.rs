//! Lock-free state shared between the decode and dispatch contexts.
//!
//! Every field has exactly one writer. Writers are handed out once by
//! [`SharedState::split`]; reads go through `&SharedState` and may observe
//! the value from the previous write cycle, never a torn one.

use crate::slider::{SliderMask, ZoneUpdate};
use crate::types::{ButtonMask, Personality};
use portable_atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Shared controller state.
pub struct SharedState {
    slider: AtomicU32,
    buttons: AtomicU32,
    personality: AtomicU8,
    split: AtomicBool,
}

impl SharedState {
    /// Empty slider, no buttons, given personality.
    #[must_use]
    pub const fn new(personality: Personality) -> Self {
        Self {
            slider: AtomicU32::new(0),
            buttons: AtomicU32::new(0),
            personality: AtomicU8::new(personality as u8),
            split: AtomicBool::new(false),
        }
    }

    /// Hand out the write handles. Returns `None` after the first call.
    pub fn split(&self) -> Option<(DecodeHandles<'_>, DispatchHandles<'_>)> {
        if self.split.swap(true, Ordering::AcqRel) {
            return None;
        }

        Some((
            DecodeHandles {
                slider: SliderWriter(&self.slider),
                personality: PersonalityWriter(&self.personality),
                state: self,
            },
            DispatchHandles {
                buttons: ButtonWriter(&self.buttons),
                state: self,
            },
        ))
    }

    /// Latest reconstructed slider mask.
    #[inline]
    #[must_use]
    pub fn slider(&self) -> SliderMask {
        SliderMask(self.slider.load(Ordering::Relaxed))
    }

    /// Latest sampled buttons.
    #[inline]
    #[must_use]
    pub fn buttons(&self) -> ButtonMask {
        ButtonMask(self.buttons.load(Ordering::Relaxed))
    }

    /// Active personality.
    #[inline]
    #[must_use]
    pub fn personality(&self) -> Personality {
        Personality::from_u8(self.personality.load(Ordering::Acquire))
    }
}

/// Sole writer of the slider mask.
pub struct SliderWriter<'a>(&'a AtomicU32);

impl SliderWriter<'_> {
    /// Apply a zone update. Load and store are separate; this is sound only
    /// because no other writer exists.
    #[inline]
    pub fn apply(&mut self, update: ZoneUpdate) {
        if update.is_empty() {
            return;
        }
        let mask = SliderMask(self.0.load(Ordering::Relaxed)).apply(update);
        self.0.store(mask.raw(), Ordering::Relaxed);
    }
}

/// Sole writer of the button mask.
pub struct ButtonWriter<'a>(&'a AtomicU32);

impl ButtonWriter<'_> {
    /// Publish a freshly sampled mask.
    #[inline]
    pub fn publish(&mut self, buttons: ButtonMask) {
        self.0.store(buttons.raw(), Ordering::Relaxed);
    }
}

/// Sole writer of the active personality.
pub struct PersonalityWriter<'a>(&'a AtomicU8);

impl PersonalityWriter<'_> {
    /// Switch the active personality.
    #[inline]
    pub fn set(&mut self, personality: Personality) {
        self.0.store(personality as u8, Ordering::Release);
    }
}

/// Capabilities of the decode context: writes slider and personality.
pub struct DecodeHandles<'a> {
    pub slider: SliderWriter<'a>,
    pub personality: PersonalityWriter<'a>,
    pub state: &'a SharedState,
}

/// Capabilities of the dispatch context: writes buttons.
pub struct DispatchHandles<'a> {
    pub buttons: ButtonWriter<'a>,
    pub state: &'a SharedState,
}
