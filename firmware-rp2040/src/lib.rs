//! Diva slider controller to USB adapter for RP2040.
//!
//! This crate provides the embedded side of the adapter: it listens to the
//! controller's internal I2C bus between the touch slider and its host
//! MCU, reads the buttons, and presents the result over USB as either a
//! gamepad or an NKRO keyboard.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Sniffs the slider bus with a PIO state machine (never driving it)
//! 2. Reconstructs a 32-position slider mask from the read replies
//! 3. Samples 17 buttons with a press latch on the face buttons
//! 4. Sends a gamepad or keyboard HID report at most every 900 µs
//!
//! # Hardware Configuration
//!
//! | Function | GPIO | Description |
//! |----------|------|-------------|
//! | SDA      | 0    | Slider bus data (input only) |
//! | SCL      | 1    | Slider bus clock (input only) |
//! | Buttons  | 4-9, 13, 14, 16-20, 22, 26-28 | See [`inputs`] |
//! | Mode     | 15   | High: keyboard, low: gamepad |
//!
//! Holding Home and Circle while plugging in reboots into the ROM USB
//! bootloader.
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with two tasks:
//!
//! - **Decode Task**: drains sniffer words into the slider mask and polls
//!   the mode switch through the [`Supervisor`](divapad_core::Supervisor)
//! - **USB Task**: runs one USB session per personality and, inside it,
//!   the [`Dispatcher`](divapad_core::Dispatcher) sampling loop
//!
//! Slider, buttons and personality are shared through
//! [`SharedState`](divapad_core::SharedState); the tasks coordinate
//! personality switches through [`link::Link`].
//!
//! # Modules
//!
//! - [`sniffer`]: PIO bus sniffer ([`BusSniffer`])
//! - [`inputs`]: GPIO button bank ([`PinBank`], [`ModeSelect`])
//! - [`descriptors`]: USB identities and HID report descriptors
//! - [`usb_output`]: HID report sink ([`HidSink`])
//! - [`link`]: USB sessions and switch handshake ([`Link`])
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//! - **`no-debounce`**: Report every button straight from its line
//!
//! # Re-exports
//!
//! This crate re-exports the core items the binary needs from
//! [`divapad_core`].

#![no_std]

#[cfg(all(feature = "dev-panic", feature = "prod-panic"))]
compile_error!("Cannot enable both `dev-panic` and `prod-panic` features");

// Re-export core types for convenience
pub use divapad_core::{
    BusDecoder, ButtonMask, Config, DecodeHandles, DispatchHandles, Personality, SharedState,
    Supervisor,
};

pub mod descriptors;
pub mod inputs;
pub mod link;
pub mod sniffer;
pub mod usb_output;

pub use inputs::{ModeSelect, PinBank};
pub use link::{run_session, DispatchLink, Link, UsbTransport};
pub use sniffer::BusSniffer;
pub use usb_output::HidSink;

/// Tunables this image is built with.
#[cfg(not(feature = "no-debounce"))]
pub const CONFIG: Config = Config::DEFAULT;

/// Tunables this image is built with.
#[cfg(feature = "no-debounce")]
pub const CONFIG: Config = Config::ZERO_LATENCY;
