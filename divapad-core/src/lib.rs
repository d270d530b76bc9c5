//! Platform-agnostic core of the Diva slider adapter.
//!
//! The controller's touch slider is read by its own microcontroller over
//! I2C. This crate reconstructs the slider state from a passively
//! observed bus, samples the discrete buttons, and renders both into USB
//! HID reports for either a gamepad or an NKRO keyboard personality. It
//! has no hardware dependencies and runs on host for testing.
//!
//! # Overview
//!
//! - [`bus`]: observed bus events ([`BusEvent`]) and their source trait ([`BusEventSource`])
//! - [`sniffer`]: PIO program that produces the bus event words
//! - [`decoder`]: bus transaction state machine ([`BusDecoder`])
//! - [`slider`]: zone reconstruction tables and the 32-bit [`SliderMask`]
//! - [`types`]: controls, [`ButtonMask`] and [`Personality`]
//! - [`input`]: input line trait ([`InputLines`]) and [`DebouncedSampler`]
//! - [`report`]: gamepad and keyboard report encoding ([`Report`])
//! - [`output`]: report sink trait ([`ReportSink`])
//! - [`shared`]: single-writer state shared by both contexts ([`SharedState`])
//! - [`dispatch`]: sampling, fusion and rate-limited transmission ([`Dispatcher`])
//! - [`supervisor`]: decode loop and personality switch ([`Supervisor`])
//!
//! # Slider reconstruction
//!
//! A read of the slider is two transactions: a one-byte request to address
//! `0x58` selecting the lower or upper half, then a reply from `0x59`.
//! Each reply byte carries two 4-bit zone fields that are turned into set
//! and clear masks:
//!
//! ```rust
//! use divapad_core::{BusDecoder, BusEvent, SliderMask};
//!
//! let mut decoder = BusDecoder::new();
//! let mut mask = SliderMask::EMPTY;
//!
//! // Request the lower half.
//! for event in [
//!     BusEvent::Start,
//!     BusEvent::Data { byte: 0x58, ack: true },
//!     BusEvent::Data { byte: 0x01, ack: true },
//!     BusEvent::Stop,
//! ] {
//!     mask = mask.apply(decoder.feed(event));
//! }
//!
//! // Reply: first byte is index 1, its low nibble lights bit 30.
//! for event in [
//!     BusEvent::Start,
//!     BusEvent::Data { byte: 0x59, ack: true },
//!     BusEvent::Data { byte: 0x0F, ack: true },
//!     BusEvent::Stop,
//! ] {
//!     mask = mask.apply(decoder.feed(event));
//! }
//!
//! assert_eq!(mask, SliderMask(1 << 30));
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod bus;
pub mod config;
pub mod decoder;
pub mod dispatch;
pub mod input;
pub mod output;
pub mod report;
pub mod shared;
pub mod slider;
pub mod sniffer;
pub mod supervisor;
pub mod types;

// Re-export main types at crate root
pub use bus::{BusEvent, BusEventSource};
pub use config::Config;
pub use decoder::{BusDecoder, Phase, READ_REPLY_ADDRESS, READ_REQUEST_ADDRESS};
pub use dispatch::{Dispatcher, Outcome, Throttle};
pub use input::{DebouncedSampler, InputLines};
pub use output::{OutputError, ReportSink};
pub use report::{ControlTable, GamepadReport, Hat, KeyboardReport, Report, Slot};
pub use shared::{DecodeHandles, DispatchHandles, SharedState};
pub use slider::{reconstruct, Axes, SliderHalf, SliderMask, ZoneUpdate};
pub use supervisor::{DispatchControl, Supervisor, SupervisorState, Transport};
pub use types::{ButtonMask, Control, Personality, NUM_BUTTONS};
