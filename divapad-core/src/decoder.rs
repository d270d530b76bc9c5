//! Bus decoder: follows addressing on the sniffed bus and turns slider
//! read replies into zone updates.
//!
//! The decoder never rejects anything. A START re-arms addressing and a
//! STOP drops back to idle, so garbage cannot outlive one transaction.

use crate::bus::BusEvent;
use crate::slider::{reconstruct, SliderHalf, ZoneUpdate};

/// Address byte (with R/W bit) of the host writing which half to read.
pub const READ_REQUEST_ADDRESS: u8 = 0x58;

/// Address byte (with R/W bit) of the sensor answering with zone data.
pub const READ_REPLY_ADDRESS: u8 = 0x59;

/// Where the decoder is within the current transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Between a STOP and the next START.
    #[default]
    Idle,
    /// START seen, the next data byte is the address.
    AddressPending,
    /// Address latched, data bytes belong to it.
    Addressed,
}

/// Addressing context of the sniffed bus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusDecoder {
    address: u8,
    index: u8,
    phase: Phase,
    half: SliderHalf,
}

impl BusDecoder {
    /// Idle decoder expecting the low half first.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            address: 0,
            index: 0,
            phase: Phase::Idle,
            half: SliderHalf::Low,
        }
    }

    /// Current transaction phase.
    #[inline]
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Latched address, `0` when idle.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Index the next data byte will get (the address byte is index 0).
    #[inline]
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.index
    }

    /// Half the next read reply describes. Survives STOP.
    #[inline]
    #[must_use]
    pub const fn half(&self) -> SliderHalf {
        self.half
    }

    /// Consume one bus event and return the slider bits it changes.
    pub fn feed(&mut self, event: BusEvent) -> ZoneUpdate {
        match event {
            BusEvent::Start => {
                self.index = 0;
                self.phase = Phase::AddressPending;
                ZoneUpdate::NONE
            }
            BusEvent::Stop => {
                self.address = 0;
                self.index = 0;
                self.phase = Phase::Idle;
                ZoneUpdate::NONE
            }
            BusEvent::Data { byte, .. } => self.data(byte),
        }
    }

    fn data(&mut self, byte: u8) -> ZoneUpdate {
        match self.phase {
            Phase::Idle => ZoneUpdate::NONE,
            Phase::AddressPending => {
                self.address = byte;
                self.index = 1;
                self.phase = Phase::Addressed;
                ZoneUpdate::NONE
            }
            Phase::Addressed => {
                let index = self.index;
                self.index = self.index.wrapping_add(1);

                match self.address {
                    READ_REQUEST_ADDRESS => {
                        self.half = SliderHalf::from_request(byte);
                        ZoneUpdate::NONE
                    }
                    READ_REPLY_ADDRESS => reconstruct(index, self.half, byte),
                    // Unrelated traffic on the shared bus.
                    _ => ZoneUpdate::NONE,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::slider::SliderMask;
    use std::vec::Vec;

    fn data(byte: u8) -> BusEvent {
        BusEvent::Data { byte, ack: true }
    }

    /// Write request selecting a half, then a nine byte read reply.
    fn transaction(half_byte: u8, reply: [u8; 9]) -> Vec<BusEvent> {
        let mut events = std::vec![
            BusEvent::Start,
            data(READ_REQUEST_ADDRESS),
            data(half_byte),
            BusEvent::Stop,
            BusEvent::Start,
            data(READ_REPLY_ADDRESS),
        ];
        events.extend(reply.iter().map(|&b| data(b)));
        events.push(BusEvent::Stop);
        events
    }

    fn run(decoder: &mut BusDecoder, mask: SliderMask, events: &[BusEvent]) -> SliderMask {
        events
            .iter()
            .fold(mask, |mask, &event| mask.apply(decoder.feed(event)))
    }

    #[test]
    fn test_stop_resets_to_idle() {
        let mut decoder = BusDecoder::new();
        decoder.feed(BusEvent::Start);
        assert_eq!(decoder.phase(), Phase::AddressPending);
        decoder.feed(data(0x42));
        assert_eq!(decoder.phase(), Phase::Addressed);
        assert_eq!(decoder.address(), 0x42);
        decoder.feed(data(0x00));
        decoder.feed(BusEvent::Stop);
        assert_eq!(decoder.phase(), Phase::Idle);
        assert_eq!(decoder.address(), 0);
    }

    fn assert_idle(decoder: &BusDecoder) {
        assert_eq!(decoder.phase(), Phase::Idle);
        assert_eq!(decoder.address(), 0);
        assert_eq!(decoder.index(), 0);
    }

    #[test]
    fn test_stop_while_address_pending() {
        let mut decoder = BusDecoder::new();
        decoder.feed(BusEvent::Start);
        decoder.feed(BusEvent::Stop);
        assert_idle(&decoder);

        // The byte after STOP is not taken as an address.
        assert!(decoder.feed(data(READ_REPLY_ADDRESS)).is_empty());
        assert!(decoder.feed(data(0xFF)).is_empty());
        assert_idle(&decoder);
    }

    #[test]
    fn test_stop_mid_reply() {
        let mut decoder = BusDecoder::new();
        let events = [
            BusEvent::Start,
            data(READ_REPLY_ADDRESS),
            data(0x00),
            data(0x10),
            BusEvent::Stop,
        ];
        let mask = run(&mut decoder, SliderMask::EMPTY, &events);
        assert_eq!(mask.raw(), 3 << 28);
        assert_idle(&decoder);

        // Trailing bytes of the cut reply no longer touch the mask.
        let mask = run(&mut decoder, mask, &[data(0x00), data(0x00), data(0xFF)]);
        assert_eq!(mask.raw(), 3 << 28);
        assert_idle(&decoder);
    }

    #[test]
    fn test_stop_after_unrelated_traffic() {
        let mut decoder = BusDecoder::new();
        let events = [BusEvent::Start, data(0xA0), data(0x01), data(0x02), BusEvent::Stop];
        let mask = run(&mut decoder, SliderMask::EMPTY, &events);
        assert_eq!(mask, SliderMask::EMPTY);
        assert_idle(&decoder);

        // The next reply is indexed from its own address byte.
        let reply = [0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let mask = run(&mut decoder, mask, &transaction(1, reply));
        assert_eq!(mask.raw(), 3 << 28);
        assert_idle(&decoder);
    }

    #[test]
    fn test_address_byte_is_index_zero() {
        let mut decoder = BusDecoder::new();
        decoder.feed(BusEvent::Start);
        decoder.feed(data(READ_REPLY_ADDRESS));
        assert_eq!(decoder.index(), 1);
        decoder.feed(data(0));
        assert_eq!(decoder.index(), 2);
    }

    #[test]
    fn test_low_half_round_trip() {
        let mut decoder = BusDecoder::new();
        // Zone 3 (byte 2 high nibble) and zone 5 (byte 4 low nibble).
        let reply = [0x00, 0x10, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00];
        let mask = run(&mut decoder, SliderMask::EMPTY, &transaction(1, reply));
        assert_eq!(mask.raw(), (3 << 28) | (3 << 24));
        assert_eq!(decoder.phase(), Phase::Idle);
    }

    #[test]
    fn test_high_half_round_trip() {
        let mut decoder = BusDecoder::new();
        // Last zone of the strip lives in byte 8 of the high half.
        let reply = [0, 0, 0, 0, 0, 0, 0, 0xF0, 0];
        let mask = run(&mut decoder, SliderMask::EMPTY, &transaction(0, reply));
        assert_eq!(decoder.half(), SliderHalf::High);
        assert_eq!(mask.raw(), 1);
    }

    #[test]
    fn test_reply_clears_stale_zones() {
        let mut decoder = BusDecoder::new();
        let touched = [0x11, 0xF0, 0, 0x11, 0xF0, 0, 0x11, 0xF0, 0];
        let mask = run(&mut decoder, SliderMask::EMPTY, &transaction(1, touched));
        assert_eq!(mask.raw(), 0xFFFF_0000);

        let released = [0; 9];
        let mask = run(&mut decoder, mask, &transaction(1, released));
        assert_eq!(mask, SliderMask::EMPTY);
    }

    #[test]
    fn test_other_half_untouched() {
        let mut decoder = BusDecoder::new();
        let mask = SliderMask(0x0000_FFFF);
        let released = [0; 9];
        let mask = run(&mut decoder, mask, &transaction(1, released));
        assert_eq!(mask.raw(), 0x0000_FFFF);
    }

    #[test]
    fn test_only_zone_bytes_mutate() {
        for index in 1..=9u8 {
            let mut decoder = BusDecoder::new();
            decoder.feed(BusEvent::Start);
            decoder.feed(data(READ_REPLY_ADDRESS));
            for _ in 1..index {
                decoder.feed(data(0));
            }
            let update = decoder.feed(data(0xFF));
            let expected = matches!(index, 1 | 2 | 4 | 5 | 7 | 8);
            assert_eq!(!update.is_empty(), expected, "index {index}");
        }
    }

    #[test]
    fn test_unrelated_traffic_ignored() {
        let mut decoder = BusDecoder::new();
        let events = [
            BusEvent::Start,
            data(0xA0),
            data(0xFF),
            data(0xFF),
            BusEvent::Stop,
        ];
        let mask = run(&mut decoder, SliderMask::EMPTY, &events);
        assert_eq!(mask, SliderMask::EMPTY);
        assert_eq!(decoder.half(), SliderHalf::Low);
    }

    #[test]
    fn test_data_without_start_ignored() {
        let mut decoder = BusDecoder::new();
        assert!(decoder.feed(data(READ_REPLY_ADDRESS)).is_empty());
        assert!(decoder.feed(data(0xFF)).is_empty());
        assert_eq!(decoder.phase(), Phase::Idle);
    }

    #[test]
    fn test_truncated_reply_recovers_on_start() {
        let mut decoder = BusDecoder::new();
        decoder.feed(BusEvent::Start);
        decoder.feed(data(READ_REPLY_ADDRESS));
        decoder.feed(data(0x00));
        // Repeated START without STOP: next byte is an address again.
        decoder.feed(BusEvent::Start);
        assert!(decoder.feed(data(0x30)).is_empty());
        assert_eq!(decoder.address(), 0x30);
        assert!(decoder.feed(data(0xFF)).is_empty());
    }
}
