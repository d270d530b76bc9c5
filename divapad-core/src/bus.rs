//! Bus events produced by the passive two-wire sniffer.

use core::future::Future;

/// Event code carried in a sniffer word for a START condition.
pub const EV_START: u32 = 1;
/// Event code carried in a sniffer word for a STOP condition.
pub const EV_STOP: u32 = 2;
/// Event code carried in a sniffer word for a completed data byte.
pub const EV_DATA: u32 = 3;

/// A decoded occurrence on the sniffed bus.
///
/// Produced once by the sampling layer and consumed once by the decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusEvent {
    /// SDA fell while SCL was high.
    Start,
    /// SDA rose while SCL was high.
    Stop,
    /// Eight data bits plus the acknowledge slot.
    Data {
        /// Byte value, MSB first on the wire.
        byte: u8,
        /// `true` when the receiver pulled SDA low in the ninth clock.
        ack: bool,
    },
}

impl BusEvent {
    /// Decode one word pushed by the sniffer state machine.
    ///
    /// A data byte is `EV_DATA << 9 | byte << 1 | ack_level`, where the raw
    /// ACK level is low when acknowledged. START and STOP are pushed as the
    /// bare codes `EV_START` and `EV_STOP`; the same codes placed in bits
    /// `[10:9]` with an empty payload are accepted too. Anything else
    /// decodes to `None`.
    ///
    /// ```
    /// use divapad_core::BusEvent;
    ///
    /// let word = (3 << 9) | (0x59 << 1);
    /// assert_eq!(
    ///     BusEvent::from_word(word),
    ///     Some(BusEvent::Data { byte: 0x59, ack: true })
    /// );
    /// assert_eq!(BusEvent::from_word(1), Some(BusEvent::Start));
    /// assert_eq!(BusEvent::from_word(2 << 9), Some(BusEvent::Stop));
    /// ```
    #[must_use]
    pub const fn from_word(word: u32) -> Option<Self> {
        let payload = word & 0x1FF;
        match (word >> 9) & 0x03 {
            EV_DATA => Some(Self::Data {
                byte: ((word >> 1) & 0xFF) as u8,
                ack: word & 1 == 0,
            }),
            0 => match word & 0x03 {
                EV_START => Some(Self::Start),
                EV_STOP => Some(Self::Stop),
                _ => None,
            },
            EV_START if payload == 0 => Some(Self::Start),
            EV_STOP if payload == 0 => Some(Self::Stop),
            _ => None,
        }
    }
}

/// Async source of bus events.
///
/// Implementations block (asynchronously) until the next event is
/// available; the stream is infinite and cannot be restarted.
pub trait BusEventSource {
    /// Wait for the next bus event.
    fn next_event(&mut self) -> impl Future<Output = BusEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_and_stop_words() {
        assert_eq!(BusEvent::from_word(EV_START), Some(BusEvent::Start));
        assert_eq!(BusEvent::from_word(EV_STOP), Some(BusEvent::Stop));
    }

    #[test]
    fn test_start_and_stop_codes_in_event_field() {
        assert_eq!(BusEvent::from_word(EV_START << 9), Some(BusEvent::Start));
        assert_eq!(BusEvent::from_word(EV_STOP << 9), Some(BusEvent::Stop));
        assert_eq!(BusEvent::from_word((EV_START << 9) | 0x02), None);
        assert_eq!(BusEvent::from_word((EV_STOP << 9) | 0x01), None);
    }

    #[test]
    fn test_data_word_nack() {
        let word = (EV_DATA << 9) | (0xA5 << 1) | 1;
        assert_eq!(
            BusEvent::from_word(word),
            Some(BusEvent::Data {
                byte: 0xA5,
                ack: false
            })
        );
    }

    #[test]
    fn test_invalid_words_dropped() {
        assert_eq!(BusEvent::from_word(0), None);
        assert_eq!(BusEvent::from_word(3), None);
        assert_eq!(BusEvent::from_word((1 << 9) | 0x1FE), None);
    }
}
