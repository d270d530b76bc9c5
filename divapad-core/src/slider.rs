//! Slider reconstruction: sensor zones to a 32-position axis mask.
//!
//! The touch strip reports 18 zones, nine per half, three zones for every
//! three reply bytes. The reported axis space has 32 positions: the two
//! outermost zones on each end keep a single bit, the 14 interior zones
//! each light two adjacent bits (`1 + 1 + 2*14 + 1 + 1 = 32`).
//!
//! Both tables are indexed by `reply byte index + half offset`. Index 0 is
//! the address byte and never carries zone data.

/// Bits driven by the low nibble of reply bytes 1, 4 and 7.
///
/// | index | zone | bits |
/// |-------|------|------|
/// | 1     | 2    | 30   |
/// | 4     | 5    | 24..25 |
/// | 7     | 8    | 18..19 |
/// | 9     | 11   | 12..13 |
/// | 12    | 14   | 6..7 |
/// | 15    | 17   | 1    |
pub const LOW_NIBBLE_ZONES: [u32; 17] = [
    0,
    1 << 30,
    0,
    0,
    3 << 24,
    0,
    0,
    3 << 18,
    0,
    3 << 12,
    0,
    0,
    3 << 6,
    0,
    0,
    1 << 1,
    0,
];

/// Bits driven by the high nibble of reply bytes 1, 2, 4, 5, 7 and 8.
///
/// | index | zone | bits |
/// |-------|------|------|
/// | 1     | 1    | 31   |
/// | 2     | 3    | 28..29 |
/// | 4     | 4    | 26..27 |
/// | 5     | 6    | 22..23 |
/// | 7     | 7    | 20..21 |
/// | 8     | 9    | 16..17 |
/// | 9     | 10   | 14..15 |
/// | 10    | 12   | 10..11 |
/// | 12    | 13   | 8..9 |
/// | 13    | 15   | 4..5 |
/// | 15    | 16   | 2..3 |
/// | 16    | 18   | 0    |
pub const HIGH_NIBBLE_ZONES: [u32; 17] = [
    0,
    1 << 31,
    3 << 28,
    0,
    3 << 26,
    3 << 22,
    0,
    3 << 20,
    3 << 16,
    3 << 14,
    3 << 10,
    0,
    3 << 8,
    3 << 4,
    0,
    3 << 2,
    1,
];

/// Axis value the host reads for an untouched lane.
pub const AXIS_CENTER: u8 = 0x80;

/// Which half of the strip the next read reply describes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SliderHalf {
    /// Zones 1..=9, upper 16 bits of the mask.
    #[default]
    Low,
    /// Zones 10..=18, lower 16 bits of the mask.
    High,
}

impl SliderHalf {
    /// Half selected by the data byte of a read request.
    ///
    /// Only the value `1` selects the low half.
    #[must_use]
    pub const fn from_request(byte: u8) -> Self {
        if byte == 1 {
            Self::Low
        } else {
            Self::High
        }
    }

    /// Offset added to the reply byte index when indexing the zone tables.
    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            Self::Low => 0,
            Self::High => 8,
        }
    }
}

/// Bits to set and bits to clear after one reply byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ZoneUpdate {
    pub set: u32,
    pub clear: u32,
}

impl ZoneUpdate {
    /// No change.
    pub const NONE: Self = Self { set: 0, clear: 0 };

    /// `true` if applying this update cannot change any mask.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.set == 0 && self.clear == 0
    }

    fn drive(&mut self, bits: u32, present: bool) {
        if present {
            self.set |= bits;
        } else {
            self.clear |= bits;
        }
    }
}

/// Map one read-reply byte to the zone bits it sets or clears.
///
/// Bytes 1, 4 and 7 carry two zones (low then high nibble), bytes 2, 5
/// and 8 carry one zone in the high nibble, every other index is padding.
#[must_use]
pub fn reconstruct(index: u8, half: SliderHalf, byte: u8) -> ZoneUpdate {
    let slot = usize::from(index) + half.offset();
    let mut update = ZoneUpdate::NONE;

    match index {
        1 | 4 | 7 => {
            update.drive(LOW_NIBBLE_ZONES[slot], byte & 0x0F != 0);
            update.drive(HIGH_NIBBLE_ZONES[slot], byte & 0xF0 != 0);
        }
        2 | 5 | 8 => {
            update.drive(HIGH_NIBBLE_ZONES[slot], byte & 0xF0 != 0);
        }
        _ => {}
    }

    update
}

/// Reconstructed slider position, one bit per logical axis position.
///
/// Bit 31 is the first zone of the low half, bit 0 the last zone of the
/// high half. The mask is updated incrementally; bits persist until a
/// later reply clears them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SliderMask(pub u32);

impl SliderMask {
    /// Nothing touched.
    pub const EMPTY: Self = Self(0);

    /// Apply a zone update, setting then clearing.
    #[inline]
    #[must_use]
    pub const fn apply(self, update: ZoneUpdate) -> Self {
        Self((self.0 | update.set) & !update.clear)
    }

    /// Raw 32-bit mask.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// `true` if any of `bits` is set.
    #[inline]
    #[must_use]
    pub const fn intersects(self, bits: u32) -> bool {
        self.0 & bits != 0
    }

    /// Split the mask into four centred axis lanes.
    #[must_use]
    pub const fn axes(self) -> Axes {
        Axes::from_mask(self)
    }
}

/// The four analog lanes carried by the slider mask, centred at 0x80.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Axes {
    pub lx: u8,
    pub ly: u8,
    pub rx: u8,
    pub ry: u8,
}

impl Axes {
    /// All lanes centred.
    pub const CENTERED: Self = Self {
        lx: AXIS_CENTER,
        ly: AXIS_CENTER,
        rx: AXIS_CENTER,
        ry: AXIS_CENTER,
    };

    /// Decompose a mask: LX is bits 0..8, LY 8..16, RX 16..24, RY 24..32.
    #[must_use]
    pub const fn from_mask(mask: SliderMask) -> Self {
        let [lx, ly, rx, ry] = mask.0.to_le_bytes();
        Self {
            lx: lx ^ AXIS_CENTER,
            ly: ly ^ AXIS_CENTER,
            rx: rx ^ AXIS_CENTER,
            ry: ry ^ AXIS_CENTER,
        }
    }

    /// Lanes in report order.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.lx, self.ly, self.rx, self.ry]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mask_is_centered() {
        assert_eq!(SliderMask::EMPTY.axes(), Axes::CENTERED);
        assert_eq!(Axes::CENTERED.to_array(), [0x80; 4]);
    }

    #[test]
    fn test_lane_order() {
        let axes = SliderMask(0x8000_0001).axes();
        assert_eq!(axes.lx, 0x81);
        assert_eq!(axes.ly, 0x80);
        assert_eq!(axes.rx, 0x80);
        assert_eq!(axes.ry, 0x00);
    }

    #[test]
    fn test_half_selection() {
        assert_eq!(SliderHalf::from_request(1), SliderHalf::Low);
        assert_eq!(SliderHalf::from_request(0), SliderHalf::High);
        assert_eq!(SliderHalf::from_request(2), SliderHalf::High);
        assert_eq!(SliderHalf::High.offset(), 8);
    }

    #[test]
    fn test_first_byte_drives_two_zones() {
        let update = reconstruct(1, SliderHalf::Low, 0x11);
        assert_eq!(update.set, (1 << 31) | (1 << 30));
        assert_eq!(update.clear, 0);

        let update = reconstruct(1, SliderHalf::Low, 0x10);
        assert_eq!(update.set, 1 << 31);
        assert_eq!(update.clear, 1 << 30);
    }

    #[test]
    fn test_high_nibble_only_bytes() {
        let update = reconstruct(2, SliderHalf::Low, 0x0F);
        assert_eq!(update.set, 0);
        assert_eq!(update.clear, 3 << 28);

        let update = reconstruct(8, SliderHalf::High, 0xF0);
        assert_eq!(update.set, 1);
    }

    #[test]
    fn test_padding_bytes_are_noops() {
        for index in [0u8, 3, 6, 9, 10, 200] {
            for half in [SliderHalf::Low, SliderHalf::High] {
                assert!(reconstruct(index, half, 0xFF).is_empty());
                assert!(reconstruct(index, half, 0x00).is_empty());
            }
        }
    }

    #[test]
    fn test_tables_cover_every_bit_once() {
        let mut seen = 0u32;
        for half in [SliderHalf::Low, SliderHalf::High] {
            for index in 0..=9u8 {
                let bits = reconstruct(index, half, 0xFF).set;
                assert_eq!(seen & bits, 0, "overlap at index {index}");
                seen |= bits;
            }
        }
        assert_eq!(seen, u32::MAX);
    }

    #[test]
    fn test_apply_sets_and_clears() {
        let mask = SliderMask::EMPTY.apply(ZoneUpdate {
            set: 0b1100,
            clear: 0,
        });
        assert_eq!(mask.raw(), 0b1100);
        let mask = mask.apply(ZoneUpdate {
            set: 0,
            clear: 0b0100,
        });
        assert_eq!(mask.raw(), 0b1000);
        assert!(mask.intersects(0b1000));
        assert!(!mask.intersects(0b0111));
    }
}
