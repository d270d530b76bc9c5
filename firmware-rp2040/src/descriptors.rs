//! USB identities and HID report descriptors for both personalities.

use divapad_core::Personality;

/// Device-level USB identity of one personality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identity {
    pub vid: u16,
    pub pid: u16,
    pub manufacturer: &'static str,
    pub product: &'static str,
    pub serial_number: &'static str,
    pub report_descriptor: &'static [u8],
}

/// Manufacturer string shared by both personalities.
pub const MANUFACTURER: &str = "CrazyRedMachine";

/// Product id shared by both personalities.
pub const PRODUCT_ID: u16 = 0x00FB;

/// Bus power draw advertised in the configuration descriptor.
pub const MAX_POWER_MA: u16 = 500;

/// HID interrupt endpoint polling interval.
pub const POLL_MS: u8 = 1;

/// Controller identity the console recognises.
pub const GAMEPAD: Identity = Identity {
    vid: 0x0F0D,
    pid: PRODUCT_ID,
    manufacturer: MANUFACTURER,
    product: "Ipega Diva Deluxe",
    serial_number: "MNDVA",
    report_descriptor: GAMEPAD_REPORT_DESCRIPTOR,
};

/// NKRO keyboard identity.
pub const KEYBOARD: Identity = Identity {
    vid: 0xCAFE,
    pid: PRODUCT_ID,
    manufacturer: MANUFACTURER,
    product: "Ipega Diva Deluxe (KB)",
    serial_number: "MNDVAKB",
    report_descriptor: KEYBOARD_REPORT_DESCRIPTOR,
};

/// Identity to enumerate with for `personality`.
#[must_use]
pub const fn identity(personality: Personality) -> &'static Identity {
    match personality {
        Personality::Gamepad => &GAMEPAD,
        Personality::Keyboard => &KEYBOARD,
    }
}

/// 16 buttons, 4-bit HAT plus padding, four 8-bit axes, one vendor byte
/// and an 8-byte output report.
pub const GAMEPAD_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Gamepad)
    0xA1, 0x01, // Collection (Application)
    //
    // --- Buttons (16 buttons) ---
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x35, 0x00, //   Physical Minimum (0)
    0x45, 0x01, //   Physical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x10, //   Report Count (16)
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x10, //   Usage Maximum (Button 16)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- HAT switch ---
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x25, 0x07, //   Logical Maximum (7)
    0x46, 0x3B, 0x01, //   Physical Maximum (315)
    0x75, 0x04, //   Report Size (4)
    0x95, 0x01, //   Report Count (1)
    0x65, 0x14, //   Unit (Degrees)
    0x09, 0x39, //   Usage (Hat switch)
    0x81, 0x42, //   Input (Data, Variable, Absolute, Null State)
    0x65, 0x00, //   Unit (None)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x01, //   Input (Constant) - padding nibble
    //
    // --- Slider lanes ---
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x46, 0xFF, 0x00, //   Physical Maximum (255)
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x09, 0x32, //   Usage (Z)
    0x09, 0x35, //   Usage (Rz)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x04, //   Report Count (4)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Vendor byte ---
    0x06, 0x00, 0xFF, //   Usage Page (Vendor Defined 0xFF00)
    0x09, 0x20, //   Usage (0x20)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Output report ---
    0x0A, 0x21, 0x26, //   Usage (0x2621)
    0x95, 0x08, //   Report Count (8)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];

/// Modifier byte plus a 248-key bitmap (usages 0..=247).
pub const KEYBOARD_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    //
    // --- Modifiers ---
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0xE0, //   Usage Minimum (Left Control)
    0x29, 0xE7, //   Usage Maximum (Right GUI)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Key bitmap ---
    0x75, 0x01, //   Report Size (1)
    0x95, 0xF8, //   Report Count (248)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0xF7, //   Usage Maximum (247)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    0xC0, // End Collection
];
