//! PIO program for the passive bus sniffer.
//!
//! The program only reads its two input pins: SDA at input base 0 (also
//! the jump pin) and SCL at input base 1. It follows SCL and pushes one
//! word per START, STOP or completed byte, in the layout decoded by
//! [`BusEvent::from_word`](crate::BusEvent::from_word).
//!
//! Expected state machine configuration: input shift left without
//! autopush, output shift right, RX-only FIFO.
//!
//! While SCL is high the program reads both lines with a single
//! `mov osr, pins` and branches on `x = SCL << 1 | SDA`, so an SDA edge
//! right after SCL falls ends the bit instead of reading as START or STOP.

/// Assemble the sniffer program.
///
/// Each word is preloaded with event code 3 and shifted left, so a
/// completed byte lands as `3 << 9 | byte << 1 | ack_level`. START and
/// STOP replace the ISR with their 2-bit code.
#[must_use]
pub fn program() -> pio::Program<32> {
    pio::pio_asm!(
        ".wrap_target",
        "reload:",
        "    set y, 8",
        "    set x, 3",
        "    in x, 2",
        "bit_start:",
        "    wait 1 pin 1",
        "    in pins, 1",
        "    jmp pin sda_high",
        "sda_low:",
        "    mov osr, pins",
        "    out x, 2",
        "    jmp x-- low_1",
        "    jmp count",
        "low_1:",
        "    jmp x-- low_2",
        "    jmp count",
        "low_2:",
        "    jmp x-- got_stop",
        "    jmp sda_low",
        "sda_high:",
        "    mov osr, pins",
        "    out x, 2",
        "    jmp x-- high_1",
        "    jmp count",
        "high_1:",
        "    jmp x-- high_2",
        "    jmp count",
        "high_2:",
        "    jmp x-- sda_high",
        "    wait 0 pin 1",
        "    set x, 1",
        "    jmp emit",
        "count:",
        "    jmp y-- bit_start",
        "    jmp push_byte",
        "got_stop:",
        "    set x, 2",
        "emit:",
        "    mov isr, null",
        "    in x, 2",
        "push_byte:",
        "    push noblock",
        ".wrap",
    )
    .program
}
