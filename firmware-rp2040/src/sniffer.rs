//! Passive I2C bus sniffer on a PIO state machine.
//!
//! The state machine runs [`divapad_core::sniffer::program`] and never
//! drives either line. It pushes one word per START, STOP or completed
//! byte into the RX FIFO, in the layout decoded by [`BusEvent::from_word`].
//!
//! # Pins
//!
//! - GPIO 0: SDA (input base and jump pin)
//! - GPIO 1: SCL (input base + 1)

use defmt::trace;
use divapad_core::{BusEvent, BusEventSource};
use embassy_rp::gpio::Pull;
use embassy_rp::pio::{
    Common, Config, Direction, FifoJoin, Instance, Pin, PioPin, ShiftConfig, ShiftDirection,
    StateMachine,
};
use embassy_rp::Peri;
use fixed::traits::ToFixed;

/// Bus sniffer backed by one PIO state machine.
///
/// Owns the PIO block so the program and pin mapping stay loaded for as
/// long as the sniffer lives.
pub struct BusSniffer<'d, PIO: Instance, const SM: usize> {
    sm: StateMachine<'d, PIO, SM>,
    _common: Common<'d, PIO>,
    _pins: [Pin<'d, PIO>; 2],
}

impl<'d, PIO: Instance, const SM: usize> BusSniffer<'d, PIO, SM> {
    /// Load the sniffer program and start the state machine at the full
    /// system clock.
    pub fn new(
        mut common: Common<'d, PIO>,
        mut sm: StateMachine<'d, PIO, SM>,
        sda: Peri<'d, impl PioPin + 'd>,
        scl: Peri<'d, impl PioPin + 'd>,
    ) -> Self {
        let program = divapad_core::sniffer::program();

        let mut sda = common.make_pio_pin(sda);
        let mut scl = common.make_pio_pin(scl);
        sda.set_pull(Pull::None);
        scl.set_pull(Pull::None);

        let loaded = common.load_program(&program);

        let mut cfg = Config::default();
        cfg.use_program(&loaded, &[]);
        cfg.set_in_pins(&[&sda, &scl]);
        cfg.set_jmp_pin(&sda);
        cfg.clock_divider = 1u8.to_fixed();
        cfg.shift_in = ShiftConfig {
            auto_fill: false,
            threshold: 32,
            direction: ShiftDirection::Left,
        };
        cfg.shift_out = ShiftConfig {
            auto_fill: false,
            threshold: 32,
            direction: ShiftDirection::Right,
        };
        cfg.fifo_join = FifoJoin::RxOnly;

        sm.set_config(&cfg);
        sm.set_pin_dirs(Direction::In, &[&sda, &scl]);
        sm.set_enable(true);

        Self {
            sm,
            _common: common,
            _pins: [sda, scl],
        }
    }
}

impl<PIO: Instance, const SM: usize> BusEventSource for BusSniffer<'_, PIO, SM> {
    async fn next_event(&mut self) -> BusEvent {
        loop {
            let word = self.sm.rx().wait_pull().await;
            match BusEvent::from_word(word) {
                Some(event) => return event,
                None => trace!("dropping sniffer word {=u32:#x}", word),
            }
        }
    }
}
