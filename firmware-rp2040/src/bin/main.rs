#![no_std]
#![no_main]

use defmt::{info, unwrap};
use defmt_rtt as _;
use divapad_rp2040::{
    run_session, BusDecoder, BusSniffer, Config, DecodeHandles, DispatchHandles, DispatchLink,
    Link, ModeSelect, PinBank, SharedState, Supervisor, UsbTransport, CONFIG,
};
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::peripherals::{PIO0, USB};
use embassy_rp::pio::Pio;
use embassy_rp::usb::Driver;
use embassy_rp::Peri;
use embassy_time::{Delay, Timer};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

/// Slider, buttons and personality shared by both tasks.
static SHARED: StaticCell<SharedState> = StaticCell::new();

/// Attach/detach and launch/halt requests between the tasks.
static LINK: Link = Link::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Diva slider adapter starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- Buttons (wiring order) ---
    let mut buttons = PinBank::new([
        Input::new(p.PIN_28, Pull::Up), // Triangle
        Input::new(p.PIN_27, Pull::Up), // Square
        Input::new(p.PIN_26, Pull::Up), // Cross
        Input::new(p.PIN_22, Pull::Up), // Circle
        Input::new(p.PIN_13, Pull::Up), // L1
        Input::new(p.PIN_14, Pull::Up), // R1
        Input::new(p.PIN_17, Pull::Up), // L2
        Input::new(p.PIN_16, Pull::Up), // R2
        Input::new(p.PIN_18, Pull::Up), // Share
        Input::new(p.PIN_19, Pull::Up), // Options
        Input::new(p.PIN_20, Pull::Up), // Home
        Input::new(p.PIN_4, Pull::Up),  // R3
        Input::new(p.PIN_5, Pull::Up),  // L3
        Input::new(p.PIN_6, Pull::Up),  // Up
        Input::new(p.PIN_7, Pull::Up),  // Right
        Input::new(p.PIN_8, Pull::Up),  // Down
        Input::new(p.PIN_9, Pull::Up),  // Left
    ]);
    let mut mode = ModeSelect::new(Input::new(p.PIN_15, Pull::Up));

    // Let the pull-ups settle before the boot-time reads.
    Timer::after_millis(1).await;

    if buttons.snapshot().requests_firmware_update() {
        info!("Home + Circle held, rebooting into USB bootloader");
        embassy_rp::rom_data::reset_to_usb_boot(0, 0);
        loop {
            cortex_m::asm::wfi();
        }
    }

    let personality = mode.requested();
    info!("Booting as {}", personality);

    let shared: &'static SharedState = SHARED.init(SharedState::new(personality));
    let (decode, dispatch) = unwrap!(shared.split());

    // --- Bus sniffer ---
    let Pio { common, sm0, .. } = Pio::new(p.PIO0, Irqs);
    let sniffer = BusSniffer::new(common, sm0, p.PIN_0, p.PIN_1);

    LINK.boot();

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(usb_task(p.USB, buttons, dispatch, CONFIG).unwrap());
    spawner.spawn(decode_task(sniffer, mode, decode, CONFIG).unwrap());

    info!("Diva slider adapter initialized");
}

/// USB task - serves one USB session per personality.
#[embassy_executor::task]
async fn usb_task(
    mut usb: Peri<'static, USB>,
    mut buttons: PinBank<Input<'static>>,
    mut handles: DispatchHandles<'static>,
    config: Config,
) {
    loop {
        LINK.wait_attach().await;
        let personality = handles.state.personality();
        let driver = Driver::new(usb.reborrow(), Irqs);
        run_session(driver, personality, &LINK, &mut buttons, &mut handles, &config).await;
        LINK.release();
    }
}

/// Decode task - drains the bus sniffer and supervises personality switches.
#[embassy_executor::task]
async fn decode_task(
    mut sniffer: BusSniffer<'static, PIO0, 0>,
    mut mode: ModeSelect<Input<'static>>,
    mut handles: DecodeHandles<'static>,
    config: Config,
) {
    let active = handles.state.personality();
    let mut supervisor = Supervisor::new(
        UsbTransport::new(&LINK),
        DispatchLink::new(&LINK),
        Delay,
        active,
        config,
    );
    let mut decoder = BusDecoder::new();

    supervisor
        .run(&mut sniffer, &mut decoder, &mut handles, || mode.requested())
        .await
}
