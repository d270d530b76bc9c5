//! USB link sessions and the handshake between the decode and USB tasks.
//!
//! One session is one enumeration with a fixed personality. The USB task
//! waits for an attach request, builds the device for the current
//! personality and serves it until a detach request arrives. Inside a
//! session the dispatch loop only runs between a launch and a halt.

use crate::descriptors::identity;
use crate::usb_output::{
    configure_usb_hid, usb_config, HidSink, LinkFlags, LinkState, ReportRequestHandler,
};
use defmt::{info, warn};
use divapad_core::{
    Config, DispatchControl, DispatchHandles, Dispatcher, InputLines, Personality, Transport,
};
use embassy_futures::select::{select, Either};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Delay, Duration, Instant, Ticker};
use embassy_usb::class::hid::State;
use embassy_usb::Builder;
use portable_atomic::{AtomicBool, Ordering};

/// How long a disconnect request waits for the USB task to tear down.
const RELEASE_TIMEOUT: Duration = Duration::from_millis(100);

/// Requests from the decode task to the USB task.
pub struct Link {
    attach: Signal<CriticalSectionRawMutex, ()>,
    detach: Signal<CriticalSectionRawMutex, ()>,
    launch: Signal<CriticalSectionRawMutex, ()>,
    halt: Signal<CriticalSectionRawMutex, ()>,
    idle: Signal<CriticalSectionRawMutex, ()>,
    released: Signal<CriticalSectionRawMutex, ()>,
    down: AtomicBool,
}

impl Link {
    /// Link with no pending request and no session.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attach: Signal::new(),
            detach: Signal::new(),
            launch: Signal::new(),
            halt: Signal::new(),
            idle: Signal::new(),
            released: Signal::new(),
            down: AtomicBool::new(true),
        }
    }

    /// Request the first session at boot.
    pub fn boot(&self) {
        self.attach.signal(());
        self.launch.signal(());
    }

    /// Wait until a session is requested and clear stale requests of the
    /// previous one.
    pub async fn wait_attach(&self) {
        self.attach.wait().await;
        self.detach.reset();
        self.halt.reset();
        self.idle.reset();
        self.released.reset();
        self.down.store(false, Ordering::Release);
    }

    /// Drop the bus pull-up and acknowledge the disconnect.
    ///
    /// The device was already torn down with its session; without the
    /// pull-up the host sees a detach.
    pub fn release(&self) {
        embassy_rp::pac::USB
            .sie_ctrl()
            .modify(|w| w.set_pullup_en(false));
        self.down.store(true, Ordering::Release);
        self.released.signal(());
        info!("USB detached");
    }

    /// `true` while no session is enumerated.
    pub fn is_down(&self) -> bool {
        self.down.load(Ordering::Acquire)
    }
}

impl Default for Link {
    fn default() -> Self {
        Self::new()
    }
}

/// Serve one enumeration as `personality` until the link is detached.
pub async fn run_session<L: InputLines>(
    driver: Driver<'_, USB>,
    personality: Personality,
    link: &Link,
    lines: L,
    handles: &mut DispatchHandles<'_>,
    config: &Config,
) {
    let identity = identity(personality);
    info!("USB attaching as {} ({=u16:04x}:{=u16:04x})", personality, identity.vid, identity.pid);

    let mut config_descriptor = [0u8; 256];
    let mut bos_descriptor = [0u8; 256];
    let mut msos_descriptor = [0u8; 256];
    let mut control_buf = [0u8; 64];
    let flags = LinkFlags::new();
    let mut link_state = LinkState::new(&flags);
    let mut request_handler = ReportRequestHandler;
    let mut hid_state = State::new();

    let mut builder = Builder::new(
        driver,
        usb_config(identity),
        &mut config_descriptor,
        &mut bos_descriptor,
        &mut msos_descriptor,
        &mut control_buf,
    );
    builder.handler(&mut link_state);
    let writer = configure_usb_hid(&mut builder, &mut hid_state, identity, &mut request_handler);
    let mut device = builder.build();

    let sink = HidSink::new(writer, &flags);
    let mut dispatcher = Dispatcher::new(lines, sink, Delay, personality, config);
    let sample_period = Duration::from_micros(config.sample_period_us);

    let dispatch = async {
        if let Either::First(()) = select(link.launch.wait(), link.halt.wait()).await {
            info!("dispatch running as {}", dispatcher.personality());
            let mut ticker = Ticker::every(sample_period);
            let passes = async {
                loop {
                    ticker.next().await;
                    if let Err(e) = dispatcher.cycle(Instant::now().as_micros(), handles).await {
                        warn!("report dropped: {:?}", e);
                    }
                }
            };
            select(passes, link.halt.wait()).await;
            info!("dispatch halted");
        }
        link.idle.signal(());
        link.detach.wait().await;
    };

    select(device.run(), dispatch).await;
}

/// [`Transport`] half of the link, driven by the supervisor.
pub struct UsbTransport<'a> {
    link: &'a Link,
}

impl<'a> UsbTransport<'a> {
    pub fn new(link: &'a Link) -> Self {
        Self { link }
    }
}

impl Transport for UsbTransport<'_> {
    async fn disconnect(&mut self) -> bool {
        self.link.detach.signal(());
        if with_timeout(RELEASE_TIMEOUT, self.link.released.wait()).await.is_ok() {
            return true;
        }
        let down = self.link.is_down();
        if !down {
            warn!("USB disconnect pending, retrying");
        }
        down
    }

    fn connect(&mut self) {
        self.link.attach.signal(());
    }
}

/// [`DispatchControl`] half of the link, driven by the supervisor.
pub struct DispatchLink<'a> {
    link: &'a Link,
}

impl<'a> DispatchLink<'a> {
    pub fn new(link: &'a Link) -> Self {
        Self { link }
    }
}

impl DispatchControl for DispatchLink<'_> {
    async fn halt(&mut self) {
        info!("halting dispatch for personality switch");
        self.link.halt.signal(());
        self.link.idle.wait().await;
    }

    fn launch(&mut self) {
        self.link.launch.signal(());
    }
}
