//! USB HID report sink and device configuration.

use crate::descriptors::{Identity, MAX_POWER_MA, POLL_MS};
use defmt::{info, trace};
use divapad_core::{KeyboardReport, OutputError, Report, ReportSink};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_usb::class::hid::{HidWriter, ReportId, RequestHandler, State};
use embassy_usb::control::OutResponse;
use embassy_usb::driver::EndpointError;
use embassy_usb::{Builder, Handler};
use portable_atomic::{AtomicBool, Ordering};

/// Largest report either personality sends.
pub const MAX_REPORT_SIZE: usize = KeyboardReport::SIZE;

/// HID interrupt endpoint packet size.
pub const MAX_PACKET_SIZE: u16 = 64;

/// HID writer sized for both personalities.
pub type ReportWriter<'d> = HidWriter<'d, Driver<'d, USB>, MAX_REPORT_SIZE>;

/// Convert endpoint errors to [`OutputError`].
///
/// This is a helper function instead of a `From` impl to avoid orphan rule issues
/// (both `EndpointError` and `OutputError` are defined in external crates).
#[inline]
fn endpoint_error_to_output_error(e: EndpointError) -> OutputError {
    match e {
        EndpointError::BufferOverflow => OutputError::BufferOverflow,
        EndpointError::Disabled => OutputError::Disabled,
    }
}

/// Device configuration for `identity`.
#[must_use]
pub fn usb_config(identity: &'static Identity) -> embassy_usb::Config<'static> {
    let mut config = embassy_usb::Config::new(identity.vid, identity.pid);
    config.manufacturer = Some(identity.manufacturer);
    config.product = Some(identity.product);
    config.serial_number = Some(identity.serial_number);
    config.device_release = 0x0100;
    config.max_power = MAX_POWER_MA;
    config.max_packet_size_0 = 64;
    config.supports_remote_wakeup = true;

    // Single-interface device, no IAD.
    config.device_class = 0x00;
    config.device_sub_class = 0x00;
    config.device_protocol = 0x00;
    config.composite_with_iads = false;
    config
}

/// Host-side readiness of one session.
pub struct LinkFlags {
    configured: AtomicBool,
    suspended: AtomicBool,
}

impl LinkFlags {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            configured: AtomicBool::new(false),
            suspended: AtomicBool::new(false),
        }
    }

    /// `true` while the host has the device configured and the bus is not
    /// suspended.
    pub fn is_ready(&self) -> bool {
        self.configured.load(Ordering::Relaxed) && !self.suspended.load(Ordering::Relaxed)
    }
}

impl Default for LinkFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// Device event handler feeding [`LinkFlags`].
pub struct LinkState<'a> {
    flags: &'a LinkFlags,
}

impl<'a> LinkState<'a> {
    pub fn new(flags: &'a LinkFlags) -> Self {
        flags.configured.store(false, Ordering::Relaxed);
        flags.suspended.store(false, Ordering::Relaxed);
        Self { flags }
    }
}

impl Handler for LinkState<'_> {
    fn enabled(&mut self, enabled: bool) {
        if !enabled {
            self.flags.configured.store(false, Ordering::Relaxed);
        }
    }

    fn reset(&mut self) {
        self.flags.configured.store(false, Ordering::Relaxed);
        self.flags.suspended.store(false, Ordering::Relaxed);
    }

    fn configured(&mut self, configured: bool) {
        self.flags.configured.store(configured, Ordering::Relaxed);
        if configured {
            info!("USB configured");
        } else {
            info!("USB deconfigured");
        }
    }

    fn suspended(&mut self, suspended: bool) {
        self.flags.suspended.store(suspended, Ordering::Relaxed);
        if suspended {
            info!("USB suspended");
        } else {
            info!("USB resumed");
        }
    }
}

/// HID request handler (handles SET_REPORT, etc.).
///
/// Output reports from the host are accepted and discarded; GET_REPORT
/// stalls.
pub struct ReportRequestHandler;

impl RequestHandler for ReportRequestHandler {
    fn get_report(&mut self, _id: ReportId, _buf: &mut [u8]) -> Option<usize> {
        None
    }

    fn set_report(&mut self, _id: ReportId, data: &[u8]) -> OutResponse {
        trace!("host output report: {=[u8]:x}", data);
        OutResponse::Accepted
    }

    fn set_idle_ms(&mut self, _id: Option<ReportId>, _duration_ms: u32) {}

    fn get_idle_ms(&mut self, _id: Option<ReportId>) -> Option<u32> {
        None
    }
}

/// Configure the HID interface for `identity` in the USB builder.
///
/// Returns the HID writer for use by the dispatcher.
pub fn configure_usb_hid<'d>(
    builder: &mut Builder<'d, Driver<'d, USB>>,
    state: &'d mut State<'d>,
    identity: &'static Identity,
    request_handler: &'d mut ReportRequestHandler,
) -> ReportWriter<'d> {
    let config = embassy_usb::class::hid::Config {
        report_descriptor: identity.report_descriptor,
        request_handler: Some(request_handler),
        poll_ms: POLL_MS,
        max_packet_size: MAX_PACKET_SIZE,
        hid_subclass: embassy_usb::class::hid::HidSubclass::No,
        hid_boot_protocol: embassy_usb::class::hid::HidBootProtocol::None,
    };

    HidWriter::new(builder, state, config)
}

/// USB HID report sink.
///
/// Ready while the host has the device configured and awake.
pub struct HidSink<'d> {
    writer: ReportWriter<'d>,
    flags: &'d LinkFlags,
}

impl<'d> HidSink<'d> {
    /// Create a sink from the HID writer and the session's link flags.
    pub fn new(writer: ReportWriter<'d>, flags: &'d LinkFlags) -> Self {
        Self { writer, flags }
    }
}

impl ReportSink for HidSink<'_> {
    async fn send(&mut self, report: &Report) -> Result<(), OutputError> {
        let mut buf = [0u8; MAX_REPORT_SIZE];
        let len = report.write_to(&mut buf);
        self.writer
            .write(&buf[..len])
            .await
            .map_err(endpoint_error_to_output_error)
    }

    fn is_ready(&self) -> bool {
        self.flags.is_ready()
    }
}
