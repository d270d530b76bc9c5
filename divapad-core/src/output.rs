//! Report sink trait and error types.

use crate::report::Report;
use core::future::Future;

/// Error type for report transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// Device not configured by the host.
    NotReady,
    /// Endpoint disabled (bus reset or disconnect).
    Disabled,
    /// Report larger than the endpoint buffer.
    BufferOverflow,
    /// Any other transport failure.
    Io,
}

/// Destination for rendered HID reports.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait ReportSink {
    /// Transmit one report.
    ///
    /// Only called after [`is_ready`](Self::is_ready) returned `true`.
    fn send(&mut self, report: &Report) -> impl Future<Output = Result<(), OutputError>>;

    /// Check if the transport can take a report right now.
    fn is_ready(&self) -> bool;
}
