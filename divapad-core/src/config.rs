//! Compile-time tunables.

/// Timing and filtering parameters shared by both execution contexts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Sampling passes a press stays latched on a debounced line.
    /// `0` disables debouncing entirely.
    pub debounce_cycles: u16,
    /// How many of the lowest-index controls are debounced.
    pub debounced_lines: usize,
    /// Pace of the dispatch context, in microseconds per sampling pass.
    pub sample_period_us: u64,
    /// Minimum spacing between two transmitted reports.
    pub min_report_interval_us: u64,
    /// Decode iterations between two reads of the mode-select line.
    pub mode_poll_period: u16,
    /// Wait between unacknowledged disconnect attempts.
    pub disconnect_retry_ms: u32,
    /// Pause after flipping the personality, before reconnecting.
    pub settle_ms: u32,
    /// Pause after reconnecting, before relaunching dispatch.
    pub reconnect_ms: u32,
}

impl Config {
    /// Defaults matched to the face buttons of the stock controller.
    pub const DEFAULT: Self = Self {
        debounce_cycles: 50,
        debounced_lines: 4,
        sample_period_us: 100,
        min_report_interval_us: 900,
        mode_poll_period: 255,
        disconnect_retry_ms: 1000,
        settle_ms: 1000,
        reconnect_ms: 1000,
    };

    /// Same as [`Config::DEFAULT`] with debouncing off.
    pub const ZERO_LATENCY: Self = Self {
        debounce_cycles: 0,
        ..Self::DEFAULT
    };
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}
