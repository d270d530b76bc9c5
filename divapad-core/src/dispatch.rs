//! Dispatcher: samples inputs, fuses them with the slider and hands
//! rate-limited reports to a sink.

use crate::config::Config;
use crate::input::{DebouncedSampler, InputLines};
use crate::output::{OutputError, ReportSink};
use crate::report::Report;
use crate::shared::DispatchHandles;
use crate::types::Personality;
use embassy_futures::select::{select, Either};
use embedded_hal_async::delay::DelayNs;

/// Caps transmissions to one per interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Throttle {
    interval_us: u64,
    last_us: Option<u64>,
}

impl Throttle {
    /// Allow at most one transmission per `interval_us`.
    #[must_use]
    pub const fn new(interval_us: u64) -> Self {
        Self {
            interval_us,
            last_us: None,
        }
    }

    /// Returns `true` and opens a new window when more than `interval_us`
    /// passed since the last opened window.
    pub fn poll(&mut self, now_us: u64) -> bool {
        let due = match self.last_us {
            None => true,
            Some(last) => now_us.wrapping_sub(last) > self.interval_us,
        };
        if due {
            self.last_us = Some(now_us);
        }
        due
    }
}

/// What one dispatch pass did with its report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Report transmitted.
    Sent,
    /// Inside the rate-limit window.
    Throttled,
    /// Transport not ready, or it did not take the report within one
    /// sampling period; report dropped for this pass.
    Skipped,
}

/// One dispatch session for a fixed personality.
///
/// Sampling and report building run on every pass regardless of the
/// throttle; only transmission is rate limited. A send is raced against
/// `delay` for one sampling period, so a sink that stops draining costs
/// dropped reports, never a stalled pass.
pub struct Dispatcher<L, O, Dl> {
    lines: L,
    output: O,
    delay: Dl,
    personality: Personality,
    sampler: DebouncedSampler,
    throttle: Throttle,
    send_budget_us: u32,
}

impl<L: InputLines, O: ReportSink, Dl: DelayNs> Dispatcher<L, O, Dl> {
    /// Create a dispatcher from input lines, a report sink and the delay
    /// bounding each send.
    pub fn new(lines: L, output: O, delay: Dl, personality: Personality, config: &Config) -> Self {
        Self {
            lines,
            output,
            delay,
            personality,
            sampler: DebouncedSampler::new(config.debounce_cycles, config.debounced_lines),
            throttle: Throttle::new(config.min_report_interval_us),
            send_budget_us: u32::try_from(config.sample_period_us).unwrap_or(u32::MAX),
        }
    }

    /// Personality this session renders.
    pub fn personality(&self) -> Personality {
        self.personality
    }

    /// Run one sampling pass at time `now_us`.
    ///
    /// Publishes the sampled buttons, renders the report and sends it if
    /// the throttle window is open and the sink is ready. Returns
    /// [`Outcome::Skipped`] when the sink does not take the report within
    /// one sampling period.
    pub async fn cycle(
        &mut self,
        now_us: u64,
        handles: &mut DispatchHandles<'_>,
    ) -> Result<Outcome, OutputError> {
        let buttons = self.sampler.sample(&mut self.lines);
        handles.buttons.publish(buttons);

        let report = Report::encode(self.personality, buttons, handles.state.slider());

        if !self.throttle.poll(now_us) {
            return Ok(Outcome::Throttled);
        }
        if !self.output.is_ready() {
            return Ok(Outcome::Skipped);
        }

        match select(
            self.output.send(&report),
            self.delay.delay_us(self.send_budget_us),
        )
        .await
        {
            Either::First(result) => {
                result?;
                Ok(Outcome::Sent)
            }
            Either::Second(()) => Ok(Outcome::Skipped),
        }
    }

    /// Get a reference to the output sink.
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Get a mutable reference to the output sink.
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Decompose the dispatcher into its input and output components.
    pub fn into_parts(self) -> (L, O) {
        (self.lines, self.output)
    }
}
