//! Decode-context supervisor: drains the bus and owns the personality
//! switch.
//!
//! A switch never mutates a live USB identity. The dispatch context is
//! halted, the link is torn down, the personality flips, and only then is
//! the link restored and dispatch relaunched, so the host re-enumerates a
//! fresh device.

use crate::bus::BusEventSource;
use crate::config::Config;
use crate::decoder::BusDecoder;
use crate::shared::DecodeHandles;
use crate::types::Personality;
use core::future::Future;
use embedded_hal_async::delay::DelayNs;

/// Host-visible link control.
pub trait Transport {
    /// Request a disconnect and wait briefly for the teardown. Resolves to
    /// `true` once it is acknowledged; callers retry until it is.
    fn disconnect(&mut self) -> impl Future<Output = bool>;

    /// Restore the link after a disconnect.
    fn connect(&mut self);
}

/// Start/stop control of the dispatch context.
pub trait DispatchControl {
    /// Stop dispatch and resolve once it is no longer running.
    fn halt(&mut self) -> impl Future<Output = ()>;

    /// Start a fresh dispatch session with the current personality.
    fn launch(&mut self);
}

/// Supervisor state over the active personality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SupervisorState {
    Running(Personality),
    Switching { from: Personality, to: Personality },
}

/// Polls the mode-select line every `mode_poll_period` decode iterations
/// and runs the switch sequence on a mismatch.
pub struct Supervisor<T, D, Dl> {
    transport: T,
    dispatch: D,
    delay: Dl,
    config: Config,
    countdown: u16,
    state: SupervisorState,
}

impl<T: Transport, D: DispatchControl, Dl: DelayNs> Supervisor<T, D, Dl> {
    /// Create a supervisor for a device that booted as `active`.
    pub fn new(transport: T, dispatch: D, delay: Dl, active: Personality, config: Config) -> Self {
        Self {
            transport,
            dispatch,
            delay,
            config,
            countdown: config.mode_poll_period,
            state: SupervisorState::Running(active),
        }
    }

    /// Current state.
    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Count one decode iteration; `true` when the select line is due.
    pub fn tick(&mut self) -> bool {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown == 0 {
            self.countdown = self.config.mode_poll_period.max(1);
            true
        } else {
            false
        }
    }

    /// One decode iteration of mode supervision.
    ///
    /// `read_select` is only called when the poll period elapsed. Returns
    /// the new personality when a switch happened.
    pub async fn poll<F>(
        &mut self,
        read_select: F,
        handles: &mut DecodeHandles<'_>,
    ) -> Option<Personality>
    where
        F: FnOnce() -> Personality,
    {
        if !self.tick() {
            return None;
        }

        let requested = read_select();
        let active = handles.state.personality();
        if requested == active {
            return None;
        }

        self.switch(active, requested, handles).await;
        Some(requested)
    }

    async fn switch(&mut self, from: Personality, to: Personality, handles: &mut DecodeHandles<'_>) {
        self.state = SupervisorState::Switching { from, to };

        self.dispatch.halt().await;

        while !self.transport.disconnect().await {
            self.delay.delay_ms(self.config.disconnect_retry_ms).await;
        }

        handles.personality.set(to);
        self.delay.delay_ms(self.config.settle_ms).await;

        self.transport.connect();
        self.delay.delay_ms(self.config.reconnect_ms).await;

        self.dispatch.launch();
        self.countdown = self.config.mode_poll_period.max(1);
        self.state = SupervisorState::Running(to);
    }

    /// Drain bus events into the slider mask forever, checking the mode
    /// switch between events.
    pub async fn run<S, F>(
        &mut self,
        source: &mut S,
        decoder: &mut BusDecoder,
        handles: &mut DecodeHandles<'_>,
        mut read_select: F,
    ) -> !
    where
        S: BusEventSource,
        F: FnMut() -> Personality,
    {
        loop {
            self.poll(&mut read_select, handles).await;
            let event = source.next_event().await;
            handles.slider.apply(decoder.feed(event));
        }
    }

    /// Get a reference to the dispatch control.
    pub fn dispatch(&self) -> &D {
        &self.dispatch
    }
}
