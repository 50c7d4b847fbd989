//! Pipeline: one scheduler tick from raw input to an optional submitted report.

use crate::config::PipelineConfig;
use crate::debounce::DebounceFilter;
use crate::error::CoreError;
use crate::gate::ReportGate;
use crate::link::{LinkAdapter, LinkNotifications, TransferHandle};
use crate::mode::{ModeController, Transition};
use crate::motion::MotionSource;
use crate::types::{EdgeEvent, LinkEvent, Mode, Report, SensorSample, SessionState};

/// Inputs sampled once per tick.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickInputs {
    /// Raw button level (true = pressed).
    pub raw: bool,
    /// Sensor delta for passthrough mode, if one is available.
    pub sensor: Option<SensorSample>,
}

impl TickInputs {
    #[must_use]
    pub const fn button(raw: bool) -> Self {
        Self { raw, sensor: None }
    }
}

/// What a tick did, for logging and tests.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickOutcome {
    pub edge: Option<EdgeEvent>,
    pub mode_toggled: bool,
    pub submitted: Option<(Report, TransferHandle)>,
}

/// The full debounce → mode → motion → gate pipeline, bound to a link.
///
/// All state is owned here and only changes inside [`tick`](Self::tick),
/// [`handle_link_event`](Self::handle_link_event) and
/// [`reinitialize`](Self::reinitialize).
///
/// # Error Handling
///
/// Errors raised while applying notifications are logged and dropped; the
/// tick always runs to completion.
pub struct Pipeline<L> {
    config: PipelineConfig,
    debounce: DebounceFilter,
    controller: ModeController,
    motion: MotionSource,
    gate: ReportGate,
    tick: u32,
    link: L,
}

impl<L: LinkAdapter> Pipeline<L> {
    /// Create a pipeline in its initial state (`Init`, emulate mode).
    pub fn new(config: PipelineConfig, link: L) -> Self {
        Self {
            config,
            debounce: DebounceFilter::new(config.debounce_threshold()),
            controller: ModeController::new(),
            motion: MotionSource::new(config.movement_cadence()),
            gate: ReportGate::from_config(&config),
            tick: 0,
            link,
        }
    }

    /// Run one scheduler tick.
    ///
    /// `notifications` holds everything the link latched since the previous
    /// tick; it is applied before the input is processed.
    pub fn tick(&mut self, inputs: TickInputs, notifications: LinkNotifications) -> TickOutcome {
        self.apply_notifications(notifications);

        let mut outcome = TickOutcome {
            edge: self.debounce.observe(inputs.raw),
            ..TickOutcome::default()
        };
        if let Some(edge) = outcome.edge {
            outcome.mode_toggled = self.controller.handle_edge(edge);
        }

        if self.controller.is_active() {
            let candidate = self
                .motion
                .next(self.controller.mode(), self.tick, inputs.sensor);
            if let Some(report) = self.gate.tick(candidate) {
                let handle = self.link.submit(&report);
                trace!("submitted {:?} as {:?}", report, handle);
                outcome.submitted = Some((report, handle));
            }
        }

        self.tick = self.tick.wrapping_add(1);
        outcome
    }

    /// Apply latched notifications: completion, then idle rate, then status
    /// events in arrival order.
    pub fn apply_notifications(&mut self, mut notifications: LinkNotifications) {
        if notifications.transmit_complete() {
            if let Err(e) = self.gate.on_transmit_complete() {
                debug!("{:?}", e);
            }
        }
        if let Some(idle_rate) = notifications.idle_rate() {
            // Out-of-range values are clamped and logged by the gate.
            let _ = self.gate.set_idle_rate(idle_rate);
        }
        while let Some(event) = notifications.pop_status() {
            if let Err(e) = self.handle_link_event(event) {
                warn!("{:?}", e);
            }
        }
    }

    /// Apply one link status event, including its side effects.
    pub fn handle_link_event(&mut self, event: LinkEvent) -> Result<Transition, CoreError> {
        let transition = self.controller.handle_link_event(event)?;
        if let Transition::SessionReset { from } = transition {
            info!("link {:?} in {:?}, clearing report history", event, from);
            self.gate.reset();
        }
        Ok(transition)
    }

    /// Return every component to its initial state. This is the only way out
    /// of [`SessionState::Error`].
    pub fn reinitialize(&mut self) {
        info!("reinitialising pipeline");
        self.debounce.reset();
        self.controller.reset();
        self.motion.reset();
        self.gate = ReportGate::from_config(&self.config);
        self.tick = 0;
    }

    #[inline]
    #[must_use]
    pub fn session(&self) -> SessionState {
        self.controller.session()
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.controller.mode()
    }

    /// Whether the link is up and reports flow.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.controller.is_active()
    }

    #[inline]
    #[must_use]
    pub fn gate(&self) -> &ReportGate {
        &self.gate
    }

    #[inline]
    #[must_use]
    pub fn debounce(&self) -> &DebounceFilter {
        &self.debounce
    }

    #[inline]
    #[must_use]
    pub fn motion(&self) -> &MotionSource {
        &self.motion
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Ticks run since start or the last reinitialisation (wrapping).
    #[inline]
    #[must_use]
    pub fn tick_count(&self) -> u32 {
        self.tick
    }

    /// Get a reference to the link.
    pub fn link(&self) -> &L {
        &self.link
    }
}
