//! Report gating: flow control, change detection and idle keepalive.
//!
//! The gate decides on every tick whether the candidate report goes out:
//!
//! 1. Nothing is sent while a transfer is in flight.
//! 2. A report that differs from the last one sent always goes out.
//! 3. An identical report with non-zero motion also goes out, since relative
//!    deltas are not idempotent.
//! 4. An identical zero-motion report is held back, except that with a
//!    non-zero host idle rate it is repeated once the idle interval elapses.

use crate::config::{clamp, PipelineConfig, IDLE_RATE_RANGE};
use crate::error::{CoreError, Parameter};
use crate::types::Report;

/// Timers and flags owned by the [`ReportGate`].
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GateTimers {
    /// Qualifying idle ticks since the last report went out.
    pub ticks_since_last_send: u32,
    /// Host idle rate in idle units; 0 disables idle repeats.
    pub link_idle_interval: u8,
    /// A report was handed to the link and its completion has not arrived.
    pub send_in_flight: bool,
}

#[derive(Clone, Debug)]
pub struct ReportGate {
    /// `None` until the first send, and again after a link reset.
    last_sent: Option<Report>,
    timers: GateTimers,
    ms_per_tick: u8,
    idle_unit_ms: u8,
}

impl ReportGate {
    #[must_use]
    pub const fn new(ms_per_tick: u8, idle_unit_ms: u8) -> Self {
        Self {
            last_sent: None,
            timers: GateTimers {
                ticks_since_last_send: 0,
                link_idle_interval: 0,
                send_in_flight: false,
            },
            ms_per_tick,
            idle_unit_ms,
        }
    }

    #[must_use]
    pub const fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.ms_per_tick(), config.idle_unit_ms())
    }

    /// Decide whether `candidate` must be sent now.
    ///
    /// On `Some` the report is recorded as sent and the gate is in flight
    /// until [`on_transmit_complete`](Self::on_transmit_complete).
    pub fn tick(&mut self, candidate: Report) -> Option<Report> {
        if self.timers.send_in_flight {
            return None;
        }

        let unchanged = self.last_sent == Some(candidate);
        if !unchanged || candidate.has_motion() {
            return Some(self.commit(candidate));
        }

        if self.timers.link_idle_interval == 0 {
            return None;
        }

        self.timers.ticks_since_last_send = self.timers.ticks_since_last_send.saturating_add(1);
        let elapsed_ms =
            u64::from(self.timers.ticks_since_last_send) * u64::from(self.ms_per_tick);
        let interval_ms =
            u64::from(self.timers.link_idle_interval) * u64::from(self.idle_unit_ms);

        if elapsed_ms >= interval_ms {
            trace!("idle interval elapsed after {} ticks", self.timers.ticks_since_last_send);
            Some(self.commit(candidate))
        } else {
            None
        }
    }

    /// The link finished the outstanding transfer.
    pub fn on_transmit_complete(&mut self) -> Result<(), CoreError> {
        if !self.timers.send_in_flight {
            return Err(CoreError::StaleTransferIgnored);
        }
        self.timers.send_in_flight = false;
        Ok(())
    }

    /// Apply the host idle rate (idle units). On `Err` the clamped value is in effect.
    pub fn set_idle_rate(&mut self, idle_rate: u32) -> Result<(), CoreError> {
        let (applied, result) = clamp(Parameter::IdleRate, idle_rate, IDLE_RATE_RANGE);
        self.timers.link_idle_interval = applied as u8;
        result
    }

    /// Forget the report history and any in-flight transfer.
    ///
    /// The next eligible tick sends whatever the candidate is.
    pub fn reset(&mut self) {
        self.last_sent = None;
        self.timers = GateTimers::default();
    }

    #[inline]
    #[must_use]
    pub fn last_sent(&self) -> Option<Report> {
        self.last_sent
    }

    #[inline]
    #[must_use]
    pub fn timers(&self) -> GateTimers {
        self.timers
    }

    #[inline]
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.timers.send_in_flight
    }

    #[inline]
    #[must_use]
    pub fn idle_rate(&self) -> u8 {
        self.timers.link_idle_interval
    }

    fn commit(&mut self, report: Report) -> Report {
        self.last_sent = Some(report);
        self.timers.send_in_flight = true;
        self.timers.ticks_since_last_send = 0;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Buttons;

    /// Send `report`, then acknowledge it.
    fn send_and_complete(gate: &mut ReportGate, report: Report) {
        assert_eq!(gate.tick(report), Some(report));
        gate.on_transmit_complete().unwrap();
    }

    #[test]
    fn test_first_report_always_sent() {
        let mut gate = ReportGate::new(1, 4);
        assert_eq!(gate.tick(Report::NEUTRAL), Some(Report::NEUTRAL));
        assert!(gate.is_in_flight());
        assert_eq!(gate.last_sent(), Some(Report::NEUTRAL));
    }

    #[test]
    fn test_nothing_sent_while_in_flight() {
        let mut gate = ReportGate::new(1, 4);
        gate.set_idle_rate(1).unwrap();
        gate.tick(Report::new(1, 1, Buttons::NONE));
        for dx in -5..5 {
            assert_eq!(gate.tick(Report::new(dx, 3, Buttons::LEFT)), None);
        }
        assert_eq!(gate.timers().ticks_since_last_send, 0);
    }

    #[test]
    fn test_changed_report_sent_on_next_eligible_tick() {
        let mut gate = ReportGate::new(1, 4);
        send_and_complete(&mut gate, Report::NEUTRAL);
        let pressed = Report::new(0, 0, Buttons::LEFT);
        assert_eq!(gate.tick(pressed), Some(pressed));
    }

    #[test]
    fn test_static_zero_report_suppressed_when_idle_disabled() {
        let mut gate = ReportGate::new(1, 4);
        send_and_complete(&mut gate, Report::NEUTRAL);
        for _ in 0..10_000 {
            assert_eq!(gate.tick(Report::NEUTRAL), None);
        }
        assert!(!gate.is_in_flight());
    }

    #[test]
    fn test_repeated_motion_always_sent() {
        let mut gate = ReportGate::new(1, 4);
        let nudge = Report::new(2, -2, Buttons::NONE);
        for _ in 0..5 {
            send_and_complete(&mut gate, nudge);
        }
    }

    #[test]
    fn test_keepalive_after_exactly_k_ticks() {
        // 1 tick = 4 ms, 1 idle unit = 4 ms, so idle rate K means K ticks.
        const K: u32 = 5;
        let mut gate = ReportGate::new(4, 4);
        gate.set_idle_rate(K).unwrap();
        send_and_complete(&mut gate, Report::NEUTRAL);

        for round in 0..3 {
            for tick in 1..K {
                assert_eq!(gate.tick(Report::NEUTRAL), None, "round {round} tick {tick}");
            }
            assert_eq!(gate.tick(Report::NEUTRAL), Some(Report::NEUTRAL));
            assert_eq!(gate.timers().ticks_since_last_send, 0);
            gate.on_transmit_complete().unwrap();
        }
    }

    #[test]
    fn test_keepalive_uses_millisecond_arithmetic() {
        // idle rate 2 => 8 ms; at 1 ms per tick that is 8 qualifying ticks.
        let mut gate = ReportGate::new(1, 4);
        gate.set_idle_rate(2).unwrap();
        send_and_complete(&mut gate, Report::NEUTRAL);
        for _ in 0..7 {
            assert_eq!(gate.tick(Report::NEUTRAL), None);
        }
        assert_eq!(gate.tick(Report::NEUTRAL), Some(Report::NEUTRAL));
    }

    #[test]
    fn test_stale_completion_is_reported() {
        let mut gate = ReportGate::new(1, 4);
        assert_eq!(gate.on_transmit_complete(), Err(CoreError::StaleTransferIgnored));
        send_and_complete(&mut gate, Report::NEUTRAL);
        assert_eq!(gate.on_transmit_complete(), Err(CoreError::StaleTransferIgnored));
    }

    #[test]
    fn test_reset_while_in_flight_forces_next_send() {
        let mut gate = ReportGate::new(1, 4);
        gate.tick(Report::NEUTRAL);
        assert!(gate.is_in_flight());

        gate.reset();
        assert!(!gate.is_in_flight());
        assert_eq!(gate.last_sent(), None);
        assert_eq!(gate.tick(Report::NEUTRAL), Some(Report::NEUTRAL));
    }

    #[test]
    fn test_idle_rate_clamped() {
        let mut gate = ReportGate::new(1, 4);
        assert_eq!(
            gate.set_idle_rate(300),
            Err(CoreError::ConfigurationOutOfRange {
                parameter: Parameter::IdleRate,
                requested: 300,
                applied: 255,
            })
        );
        assert_eq!(gate.idle_rate(), 255);
    }
}
