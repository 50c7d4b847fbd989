//! Candidate motion for the current tick.

use crate::types::{Buttons, Mode, Report, SensorSample};

/// Per-step displacement used in emulate mode.
///
/// `dx` reads the table at `step`, `dy` a quarter cycle later, which traces
/// a closed loop over eight steps.
pub const DIRECTION_TABLE: [i8; 8] = [-4, -4, -4, 0, 4, 4, 4, 0];

const QUARTER_CYCLE: usize = 2;

/// Produces the candidate report for each tick.
#[derive(Clone, Debug)]
pub struct MotionSource {
    cadence: u16,
    step: u8,
    /// Tick at which the current step began; `None` until the next emulate tick.
    step_started_at: Option<u32>,
}

impl MotionSource {
    /// `cadence` is the number of ticks spent on each table entry (0 behaves like 1).
    #[must_use]
    pub const fn new(cadence: u16) -> Self {
        Self {
            cadence,
            step: 0,
            step_started_at: None,
        }
    }

    /// Compute the candidate report.
    ///
    /// In emulate mode the step counter advances once `cadence` ticks have
    /// passed since the current step began. In passthrough mode the sensor
    /// sample is forwarded as-is, or a neutral report if there is none.
    pub fn next(&mut self, mode: Mode, tick: u32, sensor: Option<SensorSample>) -> Report {
        match mode {
            Mode::Emulate => {
                let started = *self.step_started_at.get_or_insert(tick);
                if tick.wrapping_sub(started) >= u32::from(self.cadence.max(1)) {
                    self.step = self.step.wrapping_add(1);
                    self.step_started_at = Some(tick);
                }
                Self::table_report(self.step)
            }
            Mode::Passthrough => sensor.map_or(Report::NEUTRAL, Report::from),
        }
    }

    /// Current index into [`DIRECTION_TABLE`].
    #[inline]
    #[must_use]
    pub fn step(&self) -> usize {
        usize::from(self.step) % DIRECTION_TABLE.len()
    }

    /// Restart the table from its first entry.
    pub fn reset(&mut self) {
        self.step = 0;
        self.step_started_at = None;
    }

    fn table_report(step: u8) -> Report {
        let len = DIRECTION_TABLE.len();
        let phase = usize::from(step) % len;
        Report::new(
            DIRECTION_TABLE[phase],
            DIRECTION_TABLE[(phase + QUARTER_CYCLE) % len],
            Buttons::NONE,
        )
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;

    #[test]
    fn test_step_advances_after_cadence() {
        let mut motion = MotionSource::new(50);
        let first: Vec<Report> = (0..50)
            .map(|tick| motion.next(Mode::Emulate, tick, None))
            .collect();
        assert!(first.iter().all(|r| *r == first[0]));
        assert_eq!(motion.step(), 0);

        let next = motion.next(Mode::Emulate, 50, None);
        assert_eq!(motion.step(), 1);
        assert_ne!(next, first[0]);
    }

    #[test]
    fn test_table_phase_shift() {
        let mut motion = MotionSource::new(1);
        let mut reports = Vec::new();
        for tick in 0..9 {
            reports.push(motion.next(Mode::Emulate, tick, None));
        }
        // tick 0 starts step 0, every later tick advances one step.
        assert_eq!(reports[0], Report::new(-4, -4, Buttons::NONE));
        assert_eq!(reports[1], Report::new(-4, 0, Buttons::NONE));
        assert_eq!(reports[3], Report::new(0, 4, Buttons::NONE));
        assert_eq!(reports[8], reports[0]);
        for (i, report) in reports.iter().enumerate() {
            let phase = i % 8;
            assert_eq!(report.dx, DIRECTION_TABLE[phase]);
            assert_eq!(report.dy, DIRECTION_TABLE[(phase + 2) % 8]);
            assert!(report.buttons.is_empty());
        }
    }

    #[test]
    fn test_passthrough_forwards_sensor() {
        let mut motion = MotionSource::new(50);
        let sample = SensorSample {
            dx: 7,
            dy: -3,
            buttons: Buttons::LEFT,
        };
        assert_eq!(
            motion.next(Mode::Passthrough, 0, Some(sample)),
            Report::new(7, -3, Buttons::LEFT)
        );
        assert_eq!(motion.next(Mode::Passthrough, 1, None), Report::NEUTRAL);
    }

    #[test]
    fn test_passthrough_does_not_advance_step() {
        let mut motion = MotionSource::new(10);
        motion.next(Mode::Emulate, 0, None);
        for tick in 1..100 {
            motion.next(Mode::Passthrough, tick, None);
        }
        assert_eq!(motion.step(), 0);
    }

    #[test]
    fn test_tick_wraparound() {
        let mut motion = MotionSource::new(5);
        motion.next(Mode::Emulate, u32::MAX - 2, None);
        motion.next(Mode::Emulate, 1, None);
        assert_eq!(motion.step(), 0);
        motion.next(Mode::Emulate, 2, None);
        assert_eq!(motion.step(), 1);
    }

    #[test]
    fn test_reset_restarts_table() {
        let mut motion = MotionSource::new(1);
        for tick in 0..5 {
            motion.next(Mode::Emulate, tick, None);
        }
        assert_ne!(motion.step(), 0);
        motion.reset();
        assert_eq!(motion.next(Mode::Emulate, 1000, None), Report::new(-4, -4, Buttons::NONE));
    }
}
