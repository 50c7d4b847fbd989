//! Pipeline configuration: defaults, valid ranges and clamping setters.
//!
//! All timing values are expressed in scheduler ticks unless the name says
//! otherwise. The defaults assume the firmware's 1 ms tick.

use core::ops::RangeInclusive;

use crate::error::{CoreError, Parameter};

/// Consecutive pressed samples needed to accept a press (50 ms at 1 ms/tick).
pub const DEFAULT_DEBOUNCE_TICKS: u16 = 50;

/// Ticks spent on each direction-table entry in emulate mode.
pub const DEFAULT_MOVEMENT_CADENCE_TICKS: u16 = 50;

/// Scheduler period.
pub const DEFAULT_MS_PER_TICK: u8 = 1;

/// HID idle rates are expressed in 4 ms units.
pub const DEFAULT_IDLE_UNIT_MS: u8 = 4;

pub const DEBOUNCE_TICKS_RANGE: RangeInclusive<u32> = 1..=1000;
pub const MOVEMENT_CADENCE_RANGE: RangeInclusive<u32> = 1..=1000;
pub const MS_PER_TICK_RANGE: RangeInclusive<u32> = 1..=255;
pub const IDLE_UNIT_MS_RANGE: RangeInclusive<u32> = 1..=255;
/// The idle duration is a single byte on the wire; 0 disables idle reports.
pub const IDLE_RATE_RANGE: RangeInclusive<u32> = 0..=255;

/// Clamp `requested` into `range`.
///
/// Returns the value to apply and, when clamping happened, the matching
/// [`CoreError::ConfigurationOutOfRange`].
pub(crate) fn clamp(
    parameter: Parameter,
    requested: u32,
    range: RangeInclusive<u32>,
) -> (u32, Result<(), CoreError>) {
    let applied = requested.clamp(*range.start(), *range.end());
    if applied == requested {
        (applied, Ok(()))
    } else {
        warn!(
            "{:?} out of range: requested {}, applied {}",
            parameter,
            requested,
            applied
        );
        (
            applied,
            Err(CoreError::ConfigurationOutOfRange {
                parameter,
                requested,
                applied,
            }),
        )
    }
}

/// Convert an idle duration in milliseconds to idle-rate units.
///
/// A zero unit has no meaningful rate and yields 0 (idle reports disabled).
#[inline]
#[must_use]
pub const fn idle_rate_from_millis(duration_ms: u32, idle_unit_ms: u8) -> u32 {
    if idle_unit_ms == 0 {
        return 0;
    }
    duration_ms / idle_unit_ms as u32
}

/// Convert an idle rate back to milliseconds.
#[inline]
#[must_use]
pub const fn idle_rate_to_millis(idle_rate: u8, idle_unit_ms: u8) -> u32 {
    idle_rate as u32 * idle_unit_ms as u32
}

/// Static configuration of a [`Pipeline`](crate::Pipeline).
///
/// Fields are private so every instance is within range: the `set_*`
/// methods clamp and report, the `with_*` builders clamp and log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PipelineConfig {
    debounce_threshold: u16,
    movement_cadence: u16,
    ms_per_tick: u8,
    idle_unit_ms: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            debounce_threshold: DEFAULT_DEBOUNCE_TICKS,
            movement_cadence: DEFAULT_MOVEMENT_CADENCE_TICKS,
            ms_per_tick: DEFAULT_MS_PER_TICK,
            idle_unit_ms: DEFAULT_IDLE_UNIT_MS,
        }
    }

    #[inline]
    #[must_use]
    pub const fn debounce_threshold(&self) -> u16 {
        self.debounce_threshold
    }

    #[inline]
    #[must_use]
    pub const fn movement_cadence(&self) -> u16 {
        self.movement_cadence
    }

    #[inline]
    #[must_use]
    pub const fn ms_per_tick(&self) -> u8 {
        self.ms_per_tick
    }

    #[inline]
    #[must_use]
    pub const fn idle_unit_ms(&self) -> u8 {
        self.idle_unit_ms
    }

    /// Set the debounce threshold. On `Err` the clamped value is in effect.
    pub fn set_debounce_threshold(&mut self, ticks: u32) -> Result<(), CoreError> {
        let (applied, result) = clamp(Parameter::DebounceThreshold, ticks, DEBOUNCE_TICKS_RANGE);
        self.debounce_threshold = applied as u16;
        result
    }

    /// Set the emulate-mode movement cadence. On `Err` the clamped value is in effect.
    pub fn set_movement_cadence(&mut self, ticks: u32) -> Result<(), CoreError> {
        let (applied, result) = clamp(Parameter::MovementCadence, ticks, MOVEMENT_CADENCE_RANGE);
        self.movement_cadence = applied as u16;
        result
    }

    /// Set the scheduler period. On `Err` the clamped value is in effect.
    pub fn set_ms_per_tick(&mut self, ms: u32) -> Result<(), CoreError> {
        let (applied, result) = clamp(Parameter::MsPerTick, ms, MS_PER_TICK_RANGE);
        self.ms_per_tick = applied as u8;
        result
    }

    /// Set the idle-rate unit. On `Err` the clamped value is in effect.
    pub fn set_idle_unit_ms(&mut self, ms: u32) -> Result<(), CoreError> {
        let (applied, result) = clamp(Parameter::IdleUnitMs, ms, IDLE_UNIT_MS_RANGE);
        self.idle_unit_ms = applied as u8;
        result
    }

    #[must_use]
    pub fn with_debounce_threshold(mut self, ticks: u32) -> Self {
        let _ = self.set_debounce_threshold(ticks);
        self
    }

    #[must_use]
    pub fn with_movement_cadence(mut self, ticks: u32) -> Self {
        let _ = self.set_movement_cadence(ticks);
        self
    }

    #[must_use]
    pub fn with_ms_per_tick(mut self, ms: u32) -> Self {
        let _ = self.set_ms_per_tick(ms);
        self
    }

    #[must_use]
    pub fn with_idle_unit_ms(mut self, ms: u32) -> Self {
        let _ = self.set_idle_unit_ms(ms);
        self
    }
}
