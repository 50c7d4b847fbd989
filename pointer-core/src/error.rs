//! Error kinds recognised by the pipeline.
//!
//! None of these are fatal. Each is recovered locally (ignored or clamped)
//! and surfaced to callers only so it can be logged or asserted in tests.

use crate::types::{LinkEvent, SessionState};

/// Error type for pipeline operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoreError {
    /// A link event arrived with no transition defined from the current state.
    /// The state is left unchanged.
    InvalidTransition { from: SessionState, event: LinkEvent },
    /// A transmit-complete notification arrived with nothing in flight.
    StaleTransferIgnored,
    /// A parameter was outside its valid range; `applied` is the clamped
    /// value that is now in effect.
    ConfigurationOutOfRange {
        parameter: Parameter,
        requested: u32,
        applied: u32,
    },
}

/// Tunable parameters that are range checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parameter {
    DebounceThreshold,
    MovementCadence,
    MsPerTick,
    IdleUnitMs,
    IdleRate,
}
