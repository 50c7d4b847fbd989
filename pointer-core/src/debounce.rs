//! Press debouncing for a single digital input.

use crate::types::EdgeEvent;

/// Observable state of a [`DebounceFilter`].
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceState {
    /// A press is in progress (the previous sample was pressed).
    pub armed: bool,
    /// Pressed samples seen since the press was armed.
    pub elapsed_ticks: u16,
    /// True only on the tick the press was accepted.
    pub confirmed: bool,
}

/// Turns a bouncing raw sample stream into one [`EdgeEvent::Press`] per press.
///
/// A press is accepted once `threshold` consecutive pressed samples have been
/// observed, counting the sample that armed it. After that the filter stays
/// latched until the input is released, so holding the button never retriggers.
#[derive(Clone, Debug)]
pub struct DebounceFilter {
    state: DebounceState,
    latched: bool,
    threshold: u16,
}

impl DebounceFilter {
    /// Create a filter. A threshold of 0 behaves like 1.
    #[must_use]
    pub const fn new(threshold: u16) -> Self {
        Self {
            state: DebounceState {
                armed: false,
                elapsed_ticks: 0,
                confirmed: false,
            },
            latched: false,
            threshold,
        }
    }

    /// Feed one raw sample. Must be called exactly once per tick.
    pub fn observe(&mut self, raw: bool) -> Option<EdgeEvent> {
        self.state.confirmed = false;

        if !raw {
            self.release();
            return None;
        }

        if !self.state.armed {
            // Fresh press: the debounce window starts with this sample.
            self.state.armed = true;
            self.state.elapsed_ticks = 0;
        } else if !self.latched {
            self.state.elapsed_ticks = self.state.elapsed_ticks.saturating_add(1);
        }

        if self.latched {
            return None;
        }

        let pressed_samples = u32::from(self.state.elapsed_ticks) + 1;
        if pressed_samples >= u32::from(self.threshold) {
            self.state.confirmed = true;
            self.latched = true;
            return Some(EdgeEvent::Press);
        }

        None
    }

    /// Return to the released state.
    pub fn reset(&mut self) {
        self.release();
        self.state.confirmed = false;
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> DebounceState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    fn release(&mut self) {
        self.state.armed = false;
        self.state.elapsed_ticks = 0;
        self.latched = false;
    }
}
