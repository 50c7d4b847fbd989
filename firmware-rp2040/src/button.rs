//! Raw push-button sampling.

use embedded_hal::digital::InputPin;

/// A push button sampled once per tick.
///
/// Returns the raw, undebounced level; the pipeline's debounce filter does the rest.
pub struct ButtonInput<P> {
    pin: P,
    active_low: bool,
}

impl<P: InputPin> ButtonInput<P> {
    /// Button wired to ground with a pull-up (pressed reads low).
    pub fn active_low(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
        }
    }

    /// Button wired to the supply with a pull-down (pressed reads high).
    pub fn active_high(pin: P) -> Self {
        Self {
            pin,
            active_low: false,
        }
    }

    /// Sample the raw level (true = pressed). A read error counts as released.
    pub fn sample(&mut self) -> bool {
        let level = if self.active_low {
            self.pin.is_low()
        } else {
            self.pin.is_high()
        };
        level.unwrap_or(false)
    }
}
