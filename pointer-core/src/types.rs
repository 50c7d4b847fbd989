//! Core pointer types: Buttons, Report, SensorSample, and the session/mode enums.

use core::ops::{BitOr, BitOrAssign};

/// Pointer buttons as a bitfield.
///
/// Bit positions match the first byte of a boot-protocol mouse report.
///
/// # Example
///
/// ```
/// use pointer_core::Buttons;
///
/// let buttons = Buttons::LEFT | Buttons::RIGHT;
/// assert!(buttons.contains(Buttons::LEFT));
/// assert!(!Buttons::NONE.contains(Buttons::RIGHT));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons(pub u8);

impl Buttons {
    pub const LEFT: Self = Self(1 << 0);
    pub const RIGHT: Self = Self(1 << 1);

    /// All buttons released.
    pub const NONE: Self = Self(0);

    /// Check if the given button(s) are pressed.
    #[inline]
    #[must_use]
    pub const fn contains(self, button: Buttons) -> bool {
        (self.0 & button.0) == button.0
    }

    /// Set or clear button(s).
    #[inline]
    pub fn set(&mut self, button: Buttons, pressed: bool) {
        if pressed {
            self.0 |= button.0;
        } else {
            self.0 &= !button.0;
        }
    }

    /// Get the raw bitfield.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Check if no buttons are pressed.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Buttons {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Buttons {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// One relative pointer report.
///
/// Compared structurally: two reports are "unchanged" when displacement and
/// buttons are identical.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Report {
    pub dx: i8,
    pub dy: i8,
    pub buttons: Buttons,
}

impl Report {
    /// No motion, all buttons released.
    pub const NEUTRAL: Self = Self::new(0, 0, Buttons::NONE);

    #[must_use]
    pub const fn new(dx: i8, dy: i8, buttons: Buttons) -> Self {
        Self { dx, dy, buttons }
    }

    /// Displacement limited to the symmetric HID axis range (-127..=127).
    #[inline]
    #[must_use]
    pub const fn hid_axes(&self) -> (i8, i8) {
        (clamp_axis(self.dx), clamp_axis(self.dy))
    }

    /// True when the report carries a non-zero displacement.
    #[inline]
    #[must_use]
    pub const fn has_motion(&self) -> bool {
        self.dx != 0 || self.dy != 0
    }
}

/// Lowest axis value a HID relative axis with Logical Minimum -127 accepts.
pub const HID_AXIS_MIN: i8 = -127;

const fn clamp_axis(value: i8) -> i8 {
    if value < HID_AXIS_MIN {
        HID_AXIS_MIN
    } else {
        value
    }
}

/// Displacement supplied by an external sensor for passthrough mode.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorSample {
    pub dx: i8,
    pub dy: i8,
    pub buttons: Buttons,
}

impl SensorSample {
    #[must_use]
    pub const fn new(dx: i8, dy: i8) -> Self {
        Self {
            dx,
            dy,
            buttons: Buttons::NONE,
        }
    }
}

impl From<SensorSample> for Report {
    fn from(sample: SensorSample) -> Self {
        Self::new(sample.dx, sample.dy, sample.buttons)
    }
}

/// Clean edge emitted by the debounce filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeEvent {
    Press,
}

/// Motion sub-mode, toggled by the button while the session is active.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Walk the built-in direction table (circular motion).
    #[default]
    Emulate,
    /// Forward the externally supplied sensor delta.
    Passthrough,
}

impl Mode {
    #[inline]
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Mode::Emulate => Mode::Passthrough,
            Mode::Passthrough => Mode::Emulate,
        }
    }
}

/// Session state of the mode controller.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    #[default]
    Init,
    WaitForLink,
    Active,
    Error,
}

/// Link status notifications delivered by the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// The transport handle was opened.
    Opened,
    /// The host selected a configuration.
    Configured,
    /// The host dropped the configuration.
    Deconfigured,
    /// Bus reset.
    Reset,
    /// Unrecoverable transport failure.
    Error,
}

impl LinkEvent {
    /// `Deconfigured` and `Reset` drive the same transition from every state.
    #[inline]
    #[must_use]
    pub const fn resets_session(self) -> bool {
        matches!(self, LinkEvent::Deconfigured | LinkEvent::Reset)
    }

    /// Applying `self` right after `other` changes nothing.
    #[inline]
    #[must_use]
    pub const fn repeats(self, other: LinkEvent) -> bool {
        (self.resets_session() && other.resets_session()) || self as u8 == other as u8
    }
}
