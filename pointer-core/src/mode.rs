//! Session state machine and emulate/passthrough mode flag.
//!
//! Transition table (anything else is [`CoreError::InvalidTransition`]):
//!
//! | From                  | Event                    | To          | Side effect                     |
//! |-----------------------|--------------------------|-------------|---------------------------------|
//! | `Init`                | `Opened`                 | WaitForLink |                                 |
//! | `WaitForLink`         | `Configured`             | Active      |                                 |
//! | `WaitForLink`/`Active`| `Deconfigured`/`Reset`   | WaitForLink | mode := Emulate, clear history  |
//! | any but `Error`       | `Error`                  | Error       |                                 |
//!
//! Press edges toggle the mode only while `Active`. `Error` has no way out
//! short of [`ModeController::reset`].

use crate::error::CoreError;
use crate::types::{EdgeEvent, LinkEvent, Mode, SessionState};

/// Result of an accepted link event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// Plain state change, nothing else for the caller to do.
    Moved { from: SessionState, to: SessionState },
    /// The link was deconfigured or reset. The mode is already back to
    /// [`Mode::Emulate`]; the caller must clear its report history.
    SessionReset { from: SessionState },
}

/// Owns [`SessionState`] and [`Mode`]. Holds no timers.
#[derive(Clone, Debug, Default)]
pub struct ModeController {
    session: SessionState,
    mode: Mode,
}

impl ModeController {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            session: SessionState::Init,
            mode: Mode::Emulate,
        }
    }

    #[inline]
    #[must_use]
    pub fn session(&self) -> SessionState {
        self.session
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session == SessionState::Active
    }

    /// Apply a link status event.
    ///
    /// On `Err` the state is unchanged.
    pub fn handle_link_event(&mut self, event: LinkEvent) -> Result<Transition, CoreError> {
        use LinkEvent as E;
        use SessionState as S;

        let from = self.session;
        let transition = match (from, event) {
            (S::Init, E::Opened) => self.move_to(S::WaitForLink),
            (S::WaitForLink, E::Configured) => self.move_to(S::Active),
            (S::WaitForLink | S::Active, E::Deconfigured | E::Reset) => {
                self.session = S::WaitForLink;
                self.mode = Mode::Emulate;
                Transition::SessionReset { from }
            }
            (S::Init | S::WaitForLink | S::Active, E::Error) => self.move_to(S::Error),
            (from, event) => return Err(CoreError::InvalidTransition { from, event }),
        };

        debug!("session {:?} --{:?}--> {:?}", from, event, self.session);
        Ok(transition)
    }

    /// Apply a debounced edge. Returns true if the mode flipped.
    pub fn handle_edge(&mut self, edge: EdgeEvent) -> bool {
        match edge {
            EdgeEvent::Press if self.is_active() => {
                self.mode = self.mode.toggled();
                info!("mode -> {:?}", self.mode);
                true
            }
            EdgeEvent::Press => {
                trace!("press ignored in {:?}", self.session);
                false
            }
        }
    }

    /// Explicit reinitialisation: back to `Init` with the default mode.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn move_to(&mut self, to: SessionState) -> Transition {
        let from = self.session;
        self.session = to;
        Transition::Moved { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active() -> ModeController {
        let mut controller = ModeController::new();
        controller.handle_link_event(LinkEvent::Opened).unwrap();
        controller.handle_link_event(LinkEvent::Configured).unwrap();
        controller
    }

    #[test]
    fn test_happy_path_to_active() {
        let mut controller = ModeController::new();
        assert_eq!(controller.session(), SessionState::Init);
        assert_eq!(
            controller.handle_link_event(LinkEvent::Opened),
            Ok(Transition::Moved {
                from: SessionState::Init,
                to: SessionState::WaitForLink
            })
        );
        assert_eq!(
            controller.handle_link_event(LinkEvent::Configured),
            Ok(Transition::Moved {
                from: SessionState::WaitForLink,
                to: SessionState::Active
            })
        );
        assert!(controller.is_active());
        assert_eq!(controller.mode(), Mode::Emulate);
    }

    #[test]
    fn test_press_toggles_only_while_active() {
        let mut controller = ModeController::new();
        assert!(!controller.handle_edge(EdgeEvent::Press));
        controller.handle_link_event(LinkEvent::Opened).unwrap();
        assert!(!controller.handle_edge(EdgeEvent::Press));
        assert_eq!(controller.mode(), Mode::Emulate);

        controller.handle_link_event(LinkEvent::Configured).unwrap();
        assert!(controller.handle_edge(EdgeEvent::Press));
        assert_eq!(controller.mode(), Mode::Passthrough);
        assert!(controller.handle_edge(EdgeEvent::Press));
        assert_eq!(controller.mode(), Mode::Emulate);
    }

    #[test]
    fn test_deconfigure_resets_mode() {
        for event in [LinkEvent::Deconfigured, LinkEvent::Reset] {
            let mut controller = active();
            controller.handle_edge(EdgeEvent::Press);
            assert_eq!(controller.mode(), Mode::Passthrough);

            assert_eq!(
                controller.handle_link_event(event),
                Ok(Transition::SessionReset {
                    from: SessionState::Active
                })
            );
            assert_eq!(controller.session(), SessionState::WaitForLink);
            assert_eq!(controller.mode(), Mode::Emulate);
        }
    }

    #[test]
    fn test_reset_while_waiting_is_a_session_reset() {
        let mut controller = ModeController::new();
        controller.handle_link_event(LinkEvent::Opened).unwrap();
        assert_eq!(
            controller.handle_link_event(LinkEvent::Reset),
            Ok(Transition::SessionReset {
                from: SessionState::WaitForLink
            })
        );
        assert_eq!(controller.session(), SessionState::WaitForLink);
    }

    #[test]
    fn test_invalid_transitions_leave_state_unchanged() {
        let mut controller = ModeController::new();
        assert_eq!(
            controller.handle_link_event(LinkEvent::Configured),
            Err(CoreError::InvalidTransition {
                from: SessionState::Init,
                event: LinkEvent::Configured
            })
        );
        assert_eq!(controller.session(), SessionState::Init);

        let mut controller = active();
        assert!(controller.handle_link_event(LinkEvent::Opened).is_err());
        assert!(controller.handle_link_event(LinkEvent::Configured).is_err());
        assert!(controller.is_active());
    }

    #[test]
    fn test_error_is_terminal() {
        let mut controller = active();
        controller.handle_link_event(LinkEvent::Error).unwrap();
        assert_eq!(controller.session(), SessionState::Error);

        for event in [
            LinkEvent::Opened,
            LinkEvent::Configured,
            LinkEvent::Deconfigured,
            LinkEvent::Reset,
            LinkEvent::Error,
        ] {
            assert_eq!(
                controller.handle_link_event(event),
                Err(CoreError::InvalidTransition {
                    from: SessionState::Error,
                    event
                })
            );
        }
        assert!(!controller.handle_edge(EdgeEvent::Press));
        assert_eq!(controller.session(), SessionState::Error);
    }

    #[test]
    fn test_reset_reinitialises() {
        let mut controller = active();
        controller.handle_link_event(LinkEvent::Error).unwrap();
        controller.reset();
        assert_eq!(controller.session(), SessionState::Init);
        assert_eq!(controller.mode(), Mode::Emulate);
    }
}
