//! Link adapter trait and the notification latch.

use heapless::Deque;

use crate::types::{LinkEvent, Report};

/// Depth of the pending link-status queue between two ticks.
pub const STATUS_QUEUE_DEPTH: usize = 4;

/// Opaque identifier of a submitted transfer, for logging only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferHandle(pub u32);

/// Host-connection transport.
///
/// `submit` is fire-and-forget: completion is reported later through
/// [`LinkNotifications::notify_transmit_complete`], never by the return value.
/// The pipeline guarantees at most one outstanding submission.
///
/// # `no_std` Compatibility
///
/// Implementations must not block and must not allocate.
pub trait LinkAdapter {
    /// Queue `report` for transmission to the host.
    fn submit(&mut self, report: &Report) -> TransferHandle;
}

/// Link notifications latched between ticks.
///
/// The transport writes into this from its own context (interrupt, USB task,
/// test harness) and the pipeline drains it once at the next tick boundary.
#[derive(Clone, Debug, Default)]
pub struct LinkNotifications {
    status: Deque<LinkEvent, STATUS_QUEUE_DEPTH>,
    transmit_complete: bool,
    idle_rate: Option<u32>,
}

impl LinkNotifications {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            status: Deque::new(),
            transmit_complete: false,
            idle_rate: None,
        }
    }

    /// Latch a status event.
    ///
    /// Nothing that decides the final session state is lost:
    /// - an event that repeats the previous one (`Reset`/`Deconfigured`
    ///   count as the same) is merged into it;
    /// - after `Error` every later event is moot and is dropped;
    /// - when the queue is full, a reset-type event is evicted first, then
    ///   any other event except `Opened` and `Error`.
    pub fn notify_status(&mut self, event: LinkEvent) {
        match self.status.back() {
            Some(&last) if event.repeats(last) => return,
            Some(LinkEvent::Error) => {
                debug!("{:?} after link error dropped", event);
                return;
            }
            _ => {}
        }

        if self.status.is_full() && !self.evict() {
            warn!("link status queue full, dropping {:?}", event);
            return;
        }
        // A slot is free at this point.
        let _ = self.status.push_back(event);
    }

    /// Free one slot. Returns false if every queued event must be kept.
    fn evict(&mut self) -> bool {
        let victim = self
            .status
            .iter()
            .position(|e| e.resets_session())
            .or_else(|| {
                self.status
                    .iter()
                    .position(|e| !matches!(e, LinkEvent::Opened | LinkEvent::Error))
            });
        let Some(victim) = victim else {
            return false;
        };

        let mut kept = Deque::new();
        for (i, &queued) in self.status.iter().enumerate() {
            if i == victim {
                warn!("link status queue full, dropping {:?}", queued);
            } else {
                let _ = kept.push_back(queued);
            }
        }
        self.status = kept;
        true
    }

    /// Latch the completion of the outstanding transfer.
    pub fn notify_transmit_complete(&mut self) {
        self.transmit_complete = true;
    }

    /// Latch a new host idle rate (idle units). Only the last value counts.
    pub fn notify_idle_rate(&mut self, idle_rate: u32) {
        self.idle_rate = Some(idle_rate);
    }

    /// Move the latched notifications out, leaving this latch empty.
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_empty() && !self.transmit_complete && self.idle_rate.is_none()
    }

    #[inline]
    #[must_use]
    pub fn transmit_complete(&self) -> bool {
        self.transmit_complete
    }

    #[inline]
    #[must_use]
    pub fn idle_rate(&self) -> Option<u32> {
        self.idle_rate
    }

    /// Next pending status event, oldest first.
    pub fn pop_status(&mut self) -> Option<LinkEvent> {
        self.status.pop_front()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;

    #[test]
    fn test_take_empties_latch() {
        let mut latch = LinkNotifications::new();
        latch.notify_status(LinkEvent::Opened);
        latch.notify_transmit_complete();
        latch.notify_idle_rate(25);
        assert!(!latch.is_empty());

        let mut taken = latch.take();
        assert!(latch.is_empty());
        assert!(taken.transmit_complete());
        assert_eq!(taken.idle_rate(), Some(25));
        assert_eq!(taken.pop_status(), Some(LinkEvent::Opened));
        assert_eq!(taken.pop_status(), None);
    }

    #[test]
    fn test_status_events_keep_order() {
        let mut latch = LinkNotifications::new();
        latch.notify_status(LinkEvent::Reset);
        latch.notify_status(LinkEvent::Configured);
        assert_eq!(latch.pop_status(), Some(LinkEvent::Reset));
        assert_eq!(latch.pop_status(), Some(LinkEvent::Configured));
    }

    fn drain(latch: &mut LinkNotifications) -> Vec<LinkEvent> {
        core::iter::from_fn(|| latch.pop_status()).collect()
    }

    #[test]
    fn test_reset_burst_is_merged() {
        let mut latch = LinkNotifications::new();
        for event in [
            LinkEvent::Opened,
            LinkEvent::Reset,
            LinkEvent::Reset,
            LinkEvent::Deconfigured,
            LinkEvent::Configured,
        ] {
            latch.notify_status(event);
        }
        assert_eq!(
            drain(&mut latch),
            [LinkEvent::Opened, LinkEvent::Reset, LinkEvent::Configured]
        );
    }

    #[test]
    fn test_full_queue_keeps_opened_and_error() {
        let mut latch = LinkNotifications::new();
        for event in [
            LinkEvent::Opened,
            LinkEvent::Configured,
            LinkEvent::Reset,
            LinkEvent::Configured,
            LinkEvent::Error,
        ] {
            latch.notify_status(event);
        }
        assert_eq!(
            drain(&mut latch),
            [
                LinkEvent::Opened,
                LinkEvent::Configured,
                LinkEvent::Configured,
                LinkEvent::Error
            ]
        );
    }

    #[test]
    fn test_full_queue_without_reset_evicts_oldest_non_opened() {
        let mut latch = LinkNotifications::new();
        for event in [
            LinkEvent::Opened,
            LinkEvent::Configured,
            LinkEvent::Opened,
            LinkEvent::Configured,
            LinkEvent::Deconfigured,
        ] {
            latch.notify_status(event);
        }
        assert_eq!(
            drain(&mut latch),
            [
                LinkEvent::Opened,
                LinkEvent::Opened,
                LinkEvent::Configured,
                LinkEvent::Deconfigured
            ]
        );
    }

    #[test]
    fn test_events_after_error_dropped() {
        let mut latch = LinkNotifications::new();
        latch.notify_status(LinkEvent::Opened);
        latch.notify_status(LinkEvent::Error);
        latch.notify_status(LinkEvent::Reset);
        latch.notify_status(LinkEvent::Opened);
        assert_eq!(drain(&mut latch), [LinkEvent::Opened, LinkEvent::Error]);
    }

    #[test]
    fn test_last_idle_rate_wins() {
        let mut latch = LinkNotifications::new();
        latch.notify_idle_rate(10);
        latch.notify_idle_rate(0);
        assert_eq!(latch.idle_rate(), Some(0));
    }
}
