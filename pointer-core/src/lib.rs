//! Platform-agnostic HID pointer pipeline.
//!
//! This crate turns a debounced button and optional sensor samples into
//! relative pointer reports, honouring the link's flow control (one report in
//! flight) and the host's HID idle rate. It has no platform dependencies and
//! runs both in embedded `no_std` firmware and on the host for testing.
//!
//! # Overview
//!
//! Each scheduler tick flows through four stages:
//!
//! - [`debounce`]: raw samples to clean press edges ([`DebounceFilter`])
//! - [`mode`]: session state machine and emulate/passthrough flag ([`ModeController`])
//! - [`motion`]: candidate displacement for the current mode ([`MotionSource`])
//! - [`gate`]: whether the candidate must be sent now ([`ReportGate`])
//!
//! [`pipeline`] wires them together behind a [`LinkAdapter`] ([`Pipeline`]),
//! and [`link`] holds the notification latch the transport writes into.
//!
//! # Example
//!
//! ```rust
//! use pointer_core::{
//!     LinkAdapter, LinkEvent, LinkNotifications, Pipeline, PipelineConfig, Report,
//!     SessionState, TickInputs, TransferHandle,
//! };
//!
//! struct Host(u32);
//!
//! impl LinkAdapter for Host {
//!     fn submit(&mut self, _report: &Report) -> TransferHandle {
//!         self.0 += 1;
//!         TransferHandle(self.0)
//!     }
//! }
//!
//! let mut pipeline = Pipeline::new(PipelineConfig::new(), Host(0));
//!
//! let mut notifications = LinkNotifications::new();
//! notifications.notify_status(LinkEvent::Opened);
//! notifications.notify_status(LinkEvent::Configured);
//!
//! let outcome = pipeline.tick(TickInputs::button(false), notifications);
//! assert_eq!(pipeline.session(), SessionState::Active);
//! assert!(outcome.submitted.is_some());
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)
//! - **`log`**: Log through the `log` facade instead
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// This must go first so the logging macros are visible to the other modules.
mod fmt;

pub mod config;
pub mod debounce;
pub mod error;
pub mod gate;
pub mod link;
pub mod mode;
pub mod motion;
pub mod pipeline;
pub mod types;

// Re-export main types at crate root
pub use config::PipelineConfig;
pub use debounce::{DebounceFilter, DebounceState};
pub use error::{CoreError, Parameter};
pub use gate::{GateTimers, ReportGate};
pub use link::{LinkAdapter, LinkNotifications, TransferHandle};
pub use mode::{ModeController, Transition};
pub use motion::{MotionSource, DIRECTION_TABLE};
pub use pipeline::{Pipeline, TickInputs, TickOutcome};
pub use types::{Buttons, EdgeEvent, LinkEvent, Mode, Report, SensorSample, SessionState};
