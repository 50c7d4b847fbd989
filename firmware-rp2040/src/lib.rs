//! USB HID pointer firmware for RP2040.
//!
//! This crate wires the platform-agnostic [`pointer_core`] pipeline to the
//! RP2040 USB device peripheral and a GPIO button. The binary in
//! `src/bin/main.rs` owns the tasks; this library holds the pieces they share.

#![no_std]

// Re-export core types for convenience
pub use pointer_core::{
    Buttons, CoreError, LinkAdapter, LinkEvent, LinkNotifications, Mode, Pipeline,
    PipelineConfig, Report, SensorSample, SessionState, TickInputs, TickOutcome, TransferHandle,
};

pub mod button;
pub mod usb_link;

pub use button::ButtonInput;
pub use usb_link::{
    configure_usb_hid, notify, run_report_writer, take_notifications, IdleRequestHandler,
    LinkStatusHandler, MouseReport, ReportOutbox, UsbLink,
};
