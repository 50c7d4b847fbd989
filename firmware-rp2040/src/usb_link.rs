//! USB HID mouse link: report encoding, host requests and the notification latch.

use core::cell::RefCell;

use defmt::{debug, info, warn, Format};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_usb::class::hid::{
    Config as HidConfig, HidBootProtocol, HidSubclass, HidWriter, ReportId, RequestHandler, State,
};
use embassy_usb::control::OutResponse;
use embassy_usb::{Builder, Handler};
use pointer_core::config::{
    idle_rate_from_millis, idle_rate_to_millis, DEFAULT_IDLE_UNIT_MS, IDLE_RATE_RANGE,
};
use pointer_core::{LinkAdapter, LinkEvent, LinkNotifications, Report, TransferHandle};
use portable_atomic::{AtomicU8, Ordering};

type UsbDriver<'d> = Driver<'d, USB>;

/// Hand-off of the one outstanding report from the tick task to the writer task.
pub type ReportOutbox = Signal<CriticalSectionRawMutex, Report>;

/// USB HID boot mouse report.
///
/// Total size: 3 bytes (buttons, X, Y).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Format)]
#[repr(C)]
pub struct MouseReport {
    /// Button bitfield (bit 0 left, bit 1 right)
    pub buttons: u8,
    /// Relative X (-127 to 127)
    pub x: i8,
    /// Relative Y (-127 to 127)
    pub y: i8,
}

impl MouseReport {
    /// Size of the report in bytes.
    pub const SIZE: usize = 3;

    #[must_use]
    pub fn as_bytes(&self) -> [u8; Self::SIZE] {
        [self.buttons, self.x as u8, self.y as u8]
    }
}

impl From<&Report> for MouseReport {
    fn from(report: &Report) -> Self {
        let (x, y) = report.hid_axes();
        Self {
            buttons: report.buttons.raw(),
            x,
            y,
        }
    }
}

/// Boot-compatible mouse report descriptor: 2 buttons, relative X/Y.
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x02, // Usage (Mouse)
    0xA1, 0x01, // Collection (Application)
    0x09, 0x01, //   Usage (Pointer)
    0xA1, 0x00, //   Collection (Physical)
    //
    // --- Buttons (2 buttons + 6 bits padding) ---
    0x05, 0x09, //     Usage Page (Button)
    0x19, 0x01, //     Usage Minimum (Button 1)
    0x29, 0x02, //     Usage Maximum (Button 2)
    0x15, 0x00, //     Logical Minimum (0)
    0x25, 0x01, //     Logical Maximum (1)
    0x95, 0x02, //     Report Count (2)
    0x75, 0x01, //     Report Size (1)
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    0x95, 0x01, //     Report Count (1)
    0x75, 0x06, //     Report Size (6)
    0x81, 0x01, //     Input (Constant)
    //
    // --- Motion ---
    0x05, 0x01, //     Usage Page (Generic Desktop)
    0x09, 0x30, //     Usage (X)
    0x09, 0x31, //     Usage (Y)
    0x15, 0x81, //     Logical Minimum (-127)
    0x25, 0x7F, //     Logical Maximum (127)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x02, //     Report Count (2)
    0x81, 0x06, //     Input (Data, Variable, Relative)
    //
    0xC0, //   End Collection
    0xC0, // End Collection
];

/// Notifications latched by the USB stack, drained by the tick task.
static LINK_NOTIFICATIONS: Mutex<CriticalSectionRawMutex, RefCell<LinkNotifications>> =
    Mutex::new(RefCell::new(LinkNotifications::new()));

/// Last idle rate set by the host, in idle units (0 = infinite).
static IDLE_RATE: AtomicU8 = AtomicU8::new(0);

/// Latch a notification for the next tick.
pub fn notify(f: impl FnOnce(&mut LinkNotifications)) {
    LINK_NOTIFICATIONS.lock(|latch| f(&mut latch.borrow_mut()));
}

/// Drain everything latched since the previous tick.
pub fn take_notifications() -> LinkNotifications {
    LINK_NOTIFICATIONS.lock(|latch| latch.borrow_mut().take())
}

/// [`LinkAdapter`] that hands reports to the HID writer task.
pub struct UsbLink {
    outbox: &'static ReportOutbox,
    next_handle: u32,
}

impl UsbLink {
    pub fn new(outbox: &'static ReportOutbox) -> Self {
        Self {
            outbox,
            next_handle: 0,
        }
    }
}

impl LinkAdapter for UsbLink {
    fn submit(&mut self, report: &Report) -> TransferHandle {
        self.next_handle = self.next_handle.wrapping_add(1);
        self.outbox.signal(*report);
        TransferHandle(self.next_handle)
    }
}

/// Maps USB device state changes to link status events.
pub struct LinkStatusHandler;

impl Handler for LinkStatusHandler {
    fn enabled(&mut self, enabled: bool) {
        info!("USB enabled: {}", enabled);
        let event = if enabled {
            LinkEvent::Opened
        } else {
            LinkEvent::Deconfigured
        };
        notify(|n| n.notify_status(event));
    }

    fn reset(&mut self) {
        info!("USB bus reset");
        // A bus reset returns the idle rate to its default.
        IDLE_RATE.store(0, Ordering::Relaxed);
        notify(|n| n.notify_status(LinkEvent::Reset));
    }

    fn configured(&mut self, configured: bool) {
        info!("USB configured: {}", configured);
        let event = if configured {
            LinkEvent::Configured
        } else {
            LinkEvent::Deconfigured
        };
        notify(|n| n.notify_status(event));
    }

    fn suspended(&mut self, suspended: bool) {
        // The pending transfer simply stalls until resume.
        info!("USB suspended: {}", suspended);
    }
}

/// HID class request handler: SET_IDLE / GET_IDLE.
pub struct IdleRequestHandler;

impl RequestHandler for IdleRequestHandler {
    fn get_report(&mut self, _id: ReportId, _buf: &mut [u8]) -> Option<usize> {
        None
    }

    fn set_report(&mut self, _id: ReportId, _data: &[u8]) -> OutResponse {
        OutResponse::Accepted
    }

    fn set_idle_ms(&mut self, _id: Option<ReportId>, duration_ms: u32) {
        debug!("SET_IDLE {} ms", duration_ms);
        let idle_rate = idle_rate_from_millis(duration_ms, DEFAULT_IDLE_UNIT_MS);
        // The pipeline clamps and reports the out-of-range case itself.
        let stored = idle_rate.min(*IDLE_RATE_RANGE.end()) as u8;
        IDLE_RATE.store(stored, Ordering::Relaxed);
        notify(|n| n.notify_idle_rate(idle_rate));
    }

    fn get_idle_ms(&mut self, _id: Option<ReportId>) -> Option<u32> {
        let idle_rate = IDLE_RATE.load(Ordering::Relaxed);
        Some(idle_rate_to_millis(idle_rate, DEFAULT_IDLE_UNIT_MS))
    }
}

/// Configure the boot mouse HID interface in the USB builder.
///
/// Returns the HID writer for the report writer task.
pub fn configure_usb_hid<'d>(
    builder: &mut Builder<'d, UsbDriver<'d>>,
    state: &'d mut State<'d>,
    request_handler: &'d mut IdleRequestHandler,
) -> HidWriter<'d, UsbDriver<'d>, 8> {
    let config = HidConfig {
        report_descriptor: REPORT_DESCRIPTOR,
        request_handler: Some(request_handler),
        poll_ms: 1,
        max_packet_size: 8,
        hid_subclass: HidSubclass::Boot,
        hid_boot_protocol: HidBootProtocol::Mouse,
    };

    HidWriter::new(builder, state, config)
}

/// Write each submitted report to the interrupt endpoint and latch its completion.
///
/// A failed write is not acknowledged: the endpoint only fails when the device
/// is deconfigured or reset, and that event already clears the in-flight flag.
pub async fn run_report_writer(
    mut writer: HidWriter<'static, UsbDriver<'static>, 8>,
    outbox: &'static ReportOutbox,
) -> ! {
    loop {
        let report = outbox.wait().await;
        let bytes = MouseReport::from(&report).as_bytes();
        match writer.write(&bytes).await {
            Ok(()) => notify(|n| n.notify_transmit_complete()),
            Err(e) => warn!("HID write failed: {:?}", e),
        }
    }
}
