#![no_std]
#![no_main]

use defmt::{info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_time::{Duration, Ticker};
use embassy_usb::class::hid::{HidWriter, State};
use embassy_usb::{Builder, Config as UsbConfig};
use pointer_rp2040::{
    configure_usb_hid, run_report_writer, take_notifications, ButtonInput, IdleRequestHandler,
    LinkStatusHandler, Pipeline, PipelineConfig, ReportOutbox, TickInputs, UsbLink,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

/// Outstanding report, passed from the tick task to the writer task.
/// The pipeline keeps at most one report in flight, so a value is never overwritten.
static OUTBOX: ReportOutbox = ReportOutbox::new();

/// USB device configuration buffer.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// HID state and handlers.
static HID_STATE: StaticCell<State> = StaticCell::new();
static IDLE_HANDLER: StaticCell<IdleRequestHandler> = StaticCell::new();
static STATUS_HANDLER: StaticCell<LinkStatusHandler> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("HID pointer starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let config = PipelineConfig::new();

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs);

    let mut usb_config = UsbConfig::new(0x1209, 0x0001); // pid.codes test VID/PID
    usb_config.manufacturer = Some("Rust Pointer");
    usb_config.product = Some("HID Pointer");
    usb_config.serial_number = Some("001");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let config_descriptor = CONFIG_DESCRIPTOR.init([0; 256]);
    let bos_descriptor = BOS_DESCRIPTOR.init([0; 256]);
    let msos_descriptor = MSOS_DESCRIPTOR.init([0; 256]);
    let control_buf = CONTROL_BUF.init([0; 64]);

    let mut builder = Builder::new(
        usb_driver,
        usb_config,
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
    );
    builder.handler(STATUS_HANDLER.init(LinkStatusHandler));

    // Configure HID class
    let hid_state = HID_STATE.init(State::new());
    let hid_writer = configure_usb_hid(
        &mut builder,
        hid_state,
        IDLE_HANDLER.init(IdleRequestHandler),
    );

    // Build the USB device
    let usb_device = builder.build();

    // --- Inputs ---
    let button = ButtonInput::active_low(Input::new(p.PIN_15, Pull::Up));

    // Status LED (on-board LED on Pico), lit while the session is active
    let led = Output::new(p.PIN_25, Level::Low);

    let pipeline = Pipeline::new(config, UsbLink::new(&OUTBOX));

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(usb_task(usb_device).unwrap());
    spawner.spawn(writer_task(hid_writer).unwrap());
    spawner.spawn(tick_task(pipeline, button, led).unwrap());

    info!("HID pointer initialized, waiting for host...");
}

/// USB device task - runs the USB stack.
#[embassy_executor::task]
async fn usb_task(mut device: embassy_usb::UsbDevice<'static, Driver<'static, USB>>) {
    device.run().await;
}

/// Writer task - sends each submitted report to the host.
#[embassy_executor::task]
async fn writer_task(writer: HidWriter<'static, Driver<'static, USB>, 8>) {
    run_report_writer(writer, &OUTBOX).await
}

/// Tick task - one pipeline tick per scheduler period.
#[embassy_executor::task]
async fn tick_task(
    mut pipeline: Pipeline<UsbLink>,
    mut button: ButtonInput<Input<'static>>,
    mut led: Output<'static>,
) {
    let period = Duration::from_millis(u64::from(pipeline.config().ms_per_tick()));
    let mut ticker = Ticker::every(period);
    let mut was_active = false;

    loop {
        let inputs = TickInputs::button(button.sample());
        let outcome = pipeline.tick(inputs, take_notifications());

        if outcome.mode_toggled {
            info!("mode: {:?}", pipeline.mode());
        }

        let active = pipeline.is_active();
        if active != was_active {
            if active {
                info!("session active");
                led.set_high();
            } else {
                warn!("session left active: {:?}", pipeline.session());
                led.set_low();
            }
            was_active = active;
        }

        ticker.next().await;
    }
}
