#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::{info, unwrap};
use defmt_rtt as _;
use embassy_embedded_hal::shared_bus::blocking::spi::SpiDevice;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::flash::{Blocking, Flash};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{SPI0, USB};
use embassy_rp::spi::{self, Spi};
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Delay;
use embassy_usb::class::hid::State;
use embassy_usb::{Builder, Config as UsbConfig};
use hornet_stick::{
    configure_usb_hid, EmbassyClock, EncoderLink, FlashCalibrationStorage, GripReader,
    StickController, StickRequestHandler, UsbHidOutput, DEFAULT_CONFIG, FLASH_SIZE,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

/// SPI clock. Mode 3 (idle high, sample on the second edge).
const SPI_FREQUENCY_HZ: u32 = 1_000_000;

type SpiBus = Spi<'static, SPI0, spi::Blocking>;
type BusDevice = SpiDevice<'static, CriticalSectionRawMutex, SpiBus, Output<'static>>;
type Controller = StickController<
    EncoderLink<BusDevice>,
    GripReader<BusDevice>,
    FlashCalibrationStorage<'static>,
    UsbHidOutput<'static>,
    EmbassyClock,
>;

/// SPI0, shared by both angle sensors and the grip. Each device owns its
/// chip select and holds the bus for exactly one transaction.
static SPI_BUS: StaticCell<Mutex<CriticalSectionRawMutex, RefCell<SpiBus>>> = StaticCell::new();

/// USB device configuration buffer.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// HID state.
static HID_STATE: StaticCell<State> = StaticCell::new();
static HID_HANDLER: StaticCell<StickRequestHandler> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Hornet stick starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- SPI Setup ---
    let mut spi_config = spi::Config::default();
    spi_config.frequency = SPI_FREQUENCY_HZ;
    spi_config.polarity = spi::Polarity::IdleHigh;
    spi_config.phase = spi::Phase::CaptureOnSecondTransition;

    let spi = Spi::new_blocking(
        p.SPI0,
        p.PIN_18, // CLK
        p.PIN_19, // MOSI
        p.PIN_16, // MISO
        spi_config,
    );
    let bus = SPI_BUS.init(Mutex::new(RefCell::new(spi)));

    let roll = EncoderLink::new(SpiDevice::new(bus, Output::new(p.PIN_17, Level::High)));
    let pitch = EncoderLink::new(SpiDevice::new(bus, Output::new(p.PIN_20, Level::High)));
    let grip = GripReader::new(SpiDevice::new(bus, Output::new(p.PIN_21, Level::High)));

    // --- Flash Setup ---
    let flash = Flash::<_, Blocking, FLASH_SIZE>::new_blocking(p.FLASH);
    let storage = FlashCalibrationStorage::new(flash);

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs);

    let mut usb_config = UsbConfig::new(0x1209, 0x0001); // pid.codes test VID/PID
    usb_config.manufacturer = Some("Hornet Stick");
    usb_config.product = Some("Flight Stick");
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

    let hid_state = HID_STATE.init(State::new());
    let hid_handler = HID_HANDLER.init(StickRequestHandler);
    let hid_writer = configure_usb_hid(&mut builder, hid_state, hid_handler);

    let usb_device = builder.build();
    let usb_output = UsbHidOutput::new(hid_writer);

    let controller = StickController::new(
        roll,
        pitch,
        grip,
        storage,
        usb_output,
        EmbassyClock,
        DEFAULT_CONFIG,
    );

    spawner.spawn(unwrap!(usb_task(usb_device)));
    spawner.spawn(unwrap!(control_task(controller)));

    info!("Hornet stick initialized");
}

/// USB device task - runs the USB stack.
#[embassy_executor::task]
async fn usb_task(mut device: embassy_usb::UsbDevice<'static, Driver<'static, USB>>) {
    device.run().await;
}

/// Control task - calibration bootstrap, then the control loop forever.
#[embassy_executor::task]
async fn control_task(mut controller: Controller) {
    let mut delay = Delay;

    let outcome = controller.bootstrap(&mut delay).await;
    info!("Calibration ready: {:?}", outcome);

    controller.output_mut().wait_ready().await;
    info!("USB HID ready, reporting stick state...");

    controller.run(&mut delay).await
}
