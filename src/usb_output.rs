//! USB HID joystick output implementation.

use defmt::Format;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_usb::class::hid::{HidWriter, ReportId, RequestHandler, State};
use embassy_usb::control::OutResponse;
use embassy_usb::Builder;
use stick_core::{OutputError, OutputSink};
use stick_proto::{StickFieldUpdate, StickState};

/// HID value reported for a centered hat.
pub const HAT_NULL: u8 = 0x0F;

/// USB HID joystick report.
///
/// Matches [`REPORT_DESCRIPTOR`]. Total size: 8 bytes
/// (axes: 2x2, buttons: 19 bits + 5 pad, hat: 4 bits + 4 pad).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Format)]
pub struct StickReport {
    /// Roll (X), -32767 to 32767
    pub roll: i16,
    /// Pitch (Y), -32767 to 32767
    pub pitch: i16,
    /// Button bitfield, bit n = button n+1
    pub buttons: u32,
    /// Hat position 0..=7, or [`HAT_NULL`]
    pub hat: u8,
}

impl StickReport {
    /// Size of the report in bytes.
    pub const SIZE: usize = 8;

    /// Convert the report to bytes.
    #[must_use]
    pub fn as_bytes(&self) -> [u8; Self::SIZE] {
        let roll = self.roll.to_le_bytes();
        let pitch = self.pitch.to_le_bytes();
        let buttons = self.buttons.to_le_bytes();
        [
            roll[0],
            roll[1],
            pitch[0],
            pitch[1],
            buttons[0],
            buttons[1],
            buttons[2] & 0x07,
            self.hat & 0x0F,
        ]
    }
}

impl From<&StickState> for StickReport {
    fn from(state: &StickState) -> Self {
        Self {
            roll: state.roll,
            pitch: state.pitch,
            buttons: state.buttons.raw(),
            hat: state.hat.position().unwrap_or(HAT_NULL),
        }
    }
}

/// HID joystick report descriptor: X/Y, 19 buttons, one hat switch.
pub const REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x04, // Usage (Joystick)
    0xA1, 0x01, // Collection (Application)
    //
    // --- Roll / Pitch ---
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x16, 0x01, 0x80, //   Logical Minimum (-32767)
    0x26, 0xFF, 0x7F, //   Logical Maximum (32767)
    0x75, 0x10, //   Report Size (16)
    0x95, 0x02, //   Report Count (2)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    // --- Buttons (19 buttons) ---
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (Button 1)
    0x29, 0x13, //   Usage Maximum (Button 19)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x13, //   Report Count (19)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    0x75, 0x05, //   Report Size (5)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x03, //   Input (Constant) - padding
    //
    // --- Hat switch ---
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x09, 0x39, //   Usage (Hat switch)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x07, //   Logical Maximum (7)
    0x35, 0x00, //   Physical Minimum (0)
    0x46, 0x3B, 0x01, //   Physical Maximum (315)
    0x65, 0x14, //   Unit (Degrees)
    0x75, 0x04, //   Report Size (4)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x42, //   Input (Data, Variable, Absolute, Null State)
    0x65, 0x00, //   Unit (None)
    0x75, 0x04, //   Report Size (4)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x03, //   Input (Constant) - padding
    //
    0xC0, // End Collection
];

/// USB HID joystick output.
///
/// Keeps the full state on the device side so it can apply field updates
/// and always write a complete report.
pub struct UsbHidOutput<'d> {
    writer: HidWriter<'d, Driver<'d, USB>, { StickReport::SIZE }>,
    state: StickState,
    ready: bool,
}

impl<'d> UsbHidOutput<'d> {
    /// Create a new USB HID output from the given HID writer.
    pub fn new(writer: HidWriter<'d, Driver<'d, USB>, { StickReport::SIZE }>) -> Self {
        Self {
            writer,
            state: StickState::neutral(),
            ready: false,
        }
    }

    /// Wait until the device is ready (USB enumerated).
    pub async fn wait_ready(&mut self) {
        self.writer.ready().await;
        self.ready = true;
    }
}

impl<'d> OutputSink for UsbHidOutput<'d> {
    async fn send(&mut self, updates: &[StickFieldUpdate]) -> Result<(), OutputError> {
        if !self.ready {
            return Err(OutputError::NotReady);
        }

        let mut next = self.state;
        for &update in updates {
            next.apply_update(update);
        }

        let report = StickReport::from(&next);
        self.writer
            .write(&report.as_bytes())
            .await
            .map_err(|_| OutputError::Io)?;
        self.state = next;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

/// HID request handler (handles SET_REPORT, etc.).
///
/// No output reports are defined, so this accepts and ignores everything.
pub struct StickRequestHandler;

impl RequestHandler for StickRequestHandler {
    fn get_report(&mut self, _id: ReportId, _buf: &mut [u8]) -> Option<usize> {
        None
    }

    fn set_report(&mut self, _id: ReportId, _data: &[u8]) -> OutResponse {
        OutResponse::Accepted
    }

    fn set_idle_ms(&mut self, _id: Option<ReportId>, _duration_ms: u32) {}

    fn get_idle_ms(&mut self, _id: Option<ReportId>) -> Option<u32> {
        None
    }
}

/// Configure the USB HID class in the USB builder.
///
/// Returns the HID writer for use by [`UsbHidOutput`].
pub fn configure_usb_hid<'d>(
    builder: &mut Builder<'d, Driver<'d, USB>>,
    state: &'d mut State<'d>,
    request_handler: &'d mut StickRequestHandler,
) -> HidWriter<'d, Driver<'d, USB>, { StickReport::SIZE }> {
    let config = embassy_usb::class::hid::Config {
        report_descriptor: REPORT_DESCRIPTOR,
        request_handler: Some(request_handler),
        poll_ms: 1,
        max_packet_size: StickReport::SIZE as u16,
        hid_subclass: embassy_usb::class::hid::HidSubclass::No,
        hid_boot_protocol: embassy_usb::class::hid::HidBootProtocol::None,
    };

    HidWriter::new(builder, state, config)
}
