//! Flight stick firmware for RP2040.
//!
//! Two absolute angle sensors and the grip switch chain share one SPI bus;
//! the stick shows up on the host as a USB HID joystick. The behaviour lives
//! in `stick-core`; this crate supplies the RP2040 ends of its traits.

#![no_std]

// Re-export core types for convenience
pub use stick_core::{
    AngleSource, BootstrapOutcome, Calibration, CalibrationStorage, Clock, ControllerError,
    EncoderLink, GripReader, GripSource, OutputError, OutputSink, StickConfig, StickController,
    StorageError, DEFAULT_CONFIG,
};
pub use stick_proto::{Buttons, Hat, StickFieldUpdate, StickState};

pub mod clock;
pub mod flash_store;
pub mod usb_output;

pub use clock::EmbassyClock;
pub use flash_store::{FlashCalibrationStorage, CALIBRATION_OFFSET, FLASH_SIZE};
pub use usb_output::{configure_usb_hid, StickReport, StickRequestHandler, UsbHidOutput};
