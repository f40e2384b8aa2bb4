//! Input source traits and error types.

use stick_proto::{EncoderReading, GripFrame};

/// Error type for input operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// SPI transfer failed below the protocol layer.
    Bus,
}

/// Source of absolute angle samples for one axis.
///
/// A sample whose CRC does not match is still returned, with
/// `crc_ok == false`; only transport failures are errors.
pub trait AngleSource {
    /// Perform one bounded read of the sensor.
    fn read_angle(&mut self) -> Result<EncoderReading, InputError>;
}

/// Source of raw grip switch frames.
pub trait GripSource {
    /// Read one frame, still active-low.
    fn read_frame(&mut self) -> Result<GripFrame, InputError>;
}
