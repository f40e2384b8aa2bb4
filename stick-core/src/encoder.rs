//! SPI link to one absolute angle sensor.

use crate::input::{AngleSource, InputError};
use embedded_hal::spi::SpiDevice;
use stick_proto::{burst_read_frame, EncoderReading, BURST_FRAME_LEN, RESPONSE_LEN};

/// Burst-read link to a single angle sensor.
///
/// The [`SpiDevice`] owns the chip select of this sensor: chip select is
/// asserted for the whole burst and the shared bus is held for exactly
/// one transfer. Configure the bus for SPI mode 3, about 1 MHz.
pub struct EncoderLink<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> EncoderLink<SPI> {
    #[must_use]
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Decompose the link into its SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice> AngleSource for EncoderLink<SPI> {
    fn read_angle(&mut self) -> Result<EncoderReading, InputError> {
        let mut frame = burst_read_frame();
        self.spi
            .transfer_in_place(&mut frame)
            .map_err(|_| InputError::Bus)?;

        let mut response = [0u8; RESPONSE_LEN];
        response.copy_from_slice(&frame[BURST_FRAME_LEN - RESPONSE_LEN..]);
        Ok(EncoderReading::decode(&response))
    }
}
