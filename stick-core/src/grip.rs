//! SPI reader for the grip switch frame.

use crate::input::{GripSource, InputError};
use embedded_hal::spi::SpiDevice;
use stick_proto::{GripFrame, GRIP_FRAME_LEN};

/// Reads the 24-bit switch frame from the stick grip in one 3-byte exchange.
pub struct GripReader<SPI> {
    spi: SPI,
}

impl<SPI: SpiDevice> GripReader<SPI> {
    #[must_use]
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Decompose the reader into its SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiDevice> GripSource for GripReader<SPI> {
    fn read_frame(&mut self) -> Result<GripFrame, InputError> {
        let mut bytes = [0u8; GRIP_FRAME_LEN];
        self.spi.read(&mut bytes).map_err(|_| InputError::Bus)?;
        Ok(GripFrame::from_bytes(bytes))
    }
}
