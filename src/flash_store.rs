//! Calibration record in the last sector of on-board flash.

use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use stick_core::{CalibrationStorage, StorageError};
use stick_proto::RECORD_LEN;

/// Size of the on-board QSPI flash (Pico: 2 MiB).
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Offset of the calibration sector, relative to the start of flash.
pub const CALIBRATION_OFFSET: u32 = (FLASH_SIZE - ERASE_SIZE) as u32;

/// [`CalibrationStorage`] backed by one dedicated flash sector.
///
/// A write erases the whole sector before programming the record. Both
/// operations block, stalling XIP for a few milliseconds; they only happen
/// at startup and on recenter commits.
pub struct FlashCalibrationStorage<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
}

impl<'d> FlashCalibrationStorage<'d> {
    pub fn new(flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>) -> Self {
        Self { flash }
    }
}

impl CalibrationStorage for FlashCalibrationStorage<'_> {
    fn read(&mut self, buf: &mut [u8; RECORD_LEN]) -> Result<(), StorageError> {
        self.flash
            .blocking_read(CALIBRATION_OFFSET, buf)
            .map_err(|_| StorageError::Io)
    }

    fn write(&mut self, buf: &[u8; RECORD_LEN]) -> Result<(), StorageError> {
        self.flash
            .blocking_erase(CALIBRATION_OFFSET, CALIBRATION_OFFSET + ERASE_SIZE as u32)
            .map_err(|_| StorageError::Io)?;
        self.flash
            .blocking_write(CALIBRATION_OFFSET, buf)
            .map_err(|_| StorageError::Io)
    }
}
