//! Persisted zero-point calibration.
//!
//! The stored record is trusted only when its magic matches and both
//! centers fit in 21 bits. Anything else (erased flash, a torn write,
//! a failed read) sends the controller through [`AngleCalibrationStore::bootstrap`].

use crate::input::AngleSource;
use embedded_hal_async::delay::DelayNs;
use stick_proto::{CalibrationRecord, RECORD_LEN};

/// Error type for non-volatile storage access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Read, erase or program failed.
    Io,
}

/// Non-volatile home of the calibration record.
///
/// Both operations are synchronous and only ever called from the control loop.
pub trait CalibrationStorage {
    /// Read the raw record bytes.
    fn read(&mut self, buf: &mut [u8; RECORD_LEN]) -> Result<(), StorageError>;

    /// Replace the stored record.
    fn write(&mut self, buf: &[u8; RECORD_LEN]) -> Result<(), StorageError>;
}

/// In-memory calibration: reference angle of each axis, in sensor counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    pub roll_center: u32,
    pub pitch_center: u32,
    pub valid: bool,
}

/// How the startup calibration was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootstrapOutcome {
    /// A valid record was found in storage.
    Loaded,
    /// No valid record; both centers were sampled from the sensors.
    Sampled,
    /// No valid record and at least one axis produced no CRC-valid sample.
    /// That axis keeps center 0, yet the calibration is still marked valid.
    NoValidSamples { roll: bool, pitch: bool },
}

/// Loads, validates and saves the calibration record.
pub struct AngleCalibrationStore<S> {
    storage: S,
}

impl<S: CalibrationStorage> AngleCalibrationStore<S> {
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Read and validate the stored record.
    ///
    /// Never fails: an unreadable or corrupt record comes back with `valid == false`.
    pub fn load(&mut self) -> Calibration {
        let mut buf = [0u8; RECORD_LEN];
        if let Err(e) = self.storage.read(&mut buf) {
            warn!("Calibration read failed: {:?}", e);
            return Calibration::default();
        }

        match CalibrationRecord::from_bytes(&buf) {
            Ok(record) => Calibration {
                roll_center: record.roll_center,
                pitch_center: record.pitch_center,
                valid: true,
            },
            Err(e) => {
                warn!("Stored calibration rejected: {:?}", e);
                Calibration::default()
            }
        }
    }

    /// Overwrite the stored record with both centers.
    pub fn save(&mut self, roll_center: u32, pitch_center: u32) -> Result<(), StorageError> {
        let record = CalibrationRecord::new(roll_center, pitch_center);
        self.storage.write(&record.to_bytes())
    }

    /// Load the calibration, sampling fresh centers when none is valid.
    ///
    /// Sampling polls both sensors `samples` times and keeps the last
    /// CRC-valid reading of each. The result is persisted and marked valid
    /// even if an axis never produced a valid reading; that case is
    /// reported as [`BootstrapOutcome::NoValidSamples`].
    pub async fn bootstrap<R, P, D>(
        &mut self,
        roll: &mut R,
        pitch: &mut P,
        samples: u8,
        sample_delay_us: u32,
        delay: &mut D,
    ) -> (Calibration, BootstrapOutcome)
    where
        R: AngleSource,
        P: AngleSource,
        D: DelayNs,
    {
        let loaded = self.load();
        if loaded.valid {
            info!(
                "Calibration loaded: roll={} pitch={}",
                loaded.roll_center, loaded.pitch_center
            );
            return (loaded, BootstrapOutcome::Loaded);
        }

        let mut roll_center = None;
        let mut pitch_center = None;
        for _ in 0..samples {
            if let Ok(reading) = roll.read_angle() {
                if reading.crc_ok {
                    roll_center = Some(reading.angle);
                }
            }
            if let Ok(reading) = pitch.read_angle() {
                if reading.crc_ok {
                    pitch_center = Some(reading.angle);
                }
            }
            delay.delay_us(sample_delay_us).await;
        }

        let calibration = Calibration {
            roll_center: roll_center.unwrap_or(0),
            pitch_center: pitch_center.unwrap_or(0),
            valid: true,
        };

        if let Err(e) = self.save(calibration.roll_center, calibration.pitch_center) {
            error!("Saving bootstrap calibration failed: {:?}", e);
        }

        let outcome = if roll_center.is_some() && pitch_center.is_some() {
            info!(
                "Calibration bootstrapped: roll={} pitch={}",
                calibration.roll_center, calibration.pitch_center
            );
            BootstrapOutcome::Sampled
        } else {
            warn!(
                "Bootstrap without valid samples (roll={}, pitch={}), center 0 assumed",
                roll_center.is_some(),
                pitch_center.is_some()
            );
            BootstrapOutcome::NoValidSamples {
                roll: roll_center.is_some(),
                pitch: pitch_center.is_some(),
            }
        };

        (calibration, outcome)
    }

    /// Get a reference to the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Get a mutable reference to the underlying storage.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}
