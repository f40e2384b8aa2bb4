//! Platform-agnostic flight stick logic.
//!
//! Everything between the SPI pins and the HID report that does not depend
//! on a particular chip. It runs in `no_std` on the stick and on the host
//! for testing.
//!
//! # Overview
//!
//! - [`encoder`]: burst-read link to one angle sensor ([`EncoderLink`])
//! - [`grip`]: grip switch frame reader ([`GripReader`])
//! - [`input`]: sensor traits ([`AngleSource`], [`GripSource`])
//! - [`angle`]: circular differences ([`wrap_diff`])
//! - [`mapper`]: angle-to-axis conversion ([`SymmetricAxis`], [`AsymmetricAxis`])
//! - [`storage`]: persisted zero point ([`AngleCalibrationStore`])
//! - [`recenter`]: timed combo recenter ([`RecenterSession`])
//! - [`output`]: HID sink trait and change gating ([`OutputSink`], [`OutputCache`])
//! - [`controller`]: one control cycle and the loop around it ([`StickController`])
//! - [`config`]: tuning constants ([`StickConfig`], [`DEFAULT_CONFIG`])
//!
//! # Example
//!
//! ```rust
//! use stick_core::{wrap_diff, DEFAULT_CONFIG};
//!
//! // 2° of sensor travel is well inside the roll deadzone.
//! let delta = wrap_diff(12.0, 10.0);
//! assert_eq!(DEFAULT_CONFIG.roll.map(delta), 0);
//!
//! // Across the zero crossing the short way round wins.
//! assert_eq!(wrap_diff(1.0, 359.0), 2.0);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod fmt;

pub mod angle;
pub mod config;
pub mod controller;
pub mod encoder;
pub mod grip;
pub mod input;
pub mod mapper;
pub mod output;
pub mod recenter;
pub mod storage;

#[cfg(test)]
mod test_util;

pub use angle::{angle_to_degrees, wrap_diff};
pub use config::{RecenterConfig, StickConfig, DEFAULT_CONFIG};
pub use controller::{AxisTrack, Clock, ControllerError, StickController};
pub use encoder::EncoderLink;
pub use grip::GripReader;
pub use input::{AngleSource, GripSource, InputError};
pub use mapper::{map_asymmetric, map_symmetric, AsymmetricAxis, SymmetricAxis, AXIS_MAX};
pub use output::{OutputCache, OutputError, OutputSink, UpdateBatch, MAX_UPDATES};
pub use recenter::{CommitKind, RecenterDecision, RecenterInputs, RecenterSession};
pub use storage::{
    AngleCalibrationStore, BootstrapOutcome, Calibration, CalibrationStorage, StorageError,
};
