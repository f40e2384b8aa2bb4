//! Stick configuration.
//!
//! Customize at compile time by declaring your own `const StickConfig`
//! (usually starting from [`DEFAULT_CONFIG`] with struct update syntax).

use crate::mapper::{AsymmetricAxis, SymmetricAxis};
use stick_proto::Buttons;

/// Timing and tolerance of the recenter procedure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecenterConfig {
    /// Buttons that must all be held to start a recenter.
    pub combo: Buttons,
    /// Hold time before a position-checked recenter is attempted.
    pub safe_hold_ms: u32,
    /// Hold time after which the recenter is committed unconditionally.
    pub force_hold_ms: u32,
    /// Largest distance from the current center, in sensor degrees,
    /// accepted by the position-checked recenter.
    pub max_error_deg: f32,
}

/// Complete controller configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickConfig {
    pub roll: SymmetricAxis,
    pub pitch: AsymmetricAxis,
    pub recenter: RecenterConfig,
    /// Poll cycles sampled per axis when no valid calibration is stored.
    pub bootstrap_samples: u8,
    /// Pause between bootstrap samples.
    pub bootstrap_sample_delay_us: u32,
    /// Fixed pause at the end of every control cycle.
    pub cycle_delay_ms: u32,
    /// Emit a diagnostic line at most this often. `None` disables it.
    pub diagnostics_interval_ms: Option<u32>,
}

/// Default configuration for the F/A-18 grip on the production gimbal.
///
/// - Roll: ±15.5° stick travel, 0.3° deadzone
/// - Pitch: 14° forward, 18.5° aft, 0.3° deadzone
/// - Both sensors geared at 0.1409 stick degrees per sensor degree
/// - Recenter: A/P disconnect + undesignate, 2 s checked, 6 s forced
pub const DEFAULT_CONFIG: StickConfig = StickConfig {
    roll: SymmetricAxis {
        scale: 0.1409,
        half_range_deg: 15.5,
        deadzone_deg: 0.3,
        invert: false,
    },
    pitch: AsymmetricAxis {
        scale: 0.1409,
        range_pos_deg: 14.0,
        range_neg_deg: 18.5,
        deadzone_deg: 0.3,
        invert: false,
    },
    recenter: RecenterConfig {
        combo: Buttons(Buttons::AP_DISCONNECT.0 | Buttons::UNDESIGNATE.0),
        safe_hold_ms: 2000,
        force_hold_ms: 6000,
        max_error_deg: 1.2,
    },
    bootstrap_samples: 8,
    bootstrap_sample_delay_us: 500,
    cycle_delay_ms: 2,
    diagnostics_interval_ms: None,
};

impl Default for StickConfig {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}
