//! Timed button-combo recenter procedure.
//!
//! One session spans one continuous hold of the combo:
//!
//! ```text
//! released ──press──> armed, waiting for safe_hold_ms
//!                       │ safe_hold_ms: commit if both axes are near the
//!                       │ current center (or if no calibration exists yet)
//!                       │ refused: keep holding
//!                       v
//!                     force_hold_ms: commit regardless of position
//! ```
//!
//! Every commit also requires a CRC-valid reading on both axes in that
//! same cycle. Releasing the combo at any point ends the session.

use crate::config::RecenterConfig;
use libm::fabsf;

/// Why a commit was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommitKind {
    /// Safe threshold reached with both axes near the current center.
    Safe,
    /// Safe threshold reached while no valid calibration existed.
    Bootstrap,
    /// Force threshold reached.
    Forced,
}

/// Outcome of evaluating one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub enum RecenterDecision {
    /// Combo not held.
    Idle,
    /// Combo held, nothing to do this cycle.
    Holding,
    /// Store the current angles as the new centers.
    Commit(CommitKind),
    /// Safe attempt declined; the hold may still reach the force threshold.
    Refused,
    /// Force threshold reached without valid readings on both axes.
    ForceSkipped,
}

/// What the state machine needs to know about the current cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecenterInputs {
    pub combo_pressed: bool,
    /// Monotonic millisecond counter; may wrap.
    pub now_ms: u32,
    /// Whether the in-memory calibration is valid.
    pub calibration_valid: bool,
    /// Roll distance from the current center, sensor degrees.
    pub roll_error_deg: f32,
    /// Pitch distance from the current center, sensor degrees.
    pub pitch_error_deg: f32,
    /// Both axes produced a CRC-valid reading this cycle.
    pub crc_ok: bool,
}

/// State of one combo hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RecenterSession {
    armed: bool,
    start_ms: u32,
    done_this_hold: bool,
    safe_tried_this_hold: bool,
}

impl RecenterSession {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            armed: false,
            start_ms: 0,
            done_this_hold: false,
            safe_tried_this_hold: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether this hold has already committed (or spent its force attempt).
    #[inline]
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done_this_hold
    }

    /// How long the combo has been held, or `None` when not armed.
    #[must_use]
    pub fn held_ms(&self, now_ms: u32) -> Option<u32> {
        self.armed.then(|| now_ms.wrapping_sub(self.start_ms))
    }

    /// Forget the current hold.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Advance the session by one cycle.
    pub fn evaluate(&mut self, inputs: &RecenterInputs, config: &RecenterConfig) -> RecenterDecision {
        if !inputs.combo_pressed {
            self.reset();
            return RecenterDecision::Idle;
        }

        if !self.armed {
            self.armed = true;
            self.start_ms = inputs.now_ms;
            self.done_this_hold = false;
            self.safe_tried_this_hold = false;
        }

        if self.done_this_hold {
            return RecenterDecision::Holding;
        }

        let elapsed = inputs.now_ms.wrapping_sub(self.start_ms);

        if elapsed >= config.force_hold_ms {
            self.done_this_hold = true;
            return if inputs.crc_ok {
                RecenterDecision::Commit(CommitKind::Forced)
            } else {
                RecenterDecision::ForceSkipped
            };
        }

        if elapsed >= config.safe_hold_ms && !self.safe_tried_this_hold {
            self.safe_tried_this_hold = true;

            if !inputs.crc_ok {
                return RecenterDecision::Refused;
            }

            if !inputs.calibration_valid {
                self.done_this_hold = true;
                return RecenterDecision::Commit(CommitKind::Bootstrap);
            }

            let near_center = fabsf(inputs.roll_error_deg) <= config.max_error_deg
                && fabsf(inputs.pitch_error_deg) <= config.max_error_deg;
            if near_center {
                self.done_this_hold = true;
                return RecenterDecision::Commit(CommitKind::Safe);
            }
            return RecenterDecision::Refused;
        }

        RecenterDecision::Holding
    }
}
