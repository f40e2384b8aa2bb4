//! Deadzone-aware rescaling of stick deflection to HID axis values.
//!
//! Deflection inside the deadzone maps to exactly 0. Outside it, the
//! remaining travel is stretched so that the edge of the deadzone starts
//! just above 0 and the end of travel lands exactly on ±[`AXIS_MAX`].

use libm::{fabsf, roundf};

/// Largest axis magnitude reported to the host.
pub const AXIS_MAX: i16 = 32767;

/// Travel below this (degrees) is treated as no travel at all.
const MIN_RANGE_DEG: f32 = 1e-3;

/// Map one side of an axis. `range` is the travel available on the side `delta` lies on.
fn map_side(delta: f32, range: f32, deadzone: f32) -> i16 {
    if !(range > MIN_RANGE_DEG) {
        return 0;
    }

    let delta = delta.clamp(-range, range);
    let deadzone = deadzone.clamp(0.0, range);
    let magnitude = fabsf(delta);
    if magnitude <= deadzone {
        return 0;
    }

    let fraction = (magnitude - deadzone) / (range - deadzone);
    // 0 belongs to the deadzone alone; anything outside it reports at least 1.
    let scaled = (roundf(fraction * AXIS_MAX as f32) as i32).clamp(1, AXIS_MAX as i32) as i16;

    if delta < 0.0 {
        -scaled
    } else {
        scaled
    }
}

/// Map a deflection (degrees from center) on an axis with equal travel both ways.
#[must_use]
pub fn map_symmetric(delta: f32, half_range: f32, deadzone: f32) -> i16 {
    map_side(delta, half_range, deadzone)
}

/// Map a deflection on an axis whose positive and negative travel differ.
///
/// Each side clamps the deadzone against its own range. A side with
/// (near) zero range always reports 0.
#[must_use]
pub fn map_asymmetric(delta: f32, range_pos: f32, range_neg: f32, deadzone: f32) -> i16 {
    if delta >= 0.0 {
        map_side(delta, range_pos, deadzone)
    } else {
        map_side(delta, range_neg, deadzone)
    }
}

/// Roll-style axis: same travel on both sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetricAxis {
    /// Stick degrees per sensor degree.
    pub scale: f32,
    pub half_range_deg: f32,
    pub deadzone_deg: f32,
    pub invert: bool,
}

impl SymmetricAxis {
    /// Map a sensor-side delta (degrees from the stored center).
    #[must_use]
    pub fn map(&self, sensor_delta: f32) -> i16 {
        let delta = stick_delta(sensor_delta, self.scale, self.invert);
        map_symmetric(delta, self.half_range_deg, self.deadzone_deg)
    }
}

/// Pitch-style axis: forward and aft travel configured separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsymmetricAxis {
    /// Stick degrees per sensor degree.
    pub scale: f32,
    pub range_pos_deg: f32,
    pub range_neg_deg: f32,
    pub deadzone_deg: f32,
    pub invert: bool,
}

impl AsymmetricAxis {
    /// Map a sensor-side delta (degrees from the stored center).
    #[must_use]
    pub fn map(&self, sensor_delta: f32) -> i16 {
        let delta = stick_delta(sensor_delta, self.scale, self.invert);
        map_asymmetric(delta, self.range_pos_deg, self.range_neg_deg, self.deadzone_deg)
    }
}

#[inline]
fn stick_delta(sensor_delta: f32, scale: f32, invert: bool) -> f32 {
    let delta = sensor_delta * scale;
    if invert {
        -delta
    } else {
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::wrap_diff;
    use crate::config::DEFAULT_CONFIG;

    #[test]
    fn test_center_is_zero() {
        assert_eq!(map_symmetric(0.0, 15.5, 0.3), 0);
        assert_eq!(map_asymmetric(0.0, 14.0, 18.5, 0.3), 0);
    }

    #[test]
    fn test_full_travel_reaches_extremes() {
        assert_eq!(map_symmetric(15.5, 15.5, 0.3), 32767);
        assert_eq!(map_symmetric(-15.5, 15.5, 0.3), -32767);
        assert_eq!(map_asymmetric(14.0, 14.0, 18.5, 0.3), 32767);
        assert_eq!(map_asymmetric(-18.5, 14.0, 18.5, 0.3), -32767);
    }

    #[test]
    fn test_beyond_travel_is_clamped() {
        assert_eq!(map_symmetric(40.0, 15.5, 0.3), 32767);
        assert_eq!(map_symmetric(-179.0, 15.5, 0.3), -32767);
        assert_eq!(map_asymmetric(-25.0, 14.0, 18.5, 0.3), -32767);
    }

    #[test]
    fn test_deadzone_band_is_exactly_zero() {
        for d in [0.3, 0.299, 0.1, -0.1, -0.3] {
            assert_eq!(map_symmetric(d, 15.5, 0.3), 0, "delta {}", d);
        }
    }

    #[test]
    fn test_just_outside_deadzone_is_small_and_signed() {
        let pos = map_symmetric(0.3001, 15.5, 0.3);
        let neg = map_symmetric(-0.3001, 15.5, 0.3);
        assert!(pos > 0 && pos < 10, "got {}", pos);
        assert!(neg < 0 && neg > -10, "got {}", neg);
    }

    #[test]
    fn test_midpoint_rescale() {
        // Halfway between deadzone edge and full travel.
        let half = 0.3 + (15.5 - 0.3) / 2.0;
        let out = map_symmetric(half, 15.5, 0.3);
        assert!((16383..=16384).contains(&out), "got {}", out);
    }

    #[test]
    fn test_deadzone_larger_than_range_is_clamped() {
        assert_eq!(map_symmetric(5.0, 5.0, 9.0), 0);
        assert_eq!(map_symmetric(-4.0, 5.0, -1.0), -26214);
    }

    #[test]
    fn test_asymmetric_matches_symmetric_for_equal_ranges() {
        let mut d = -20.0f32;
        while d <= 20.0 {
            assert_eq!(map_asymmetric(d, 15.5, 15.5, 0.3), map_symmetric(d, 15.5, 0.3));
            d += 0.37;
        }
    }

    #[test]
    fn test_asymmetric_sides_are_independent() {
        // Same deflection, different travel on each side.
        assert_eq!(map_asymmetric(7.0, 14.0, 28.0, 0.0), 16384);
        assert_eq!(map_asymmetric(-7.0, 14.0, 28.0, 0.0), -8192);
    }

    #[test]
    fn test_zero_range_side_degenerates_to_zero() {
        assert_eq!(map_asymmetric(-5.0, 10.0, 0.0, 0.3), 0);
        assert_eq!(map_asymmetric(5.0, 0.0, 10.0, 0.3), 0);
        assert_eq!(map_asymmetric(5.0, 0.0005, 10.0, 0.0), 0);
        assert_eq!(map_symmetric(3.0, 0.0, 0.0), 0);
        assert!(map_asymmetric(5.0, 10.0, 0.0, 0.3) > 0);
    }

    #[test]
    fn test_small_offset_inside_geared_deadzone() {
        // Center 10°, sensor at 12°: 2° * 0.1409 = 0.28° of stick, under 0.3°.
        let delta = wrap_diff(12.0, 10.0);
        assert_eq!(DEFAULT_CONFIG.roll.map(delta), 0);
    }

    #[test]
    fn test_invert_flips_sign() {
        let axis = SymmetricAxis {
            scale: 1.0,
            half_range_deg: 10.0,
            deadzone_deg: 0.0,
            invert: true,
        };
        assert_eq!(axis.map(10.0), -32767);
        assert_eq!(axis.map(-5.0), 16384);
    }
}
