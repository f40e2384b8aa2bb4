//! Circular angle arithmetic.

pub use stick_proto::angle_to_degrees;

/// Minimal signed difference `a - b` on the circle, in (-180, 180].
#[must_use]
pub fn wrap_diff(a: f32, b: f32) -> f32 {
    let mut diff = a - b;
    while diff > 180.0 {
        diff -= 360.0;
    }
    while diff <= -180.0 {
        diff += 360.0;
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_diff_same_angle() {
        for a in [0.0, 0.5, 90.0, 180.0, 359.9] {
            assert_eq!(wrap_diff(a, a), 0.0);
        }
    }

    #[test]
    fn test_wrap_diff_across_zero() {
        assert!(libm::fabsf(wrap_diff(1.0, 359.0) - 2.0) < 1e-4);
        assert!(libm::fabsf(wrap_diff(359.0, 1.0) + 2.0) < 1e-4);
    }

    #[test]
    fn test_wrap_diff_half_turn_is_positive() {
        assert_eq!(wrap_diff(180.0, 0.0), 180.0);
        assert_eq!(wrap_diff(0.0, 180.0), 180.0);
        assert_eq!(wrap_diff(270.0, 90.0), 180.0);
    }

    #[test]
    fn test_wrap_diff_range() {
        let mut a = 0.0f32;
        while a < 360.0 {
            let mut b = 0.0f32;
            while b < 360.0 {
                let d = wrap_diff(a, b);
                assert!(d > -180.0 && d <= 180.0, "wrap_diff({}, {}) = {}", a, b, d);
                b += 7.3;
            }
            a += 11.1;
        }
    }
}
