use rapier3d::prelude::Real;
use std::f32::consts::{PI, TAU};

/// Wraps an angle into `(-pi, pi]`. Non-finite input collapses to zero.
pub fn wrap_angle(angle: Real) -> Real {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Shortest signed rotation taking `from` onto `to`.
pub fn angle_delta(from: Real, to: Real) -> Real {
    wrap_angle(to - from)
}

/// Wraps an angle into `[0, 2pi)`.
pub fn positive_angle(angle: Real) -> Real {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Moves `current` toward `target` by at most `max_step`. A zero step snaps.
pub fn step_toward(current: Real, target: Real, max_step: Real) -> Real {
    let diff = target - current;
    if max_step == 0.0 || diff.abs() <= max_step.abs() {
        target
    } else {
        current + max_step.abs().copysign(diff)
    }
}

/// Facing angle that looks back along azimuth `azimuth` (toward the pole).
pub fn facing_for_azimuth(azimuth: Real) -> Real {
    wrap_angle(azimuth + PI)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_stays_in_half_open_range() {
        let mut angle = -20.0;
        while angle < 20.0 {
            let wrapped = wrap_angle(angle);
            assert!(wrapped > -PI - 1.0e-6 && wrapped <= PI + 1.0e-6, "{}", wrapped);
            assert!(((wrapped - angle) / TAU - ((wrapped - angle) / TAU).round()).abs() < 1.0e-4);
            angle += 0.37;
        }
        assert_eq!(wrap_angle(PI), PI);
        assert_eq!(wrap_angle(-PI), PI);
    }

    #[test]
    fn delta_is_antisymmetric() {
        let samples = [-7.1, -3.0, -0.4, 0.0, 0.2, 1.9, 3.3, 6.0, 12.5];
        for &a in &samples {
            for &b in &samples {
                let forward = angle_delta(a, b);
                let backward = angle_delta(b, a);
                if (forward.abs() - PI).abs() < 1.0e-3 {
                    continue;
                }
                assert!((forward + backward).abs() < 1.0e-4, "{} {}", a, b);
            }
        }
    }

    #[test]
    fn non_finite_wraps_to_zero() {
        assert_eq!(wrap_angle(Real::NAN), 0.0);
        assert_eq!(positive_angle(Real::INFINITY), 0.0);
    }

    #[test]
    fn step_toward_limits_rate() {
        assert_eq!(step_toward(75.0, 60.0, 5.0), 70.0);
        assert_eq!(step_toward(75.0, 90.0, 5.0), 80.0);
        assert_eq!(step_toward(75.0, 77.0, 5.0), 77.0);
        assert_eq!(step_toward(75.0, 10.0, 0.0), 10.0);
    }
}
