//! Look-at orientation solve.

use camera_math::frame::{angle_between, forward, look_at, slerp};
use rapier3d::math::{Isometry, Vector};
use rapier3d::na::UnitQuaternion;
use rapier3d::prelude::Real;
use std::f32::consts::{FRAC_PI_2, PI};

use crate::tuning::CameraTuning;

const HORIZONTAL_EPS: Real = 1.0e-5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LookAtLimits {
    /// Radians the view may deviate from looking straight at the subject.
    pub max_deviation: Real,
    /// Radians below which a clamp correction is dropped.
    pub jitter: Real,
    /// Fraction of the remaining turn applied per second.
    pub rate: Real,
}

impl LookAtLimits {
    pub fn from_tuning(tuning: &CameraTuning) -> Self {
        Self {
            max_deviation: tuning.max_look_deviation_rad(),
            jitter: tuning.jitter_threshold_rad(),
            rate: tuning.orientation_rate,
        }
    }
}

impl Default for LookAtLimits {
    fn default() -> Self {
        Self::from_tuning(&CameraTuning::default())
    }
}

/// World-space focus point. When the subject faces the camera the local focus would sit
/// on the camera's side, so it is mirrored to the far side of the subject.
pub fn focus_point(camera: &Vector<Real>, subject: &Isometry<Real>, focus: &Vector<Real>) -> Vector<Real> {
    let subject_pos = subject.translation.vector;
    let mut point = subject.rotation * focus + subject_pos;

    let to_subject = Vector::new(subject_pos.x - camera.x, 0.0, subject_pos.z - camera.z);
    let Some(v) = to_subject.try_normalize(HORIZONTAL_EPS) else {
        return point;
    };
    let subject_at = forward(&subject.rotation);
    if subject_at.dot(&v) < 0.0 {
        let offset = point - subject_pos;
        point += v * (-2.0 * offset.dot(&v));
    }
    point
}

/// Orientation the camera wants this step: looking at the focus point, but never more
/// than `max_deviation` away from looking at the subject itself.
pub fn desired_orientation(
    camera: &Vector<Real>,
    subject: &Isometry<Real>,
    focus: &Vector<Real>,
    limits: &LookAtLimits,
) -> UnitQuaternion<Real> {
    let point = focus_point(camera, subject, focus);
    let desired = look_at(camera, &point);
    let reference = look_at(camera, &subject.translation.vector);

    let deviation = angle_between(&forward(&reference), &forward(&desired));
    if deviation <= limits.max_deviation {
        return desired;
    }
    let slack = PI - deviation;
    if slack < FRAC_PI_2 {
        if slack > limits.jitter {
            slerp(&reference, &desired, slack / deviation)
        } else {
            reference
        }
    } else {
        slerp(&reference, &desired, limits.max_deviation / deviation)
    }
}

/// Turns `current` toward the desired orientation by `rate * dt` of the remaining angle.
pub fn resolve_look_at(
    current: &UnitQuaternion<Real>,
    camera: &Vector<Real>,
    subject: &Isometry<Real>,
    focus: &Vector<Real>,
    limits: &LookAtLimits,
    dt: Real,
) -> UnitQuaternion<Real> {
    let desired = desired_orientation(camera, subject, focus, limits);
    slerp(current, &desired, limits.rate * dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_math::frame::{euler_quat, Euler};

    fn subject_facing(yaw: Real) -> Isometry<Real> {
        Isometry::from_parts(
            Vector::new(0.0, 0.0, 0.0).into(),
            euler_quat(Euler::new(yaw, 0.0, 0.0)),
        )
    }

    #[test]
    fn camera_behind_subject_looks_at_focus() {
        let subject = subject_facing(0.0);
        let camera = Vector::new(0.0, 2.0, -5.0);
        let focus = Vector::new(0.0, 0.0, 10.0);
        let point = focus_point(&camera, &subject, &focus);
        assert!((point - Vector::new(0.0, 0.0, 10.0)).norm() < 1.0e-5);

        let q = desired_orientation(&camera, &subject, &focus, &LookAtLimits::default());
        let expected = (point - camera).normalize();
        assert!((forward(&q) - expected).norm() < 1.0e-4);
    }

    #[test]
    fn focus_mirrors_when_subject_faces_camera() {
        let subject = subject_facing(0.0);
        let camera = Vector::new(0.0, 2.0, 5.0);
        let point = focus_point(&camera, &subject, &Vector::new(0.0, 0.0, 10.0));
        assert!((point - Vector::new(0.0, 0.0, -10.0)).norm() < 1.0e-4, "{:?}", point);
    }

    #[test]
    fn deviation_is_clamped() {
        let subject = subject_facing(std::f32::consts::FRAC_PI_2);
        let camera = Vector::new(0.0, 0.0, -1.0);
        let limits = LookAtLimits::default();
        let q = desired_orientation(&camera, &subject, &Vector::new(0.0, 0.0, 10.0), &limits);
        let reference = (subject.translation.vector - camera).normalize();
        let angle = angle_between(&forward(&q), &reference);
        assert!(angle <= limits.max_deviation + 1.0e-3, "{}", angle);
        assert!(angle > limits.max_deviation - 1.0e-2, "{}", angle);
    }

    #[test]
    fn rate_limits_turn_per_step() {
        let subject = subject_facing(0.0);
        let camera = Vector::new(0.0, 0.0, -5.0);
        let current = euler_quat(Euler::new(1.0, 0.0, 0.0));
        let limits = LookAtLimits::default();
        let focus = Vector::zeros();
        let next = resolve_look_at(&current, &camera, &subject, &focus, &limits, 1.0 / 144.0);
        let turned = current.angle_to(&next);
        let remaining = current.angle_to(&desired_orientation(&camera, &subject, &focus, &limits));
        assert!((turned - remaining * 25.5 / 144.0).abs() < 1.0e-3);

        let snapped = resolve_look_at(&current, &camera, &subject, &focus, &limits, 1.0);
        assert!(snapped.angle_to(&desired_orientation(&camera, &subject, &focus, &limits)) < 1.0e-4);
    }
}
