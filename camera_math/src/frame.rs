//! Orientation frames. Columns are `(right, up, at)`; `at` is the view direction and
//! positive pitch tilts `at` downward.

use rapier3d::math::{Isometry, Translation, Vector};
use rapier3d::na::{Matrix3, Rotation3, UnitQuaternion};
use rapier3d::prelude::Real;

const DEGENERATE_DIST2: Real = 1.0e-5;
const FACING_MIN_DIST2: Real = 1.0e-3;
const SLERP_EPS: Real = 1.0e-6;

pub fn world_up() -> Vector<Real> {
    Vector::y()
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Euler {
    pub yaw: Real,
    pub pitch: Real,
    pub roll: Real,
}

impl Euler {
    pub fn new(yaw: Real, pitch: Real, roll: Real) -> Self {
        Self { yaw, pitch, roll }
    }
}

pub fn euler_rotation(yaw: Real, pitch: Real, roll: Real) -> Rotation3<Real> {
    Rotation3::from_axis_angle(&Vector::y_axis(), yaw)
        * Rotation3::from_axis_angle(&Vector::x_axis(), pitch)
        * Rotation3::from_axis_angle(&Vector::z_axis(), roll)
}

pub fn euler_quat(euler: Euler) -> UnitQuaternion<Real> {
    UnitQuaternion::from_rotation_matrix(&euler_rotation(euler.yaw, euler.pitch, euler.roll))
}

pub fn rotation_euler(rotation: &UnitQuaternion<Real>) -> Euler {
    let right = rotation * Vector::x();
    let up = rotation * Vector::y();
    let at = rotation * Vector::z();
    let pitch = -at.y.clamp(-1.0, 1.0).asin();
    let yaw = if at.x.abs() > Real::EPSILON || at.z.abs() > Real::EPSILON {
        at.x.atan2(at.z)
    } else {
        // Looking straight up or down: recover yaw from the up vector instead.
        let sign = if at.y < 0.0 { 1.0 } else { -1.0 };
        (sign * up.x).atan2(sign * up.z)
    };
    let roll = right.y.atan2(up.y);
    Euler { yaw, pitch, roll }
}

pub fn forward(rotation: &UnitQuaternion<Real>) -> Vector<Real> {
    rotation * Vector::z()
}

/// Heading of a rotation's forward axis about world up.
pub fn heading(rotation: &UnitQuaternion<Real>) -> Real {
    let at = forward(rotation);
    if at.x == 0.0 && at.z == 0.0 {
        return 0.0;
    }
    at.x.atan2(at.z)
}

/// Orientation at `eye` whose `at` axis points to `target`. Falls back to identity when
/// the points coincide and to world `x` as `right` when looking straight up or down.
pub fn look_at(eye: &Vector<Real>, target: &Vector<Real>) -> UnitQuaternion<Real> {
    let Some(at) = (target - eye).try_normalize(Real::EPSILON) else {
        return UnitQuaternion::identity();
    };
    let right = world_up()
        .cross(&at)
        .try_normalize(Real::EPSILON)
        .unwrap_or_else(Vector::x);
    let up = at.cross(&right);
    UnitQuaternion::from_rotation_matrix(&Rotation3::from_basis_unchecked(&[right, up, at]))
}

/// Rotation from possibly non-orthonormal basis rows (authoring data).
pub fn rotation_from_rows(right: Vector<Real>, up: Vector<Real>, at: Vector<Real>) -> UnitQuaternion<Real> {
    let matrix = Matrix3::from_columns(&[right, up, at]);
    UnitQuaternion::from_matrix(&matrix)
}

/// Angle between two unit directions.
pub fn angle_between(a: &Vector<Real>, b: &Vector<Real>) -> Real {
    a.dot(b).clamp(-1.0, 1.0).acos()
}

/// Slerp that tolerates antipodal inputs by snapping to the nearer end.
pub fn slerp(from: &UnitQuaternion<Real>, to: &UnitQuaternion<Real>, t: Real) -> UnitQuaternion<Real> {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 1.0 };
    match from.try_slerp(to, t, SLERP_EPS) {
        Some(result) => result,
        None if t < 0.5 => *from,
        None => *to,
    }
}

pub fn isometry(position: Vector<Real>, rotation: UnitQuaternion<Real>) -> Isometry<Real> {
    Isometry::from_parts(Translation::from(position), rotation)
}

/// Horizontal motion basis around the tracked subject: `at` points from the subject to
/// the camera in the ground plane, `up` is world up and `right = up x at`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HorizontalBasis {
    pub at: Vector<Real>,
    pub up: Vector<Real>,
    pub right: Vector<Real>,
}

impl Default for HorizontalBasis {
    fn default() -> Self {
        Self::from_at(Vector::z())
    }
}

impl HorizontalBasis {
    fn from_at(at: Vector<Real>) -> Self {
        Self {
            at,
            up: world_up(),
            right: Vector::new(at.z, 0.0, -at.x),
        }
    }

    /// `offset` is camera minus subject. When it has no horizontal extent the camera's
    /// own facing is used, and failing that the azimuth `(sin a, 0, cos a)`.
    pub fn build(offset: &Vector<Real>, facing: &Vector<Real>, azimuth: Real) -> Self {
        let dist2 = offset.x * offset.x + offset.z * offset.z;
        if dist2.is_finite() && dist2 > DEGENERATE_DIST2 {
            let inv = dist2.sqrt().recip();
            return Self::from_at(Vector::new(offset.x * inv, 0.0, offset.z * inv));
        }
        let facing2 = facing.x * facing.x + facing.z * facing.z;
        if facing2.is_finite() && facing2 > FACING_MIN_DIST2 {
            let inv = facing2.sqrt().recip();
            return Self::from_at(Vector::new(facing.x * inv, 0.0, facing.z * inv));
        }
        Self::from_at(Vector::new(azimuth.sin(), 0.0, azimuth.cos()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn near(a: Real, b: Real) -> bool {
        (a - b).abs() < 1.0e-4
    }

    #[test]
    fn positive_pitch_looks_down() {
        let q = euler_quat(Euler::new(0.0, 0.3, 0.0));
        let at = forward(&q);
        assert!(at.y < 0.0);
        assert!(near(at.y, -(0.3f32).sin()));
    }

    #[test]
    fn euler_round_trips_through_rotation() {
        let euler = Euler::new(1.2, -0.4, 0.25);
        let back = rotation_euler(&euler_quat(euler));
        assert!(near(back.yaw, euler.yaw));
        assert!(near(back.pitch, euler.pitch));
        assert!(near(back.roll, euler.roll));
    }

    #[test]
    fn look_at_points_at_target() {
        let eye = Vector::new(1.0, 2.0, 3.0);
        let target = Vector::new(4.0, 0.0, -1.0);
        let q = look_at(&eye, &target);
        let expected = (target - eye).normalize();
        assert!((forward(&q) - expected).norm() < 1.0e-4);
        let right = q * Vector::x();
        assert!(near(right.y, 0.0));
    }

    #[test]
    fn look_at_straight_down_stays_finite() {
        let q = look_at(&Vector::new(0.0, 5.0, 0.0), &Vector::zeros());
        let at = forward(&q);
        assert!(at.iter().all(|c| c.is_finite()));
        assert!(near(at.y, -1.0));
    }

    #[test]
    fn basis_is_unit_and_orthogonal() {
        let offsets = [
            Vector::new(3.0, 1.0, -4.0),
            Vector::new(-0.2, 8.0, 0.1),
            Vector::new(100.0, -3.0, 2.0),
        ];
        for offset in &offsets {
            let basis = HorizontalBasis::build(offset, &Vector::z(), 0.0);
            assert!(near(basis.at.norm(), 1.0));
            assert!(near(basis.at.dot(&basis.right), 0.0));
            assert!(near(basis.at.dot(&basis.up), 0.0));
            assert!((basis.right - basis.up.cross(&basis.at)).norm() < 1.0e-5);
        }
    }

    #[test]
    fn degenerate_basis_falls_back_to_facing_then_azimuth() {
        let facing = Vector::new(0.0, 0.2, -2.0);
        let basis = HorizontalBasis::build(&Vector::new(0.0, 3.0, 0.0), &facing, 1.0);
        assert!((basis.at - Vector::new(0.0, 0.0, -1.0)).norm() < 1.0e-5);

        let basis = HorizontalBasis::build(&Vector::zeros(), &Vector::y(), FRAC_PI_2);
        assert!((basis.at - Vector::new(1.0, 0.0, 0.0)).norm() < 1.0e-5);
        assert!(near(basis.at.norm(), 1.0));
    }

    #[test]
    fn slerp_handles_opposite_orientations() {
        let a = UnitQuaternion::identity();
        let b = euler_quat(Euler::new(std::f32::consts::PI, 0.0, 0.0));
        let mid = slerp(&a, &b, 0.3);
        assert!(mid.coords.iter().all(|c| c.is_finite()));
        assert_eq!(slerp(&a, &b, 2.0), slerp(&a, &b, 1.0));
    }
}
